//! `Json` and `Query` extractors whose rejections render as `ApiError`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::response::{IntoResponse, Response};

use crate::error::{ApiError, FieldError};

/// JSON body extractor and response. Deserialization failures become a
/// 400 field list instead of axum's plain-text rejection.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct Json<T>(pub T);

impl<T> IntoResponse for Json<T>
where
    axum::Json<T>: IntoResponse,
{
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[derive(Debug, Clone, Copy, Default, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct Query<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => {
                Self::Validation(vec![serde_field_error(&e.body_text(), "body")])
            }
            JsonRejection::JsonSyntaxError(_) => {
                Self::Validation(vec![FieldError::new("body", "Malformed JSON body")])
            }
            JsonRejection::MissingJsonContentType(_) => Self::Validation(vec![FieldError::new(
                "body",
                "Please send a JSON body",
            )]),
            other => Self::bad_request(other.body_text()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(vec![serde_field_error(&rejection.body_text(), "query")])
    }
}

/// Turns a serde failure message into a `{path, message}` entry.
///
/// Handles the three shapes serde produces: `missing field `x``,
/// `unknown field `x``, and `x: <reason>` from a path-tracking deserializer.
/// Anything else is attributed to `fallback`.
fn serde_field_error(text: &str, fallback: &str) -> FieldError {
    // "Failed to deserialize ...: <detail>"
    let detail = text.split_once(": ").map_or(text, |(_, rest)| rest);

    if let Some(field) = quoted_after(detail, "missing field `") {
        return FieldError::new(field, format!("Please provide {field}"));
    }
    if let Some(field) = quoted_after(detail, "unknown field `") {
        return FieldError::new(field, format!("Unknown field {field}"));
    }

    let reason = strip_position(detail);
    match reason.split_once(": ") {
        Some((path, rest)) if !path.is_empty() && !path.contains(char::is_whitespace) => {
            FieldError::new(path, strip_position(rest))
        }
        _ => FieldError::new(fallback, reason),
    }
}

fn quoted_after<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    let start = text.find(marker)? + marker.len();
    let len = text[start..].find('`')?;
    Some(&text[start..start + len])
}

fn strip_position(text: &str) -> &str {
    text.rfind(" at line ").map_or(text, |i| &text[..i])
}

#[cfg(test)]
mod tests {
    use super::serde_field_error;

    #[test]
    fn missing_field_names_the_field() {
        let err = serde_field_error(
            "Failed to deserialize the JSON body into the target type: \
             missing field `password` at line 1 column 22",
            "body",
        );
        assert_eq!(err.path, "password");
        assert_eq!(err.message, "Please provide password");
    }

    #[test]
    fn unknown_field_names_the_field() {
        let err = serde_field_error(
            "Failed to deserialize the JSON body into the target type: \
             unknown field `role`, expected one of `email`, `password` at line 1 column 8",
            "body",
        );
        assert_eq!(err.path, "role");
    }

    #[test]
    fn path_prefix_becomes_the_path() {
        let err = serde_field_error(
            "Failed to deserialize the JSON body into the target type: \
             email: invalid type: integer `1`, expected a string at line 1 column 10",
            "body",
        );
        assert_eq!(err.path, "email");
        assert_eq!(err.message, "invalid type: integer `1`, expected a string");

        let err = serde_field_error(
            "Failed to deserialize query string: limit: invalid digit found in string",
            "query",
        );
        assert_eq!(err.path, "limit");
        assert_eq!(err.message, "invalid digit found in string");
    }

    #[test]
    fn unattributed_errors_use_the_fallback() {
        let err = serde_field_error(
            "Failed to deserialize query string: invalid digit found in string",
            "query",
        );
        assert_eq!(err.path, "query");
        assert_eq!(err.message, "invalid digit found in string");
    }
}
