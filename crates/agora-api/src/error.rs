use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use agora_db::DbError;

/// One entry of a field-level error list: `{ "path": "email", "message": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// Field-addressed rejection with a status other than 400.
    #[error("{}", .1.message)]
    Field(StatusCode, FieldError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Conflict {
        message: String,
        path: Option<String>,
    },

    #[error("Database error: {0}")]
    Database(DbError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            path: None,
        }
    }

    pub fn field(status: StatusCode, path: &str, message: &str) -> Self {
        if status == StatusCode::BAD_REQUEST {
            return Self::Validation(vec![FieldError::new(path, message)]);
        }
        Self::Field(status, FieldError::new(path, message))
    }

    /// Replaces a generic uniqueness conflict with an endpoint-specific one.
    /// Every other error passes through untouched.
    pub fn on_conflict(self, path: Option<&str>, message: &str) -> Self {
        match self {
            Self::Conflict { .. } => Self::Conflict {
                message: message.to_string(),
                path: path.map(str::to_string),
            },
            other => other,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Field(status, _) => *status,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Conflict(_) => Self::conflict("Already exists"),
            DbError::MissingReference(_) => Self::not_found("Referenced resource not found"),
            other => Self::Database(other),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let path = camel_case(&field);
                errs.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", path));
                    FieldError::new(path.clone(), message)
                })
            })
            .collect();
        fields.sort_by(|a, b| a.path.cmp(&b.path));
        Self::Validation(fields)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Validation(fields) => json!(fields),
            Self::Field(_, field) => json!([field]),
            Self::Conflict {
                message,
                path: Some(path),
            } => json!({ "error": message, "path": path }),
            Self::Database(e) => {
                error!("Database error: {}", e);
                json!({ "error": "Server error" })
            }
            Self::Internal(msg) => {
                error!("Internal error: {}", msg);
                json!({ "error": "Server error" })
            }
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

/// `first_name` -> `firstName`, matching the wire names of request fields.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
