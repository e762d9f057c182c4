use std::borrow::Cow;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::User;

// -- JWT Claims --

/// Bearer token payload. `sub` is the user id in decimal form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

// -- Auth --

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    #[validate(
        length(min = 3, max = 255, message = "Email must be at least 3 characters"),
        email(message = "Email must be a valid email")
    )]
    pub email: String,
    #[validate(length(min = 6, max = 255, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 3, max = 100, message = "Name must be at least 3 characters"))]
    pub first_name: String,
    #[validate(length(min = 3, max = 100, message = "Last name must be at least 3 characters"))]
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[validate(email(message = "Email must be a valid email"))]
    pub email: String,
    #[validate(length(min = 6, max = 255, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    pub token: String,
}

/// Body of `POST /change-password` and `POST /confirm`.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct EmailRequest {
    #[validate(email(message = "Email must be a valid email"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewPasswordRequest {
    #[validate(length(min = 6, max = 255, message = "Password must be at least 6 characters"))]
    pub password: String,
}

// -- Users --

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 100, message = "Name must be at least 3 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 3, max = 100, message = "Last name must be at least 3 characters"))]
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[validate(length(max = 2000))]
    pub about: Option<String>,
    #[validate(length(max = 200))]
    pub image_url: Option<String>,
    /// Replaces the user's interests when present.
    pub category_ids: Option<Vec<i64>>,
}

// -- Channels --

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateChannelRequest {
    #[validate(length(min = 1, max = 100, message = "Please specify a name"))]
    pub name: String,
    #[validate(
        length(min = 1, max = 100, message = "Please create a tag for your channel"),
        custom(function = "no_whitespace")
    )]
    pub tag: String,
    pub is_private: Option<bool>,
    #[serde(default)]
    pub category_ids: Vec<i64>,
}

impl CreateChannelRequest {
    /// Strips surrounding whitespace so length rules see the stored value.
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            tag: self.tag.trim().to_string(),
            ..self
        }
    }
}

// -- Messages --

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SendMessageRequest {
    #[validate(custom(function = "not_blank"))]
    pub content: String,
    #[validate(length(max = 200))]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateMessageRequest {
    #[validate(custom(function = "not_blank"))]
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeleteMessagesRequest {
    #[serde(default)]
    pub message_ids: Vec<i64>,
}

// -- Posts --

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreatePostRequest {
    #[validate(length(min = 3, max = 30))]
    pub title: String,
    #[validate(custom(function = "not_blank"))]
    pub body: String,
    #[validate(length(max = 200))]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category_ids: Vec<i64>,
}

impl CreatePostRequest {
    pub fn trimmed(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            ..self
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdatePostRequest {
    #[validate(length(min = 3, max = 30))]
    pub title: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub body: Option<String>,
    #[validate(length(max = 200))]
    pub image_url: Option<String>,
}

impl UpdatePostRequest {
    pub fn trimmed(self) -> Self {
        Self {
            title: self.title.map(|t| t.trim().to_string()),
            ..self
        }
    }
}

// -- Comments --

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CommentRequest {
    #[validate(custom(function = "not_blank"))]
    pub content: String,
}

// -- Categories --

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
}

impl CreateCategoryRequest {
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
        }
    }
}

// -- Generic responses --

/// `{ "message": "..." }` returned by mutations that have no entity to echo.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    pub image_url: String,
}

// -- Custom field rules --

fn no_whitespace(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return not_blank(value);
    }
    if value.chars().any(char::is_whitespace) {
        let mut err = ValidationError::new("whitespace");
        err.message = Some(Cow::Borrowed("Tag should not contain the spaces"));
        return Err(err);
    }
    Ok(())
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some(Cow::Borrowed("Must not be empty"));
        return Err(err);
    }
    Ok(())
}
