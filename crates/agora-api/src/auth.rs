use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use agora_db::models::{KeyPurpose, NewUser};
use agora_types::api::{
    EmailRequest, LoginRequest, LoginResponse, MessageBody, NewPasswordRequest, RegisterRequest,
};

use crate::error::{ApiError, ApiResult};
use crate::extract::Json;
use crate::loaders;
use crate::mailer::Mail;
use crate::middleware::{Actor, create_token};
use crate::state::{AppState, with_db};
use crate::views;

/// Email confirmation keys live for a day.
const CONFIRM_KEY_TTL_SECS: i64 = 60 * 60 * 24;
/// Password recovery keys live for twenty minutes.
const RECOVERY_KEY_TTL_SECS: i64 = 60 * 20;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let password_hash = hash_password(&req.password)?;
    let email = req.email.clone();

    let user_id = with_db(&state, move |db| {
        db.create_user(&NewUser {
            email: &req.email,
            password_hash: &password_hash,
            first_name: &req.first_name,
            last_name: &req.last_name,
            date_of_birth: req.date_of_birth.map(views::date_column),
        })
    })
    .await
    .map_err(|e| e.on_conflict(Some("email"), "Email is taken already"))?;

    info!(user_id, "Registered user");
    send_confirmation(&state, user_id, &email).await?;

    Ok(Json(MessageBody::new("Registration success")))
}

/// `GET|POST /confirm/{key}`
pub async fn confirm_email(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let confirmed = with_db(&state, move |db| {
        match db.redeem_key(&key, KeyPurpose::ConfirmEmail)? {
            Some(user_id) => db.confirm_user(user_id),
            None => Ok(false),
        }
    })
    .await?;

    if !confirmed {
        return Err(ApiError::bad_request("invalid"));
    }
    Ok(Json(MessageBody::new("ok")))
}

/// `POST /confirm` issues a fresh confirmation key for an unconfirmed account.
pub async fn resend_confirmation(
    State(state): State<AppState>,
    Json(req): Json<EmailRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let email = req.email.clone();
    let user = with_db(&state, move |db| db.get_user_by_email(&email))
        .await?
        .ok_or_else(|| {
            ApiError::field(
                StatusCode::BAD_REQUEST,
                "email",
                "User with this email does not exist, please register first",
            )
        })?;

    if user.confirmed {
        return Err(ApiError::field(
            StatusCode::BAD_REQUEST,
            "email",
            "Your user is confirmed already",
        ));
    }

    send_confirmation(&state, user.id, &user.email).await?;
    Ok(Json(MessageBody::new("Confirmation successfully sent")))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let email = req.email.clone();
    let row = with_db(&state, move |db| db.get_user_by_email(&email))
        .await?
        .ok_or_else(|| {
            ApiError::field(
                StatusCode::NOT_FOUND,
                "email",
                "User with this email does not exist, please sign up",
            )
        })?;

    if !row.confirmed {
        return Err(ApiError::field(
            StatusCode::FORBIDDEN,
            "email",
            "Please confirm your email first",
        ));
    }

    if !verify_password(&req.password, &row.password)? {
        return Err(ApiError::field(
            StatusCode::BAD_REQUEST,
            "password",
            "Wrong password",
        ));
    }

    let user_id = row.id;
    let user = with_db(&state, move |db| {
        db.set_online(user_id, true)?;
        loaders::load_user(db, user_id)
    })
    .await?
    .ok_or_else(|| ApiError::not_found("User not found"))?;

    let token =
        create_token(&state.jwt_secret, user_id).map_err(|e| ApiError::Internal(e.to_string()))?;

    info!(user_id, "User logged in");
    Ok(Json(LoginResponse { user, token }))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<impl IntoResponse> {
    let user_id = actor.id();
    with_db(&state, move |db| db.set_online(user_id, false)).await?;
    Ok(Json(MessageBody::new("Logged out")))
}

pub async fn me(Extension(actor): Extension<Actor>) -> impl IntoResponse {
    Json(actor.user)
}

/// `POST /change-password` locks the account and mails a recovery link.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<EmailRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let key = Uuid::new_v4().to_string();
    let email = req.email.clone();
    let stored_key = key.clone();

    let user_id = with_db(&state, move |db| {
        let Some(user) = db.get_user_by_email(&email)? else {
            return Ok(None);
        };
        db.lock_for_recovery(user.id)?;
        db.insert_key(
            &stored_key,
            KeyPurpose::ForgotPassword,
            user.id,
            RECOVERY_KEY_TTL_SECS,
        )?;
        Ok(Some(user.id))
    })
    .await?
    .ok_or_else(|| {
        ApiError::field(
            StatusCode::NOT_FOUND,
            "email",
            "User with this email does not exist",
        )
    })?;

    let link = format!("{}/forgot-password/{}", state.frontend_host, key);
    state.mailer.send(Mail::recover_password(&req.email, link));
    info!(user_id, "Password recovery requested");

    Ok(Json(MessageBody::new(
        "Please check your email for the next steps",
    )))
}

/// `POST /change-password/{key}`
pub async fn change_password(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<NewPasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let password_hash = hash_password(&req.password)?;
    let changed = with_db(&state, move |db| {
        match db.redeem_key(&key, KeyPurpose::ForgotPassword)? {
            Some(user_id) => db.reset_password(user_id, &password_hash),
            None => Ok(false),
        }
    })
    .await?;

    if !changed {
        return Err(ApiError::field(
            StatusCode::BAD_REQUEST,
            "password",
            "Key was expired, please try again",
        ));
    }
    Ok(Json(MessageBody::new("Password successfully changed")))
}

async fn send_confirmation(state: &AppState, user_id: i64, email: &str) -> ApiResult<()> {
    let key = Uuid::new_v4().to_string();
    let stored_key = key.clone();
    with_db(state, move |db| {
        db.insert_key(
            &stored_key,
            KeyPurpose::ConfirmEmail,
            user_id,
            CONFIRM_KEY_TTL_SECS,
        )
    })
    .await?;

    let link = format!("{}/confirm/{}", state.api_base, key);
    state.mailer.send(Mail::confirm_email(email, link));
    Ok(())
}

pub(crate) fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

fn verify_password(password: &str, stored: &str) -> ApiResult<bool> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| ApiError::Internal(format!("corrupt password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
