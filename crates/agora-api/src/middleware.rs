use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;

use agora_types::api::Claims;
use agora_types::models::User;

use crate::error::{ApiError, ApiResult};
use crate::loaders;
use crate::state::AppState;

/// Tokens stay valid for two days.
const TOKEN_TTL_DAYS: i64 = 2;

/// The authenticated user behind a request, inserted by [`require_auth`].
#[derive(Debug, Clone)]
pub struct Actor {
    pub user: User,
}

impl Actor {
    pub fn id(&self) -> i64 {
        self.user.id
    }
}

/// Resolves the bearer token into an [`Actor`] request extension.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> ApiResult<Response> {
    let Authorization(bearer) = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| ApiError::Unauthenticated("Not authenticated".into()))?;

    let user_id = verify_token(&state.jwt_secret, bearer.token()).ok_or_else(|| {
        ApiError::Unauthenticated("Not authorized to access this resource".into())
    })?;

    let user = loaders::user_by_id(&state, user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthenticated("Wrong access token".into()))?;

    debug!(user_id, "Authenticated request");
    req.extensions_mut().insert(Actor { user });
    Ok(next.run(req).await)
}

pub fn create_token(secret: &str, user_id: i64) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Returns the user id carried by a valid, unexpired token.
pub fn verify_token(secret: &str, token: &str) -> Option<i64> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()?
    .claims
    .user_id()
}
