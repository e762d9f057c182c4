use axum::{
    Extension,
    extract::{Path, State},
    response::IntoResponse,
};

use agora_types::api::MessageBody;

use crate::error::{ApiError, ApiResult};
use crate::extract::Json;
use crate::loaders;
use crate::middleware::Actor;
use crate::state::{AppState, with_db};

/// A second like on the same post is a 409, not a no-op.
pub async fn like_post(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(post_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let post_id = loaders::parse_id(&post_id, "post")?;
    let user_id = actor.id();

    let found = with_db(&state, move |db| {
        if db.get_post(post_id)?.is_none() {
            return Ok(false);
        }
        db.insert_like(post_id, user_id)?;
        Ok(true)
    })
    .await
    .map_err(|e| e.on_conflict(None, "You already liked this post"))?;

    if !found {
        return Err(ApiError::not_found("Post not found"));
    }
    Ok(Json(MessageBody::new("Liked")))
}

pub async fn unlike_post(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(post_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let post_id = loaders::parse_id(&post_id, "post")?;
    let user_id = actor.id();

    let outcome = with_db(&state, move |db| {
        if db.get_post(post_id)?.is_none() {
            return Ok(None);
        }
        Ok(Some(db.delete_like(post_id, user_id)?))
    })
    .await?;

    match outcome {
        None => Err(ApiError::not_found("Post not found")),
        Some(false) => Err(ApiError::conflict("You haven't liked this post")),
        Some(true) => Ok(Json(MessageBody::new("Unliked"))),
    }
}
