use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use agora_types::api::{CommentRequest, MessageBody};

use crate::access::require_owner;
use crate::error::{ApiError, ApiResult};
use crate::extract::Json;
use crate::loaders;
use crate::middleware::Actor;
use crate::state::{AppState, with_db};
use crate::views;

/// `POST /comment/{postId}`
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(post_id): Path<String>,
    Json(req): Json<CommentRequest>,
) -> ApiResult<impl IntoResponse> {
    let post = loaders::post(&state, &post_id).await?;
    req.validate()?;

    let post_id = post.id;
    let sender_id = actor.id();
    let comment = with_db(&state, move |db| {
        let id = db.insert_comment(post_id, sender_id, req.content.trim())?;
        Ok(db.get_comment(id)?.map(views::comment))
    })
    .await?
    .ok_or_else(|| ApiError::Internal("comment vanished after insert".into()))?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// `PUT /comment/{commentId}`
pub async fn update_comment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(comment_id): Path<String>,
    Json(req): Json<CommentRequest>,
) -> ApiResult<impl IntoResponse> {
    let comment = loaders::comment(&state, &comment_id).await?;
    require_owner(&comment, &actor)?;
    req.validate()?;

    let id = comment.id;
    let comment = with_db(&state, move |db| {
        db.update_comment(id, req.content.trim())?;
        Ok(db.get_comment(id)?.map(views::comment))
    })
    .await?
    .ok_or_else(|| ApiError::not_found("Comment not found"))?;

    Ok(Json(comment))
}

/// `DELETE /comment/{commentId}`
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(comment_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let comment = loaders::comment(&state, &comment_id).await?;
    require_owner(&comment, &actor)?;

    let id = comment.id;
    with_db(&state, move |db| db.delete_comment(id)).await?;
    Ok(Json(MessageBody::new("Success")))
}
