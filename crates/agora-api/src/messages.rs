use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, warn};
use validator::Validate;

use agora_db::models::BatchDelete;
use agora_types::api::{
    DeleteMessagesRequest, MessageBody, SendMessageRequest, UpdateMessageRequest,
};
use agora_types::models::Message;
use agora_types::paging::PageQuery;

use crate::access::{require_channel_member, require_owner};
use crate::error::{ApiError, ApiResult};
use crate::extract::{Json, Query};
use crate::loaders;
use crate::middleware::Actor;
use crate::state::{AppState, with_db};
use crate::views;

const DEFAULT_MESSAGES_LIMIT: u32 = 20;
const MAX_MESSAGES_LIMIT: u32 = 200;

/// `POST /message/{channelId}`
pub async fn send_message(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(channel_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    let channel = loaders::channel(&state, &channel_id).await?;
    require_channel_member(&state, &channel, &actor).await?;
    req.validate()?;

    let cid = channel.id.to_string();
    let sender_id = actor.id();
    let message = with_db(&state, move |db| {
        let id = db.insert_message(&cid, sender_id, req.content.trim(), req.image_url.as_deref())?;
        Ok(db.get_message(id)?.map(views::message))
    })
    .await?
    .ok_or_else(|| ApiError::Internal("message vanished after insert".into()))?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// `GET /message/all/{channelId}`, newest first.
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(channel_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let channel = loaders::channel(&state, &channel_id).await?;
    require_channel_member(&state, &channel, &actor).await?;

    let page = query.page(DEFAULT_MESSAGES_LIMIT, MAX_MESSAGES_LIMIT);
    let cid = channel.id.to_string();
    let rows = with_db(&state, move |db| db.list_messages(&cid, page.offset, page.limit)).await?;
    let messages: Vec<Message> = rows.into_iter().map(views::message).collect();
    Ok(Json(messages))
}

/// `PUT /message/{messageId}`
pub async fn update_message(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(message_id): Path<String>,
    Json(req): Json<UpdateMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    let message = loaders::message(&state, &message_id).await?;
    require_owner(&message, &actor)?;
    req.validate()?;

    let id = message.id;
    let message = with_db(&state, move |db| {
        db.update_message(id, req.content.trim())?;
        Ok(db.get_message(id)?.map(views::message))
    })
    .await?
    .ok_or_else(|| ApiError::not_found("Message not found"))?;

    Ok(Json(message))
}

/// `DELETE /message/{messageId}`
pub async fn delete_message(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(message_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let message = loaders::message(&state, &message_id).await?;
    require_owner(&message, &actor)?;

    let id = message.id;
    with_db(&state, move |db| db.delete_message(id)).await?;
    Ok(Json(MessageBody::new("Success")))
}

/// `DELETE /message` with `{ messageIds }`. Either every matched message
/// belongs to the actor and all are removed, or nothing is.
pub async fn delete_messages(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<DeleteMessagesRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.message_ids.is_empty() {
        return Err(ApiError::bad_request("Please provide messageIds"));
    }

    let sender_id = actor.id();
    let ids = req.message_ids;
    let outcome = with_db(&state, move |db| db.delete_messages_of(sender_id, &ids)).await?;

    match outcome {
        BatchDelete::Deleted(count) => {
            info!(sender_id, count, "Deleted messages");
            Ok(Json(MessageBody::new("Success")))
        }
        BatchDelete::NotOwned(foreign) => {
            warn!(sender_id, ?foreign, "Batch delete touched foreign messages");
            Err(ApiError::forbidden("You can delete only your own messages"))
        }
        BatchDelete::NoneFound => Err(ApiError::not_found("Messages not found")),
    }
}
