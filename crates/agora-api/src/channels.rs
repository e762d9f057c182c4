use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use agora_db::models::NewChannel;
use agora_db::queries::CategoryLink;
use agora_types::api::{CreateChannelRequest, MessageBody};
use agora_types::models::ShortUser;

use crate::access::{is_owner, require_channel_member, require_owner};
use crate::error::{ApiError, ApiResult};
use crate::extract::Json;
use crate::loaders;
use crate::middleware::Actor;
use crate::state::{AppState, with_db};
use crate::views;

pub async fn create_channel(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateChannelRequest>,
) -> ApiResult<impl IntoResponse> {
    let req = req.trimmed();
    req.validate()?;

    let id = Uuid::new_v4().to_string();
    let owner_id = actor.id();

    let channel = with_db(&state, move |db| {
        db.create_channel(
            &NewChannel {
                id: &id,
                name: &req.name,
                tag: &req.tag,
                is_private: req.is_private.unwrap_or(true),
                owner_id,
            },
            &req.category_ids,
        )?;
        loaders::load_channel(db, &id)
    })
    .await
    .map_err(|e| e.on_conflict(Some("tag"), "This tag is taken already"))?
    .ok_or_else(|| ApiError::Internal("channel vanished after insert".into()))?;

    info!(channel_id = %channel.id, owner_id, "Created channel");
    Ok((StatusCode::CREATED, Json(channel)))
}

/// Channels the actor owns or belongs to.
pub async fn my_channels(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<impl IntoResponse> {
    let user_id = actor.id();
    let channels = with_db(&state, move |db| {
        let mut channels = Vec::new();
        for row in db.channels_for_user(user_id)? {
            let categories = db.categories_for(CategoryLink::Channel, &row.id)?;
            channels.push(views::channel(row, categories));
        }
        Ok(channels)
    })
    .await?;
    Ok(Json(channels))
}

pub async fn get_channel(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(channel_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let channel = loaders::channel(&state, &channel_id).await?;
    require_channel_member(&state, &channel, &actor).await?;
    Ok(Json(channel))
}

pub async fn delete_channel(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(channel_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let channel = loaders::channel(&state, &channel_id).await?;
    require_owner(&channel, &actor)?;

    let id = channel.id.to_string();
    with_db(&state, move |db| db.delete_channel(&id)).await?;

    info!(channel_id = %channel.id, "Deleted channel");
    Ok(Json(MessageBody::new("Channel deleted")))
}

/// Members only; the owner is reported on the channel itself.
pub async fn list_members(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(channel_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let channel = loaders::channel(&state, &channel_id).await?;
    require_channel_member(&state, &channel, &actor).await?;

    let id = channel.id.to_string();
    let rows = with_db(&state, move |db| db.list_members(&id)).await?;
    let members: Vec<ShortUser> = rows.into_iter().map(views::short_user).collect();
    Ok(Json(members))
}

/// Removing a membership that does not exist is not an error.
pub async fn leave(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(channel_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let channel = loaders::channel(&state, &channel_id).await?;
    if is_owner(&channel, &actor) {
        return Err(ApiError::bad_request("Owner can't leave the channel"));
    }

    let id = channel.id.to_string();
    let user_id = actor.id();
    with_db(&state, move |db| db.remove_member(&id, user_id)).await?;

    Ok(Json(MessageBody::new("You left the channel")))
}

pub async fn add_member(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((channel_id, user_id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let channel = loaders::channel(&state, &channel_id).await?;
    require_owner(&channel, &actor)?;

    let target = loaders::user(&state, &user_id).await?;
    if target.id == channel.owner.id {
        return Err(ApiError::bad_request("Owner is already in the channel"));
    }

    let id = channel.id.to_string();
    let target_id = target.id;
    with_db(&state, move |db| db.add_member(&id, target_id))
        .await
        .map_err(|e| e.on_conflict(None, "User is already a member"))?;

    info!(channel_id = %channel.id, user_id = target_id, "Added channel member");
    Ok(Json(MessageBody::new("Member added")))
}

pub async fn kick_out(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((channel_id, user_id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let channel = loaders::channel(&state, &channel_id).await?;
    require_owner(&channel, &actor)?;

    let target = loaders::user(&state, &user_id).await?;
    if target.id == channel.owner.id {
        return Err(ApiError::bad_request("Owner can't be kicked out"));
    }

    let id = channel.id.to_string();
    let target_id = target.id;
    let removed = with_db(&state, move |db| db.remove_member(&id, target_id)).await?;
    if !removed {
        return Err(ApiError::conflict("User is not a member of this channel"));
    }

    info!(channel_id = %channel.id, user_id = target_id, "Kicked channel member");
    Ok(Json(MessageBody::new("Member kicked out")))
}
