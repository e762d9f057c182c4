use axum::{
    Extension,
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::info;

use agora_types::api::{CountResponse, MessageBody};
use agora_types::models::ShortUser;
use agora_types::paging::FollowQuery;

use crate::error::{ApiError, ApiResult};
use crate::extract::{Json, Query};
use crate::loaders;
use crate::middleware::Actor;
use crate::state::{AppState, with_db};
use crate::views;

/// `POST /subscribe/{userId}`: the actor starts following the user.
pub async fn subscribe(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let target = loaders::user(&state, &user_id).await?;
    if target.id == actor.id() {
        return Err(ApiError::bad_request("You can't follow yourself"));
    }

    let (subscriber, target_id) = (actor.id(), target.id);
    with_db(&state, move |db| db.subscribe(subscriber, target_id))
        .await
        .map_err(|e| e.on_conflict(None, "You are already followed to this user"))?;

    info!(subscriber, target_id, "Subscribed");
    Ok(Json(MessageBody::new("Ok")))
}

pub async fn unsubscribe(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let target = loaders::user(&state, &user_id).await?;
    if target.id == actor.id() {
        return Err(ApiError::bad_request("You can't unfollow yourself"));
    }

    let (subscriber, target_id) = (actor.id(), target.id);
    let removed = with_db(&state, move |db| db.unsubscribe(subscriber, target_id)).await?;
    if !removed {
        return Err(ApiError::conflict("You are not followed to this user"));
    }

    info!(subscriber, target_id, "Unsubscribed");
    Ok(Json(MessageBody::new("Ok")))
}

pub async fn followers(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<FollowQuery>,
) -> ApiResult<impl IntoResponse> {
    let user = loaders::user(&state, &user_id).await?;
    let page = query.page();
    let online = query.online;
    let rows = with_db(&state, move |db| {
        db.followers(user.id, online, page.offset, page.limit)
    })
    .await?;
    let users: Vec<ShortUser> = rows.into_iter().map(views::short_user).collect();
    Ok(Json(users))
}

pub async fn following(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<FollowQuery>,
) -> ApiResult<impl IntoResponse> {
    let user = loaders::user(&state, &user_id).await?;
    let page = query.page();
    let online = query.online;
    let rows = with_db(&state, move |db| {
        db.following(user.id, online, page.offset, page.limit)
    })
    .await?;
    let users: Vec<ShortUser> = rows.into_iter().map(views::short_user).collect();
    Ok(Json(users))
}

pub async fn followers_count(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let user = loaders::user(&state, &user_id).await?;
    let count = with_db(&state, move |db| db.follower_count(user.id)).await?;
    Ok(Json(CountResponse { count }))
}

pub async fn following_count(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let user = loaders::user(&state, &user_id).await?;
    let count = with_db(&state, move |db| db.following_count(user.id)).await?;
    Ok(Json(CountResponse { count }))
}
