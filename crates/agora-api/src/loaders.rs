//! Resolve raw path parameters into records.
//!
//! A malformed id is rejected with 400 before any query runs; a well-formed
//! id with no row is 404. Embedded users are always the public subset.

use uuid::Uuid;

use agora_db::queries::CategoryLink;
use agora_db::{Database, DbResult};
use agora_types::models::{Channel, Comment, Message, Post, User};

use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, with_db};
use crate::views;

/// Numeric ids are positive integers.
pub fn parse_id(raw: &str, what: &str) -> ApiResult<i64> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::bad_request(format!("Bad {what} id")))
}

pub fn parse_channel_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request("Bad channel id"))
}

pub async fn user(state: &AppState, raw: &str) -> ApiResult<User> {
    let id = parse_id(raw, "user")?;
    user_by_id(state, id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

pub async fn user_by_id(state: &AppState, id: i64) -> ApiResult<Option<User>> {
    with_db(state, move |db| load_user(db, id)).await
}

pub async fn channel(state: &AppState, raw: &str) -> ApiResult<Channel> {
    let id = parse_channel_id(raw)?.to_string();
    with_db(state, move |db| load_channel(db, &id))
        .await?
        .ok_or_else(|| ApiError::not_found("Channel not found"))
}

pub async fn post(state: &AppState, raw: &str) -> ApiResult<Post> {
    let id = parse_id(raw, "post")?;
    with_db(state, move |db| load_post(db, id))
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))
}

pub async fn comment(state: &AppState, raw: &str) -> ApiResult<Comment> {
    let id = parse_id(raw, "comment")?;
    with_db(state, move |db| Ok(db.get_comment(id)?.map(views::comment)))
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))
}

pub async fn message(state: &AppState, raw: &str) -> ApiResult<Message> {
    let id = parse_id(raw, "message")?;
    with_db(state, move |db| Ok(db.get_message(id)?.map(views::message)))
        .await?
        .ok_or_else(|| ApiError::not_found("Message not found"))
}

pub(crate) fn load_user(db: &Database, id: i64) -> DbResult<Option<User>> {
    let Some(row) = db.get_user_by_id(id)? else {
        return Ok(None);
    };
    let categories = db.categories_for(CategoryLink::User, &id)?;
    Ok(Some(views::user(row, categories)))
}

pub(crate) fn load_channel(db: &Database, id: &str) -> DbResult<Option<Channel>> {
    let Some(row) = db.get_channel(id)? else {
        return Ok(None);
    };
    let categories = db.categories_for(CategoryLink::Channel, &id)?;
    Ok(Some(views::channel(row, categories)))
}

/// Post with its comments, likes and categories.
pub(crate) fn load_post(db: &Database, id: i64) -> DbResult<Option<Post>> {
    let Some(row) = db.get_post(id)? else {
        return Ok(None);
    };
    let comments = db.comments_for_post(id)?;
    let likes = db.likes_for_post(id)?;
    let categories = db.categories_for(CategoryLink::Post, &id)?;
    Ok(Some(views::post(row, comments, likes, categories)))
}
