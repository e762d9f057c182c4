use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;
use validator::Validate;

use agora_db::models::{NewPost, PostFilter, PostUpdate};
use agora_types::api::{CreatePostRequest, MessageBody, UpdatePostRequest};
use agora_types::models::PostSummary;
use agora_types::paging::PostQuery;

use crate::access::require_owner;
use crate::error::{ApiError, ApiResult};
use crate::extract::{Json, Query};
use crate::loaders;
use crate::middleware::Actor;
use crate::state::{AppState, with_db};
use crate::views;

/// `GET /post/all?offset&limit&userId&onlyFollowing`
pub async fn list_posts(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<PostQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = query.page();
    let filter = PostFilter {
        owner_id: query.user_id,
        followed_by: query.only_following.then(|| actor.id()),
    };

    let rows = with_db(&state, move |db| db.list_posts(filter, page.offset, page.limit)).await?;
    let posts: Vec<PostSummary> = rows.into_iter().map(views::post_summary).collect();
    Ok(Json(posts))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(loaders::post(&state, &post_id).await?))
}

pub async fn create_post(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreatePostRequest>,
) -> ApiResult<impl IntoResponse> {
    let req = req.trimmed();
    req.validate()?;

    let owner_id = actor.id();
    let post = with_db(&state, move |db| {
        let id = db.create_post(
            &NewPost {
                owner_id,
                title: &req.title,
                body: &req.body,
                image_url: req.image_url.as_deref(),
            },
            &req.category_ids,
        )?;
        loaders::load_post(db, id)
    })
    .await?
    .ok_or_else(|| ApiError::Internal("post vanished after insert".into()))?;

    info!(post_id = post.id, owner_id, "Created post");
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update_post(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(post_id): Path<String>,
    Json(req): Json<UpdatePostRequest>,
) -> ApiResult<impl IntoResponse> {
    let post = loaders::post(&state, &post_id).await?;
    require_owner(&post, &actor)?;
    let req = req.trimmed();
    req.validate()?;

    let id = post.id;
    let update = PostUpdate {
        title: req.title,
        body: req.body,
        image_url: req.image_url,
    };
    let post = with_db(&state, move |db| {
        db.update_post(id, &update)?;
        loaders::load_post(db, id)
    })
    .await?
    .ok_or_else(|| ApiError::not_found("Post not found"))?;

    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(post_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let post = loaders::post(&state, &post_id).await?;
    require_owner(&post, &actor)?;

    let id = post.id;
    with_db(&state, move |db| db.delete_post(id)).await?;

    info!(post_id = id, "Deleted post");
    Ok(Json(MessageBody::new("Post deleted successfully")))
}
