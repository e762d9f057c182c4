use axum::{
    Extension,
    extract::{Path, State},
    response::IntoResponse,
};
use validator::Validate;

use agora_db::models::ProfileUpdate;
use agora_db::queries::CategoryLink;
use agora_types::api::UpdateUserRequest;
use agora_types::models::ShortUser;
use agora_types::paging::PageQuery;

use crate::error::{ApiError, ApiResult};
use crate::extract::{Json, Query};
use crate::loaders;
use crate::middleware::Actor;
use crate::state::{AppState, with_db};
use crate::views;

const DEFAULT_USERS_LIMIT: u32 = 50;
const MAX_USERS_LIMIT: u32 = 100;

pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = query.page(DEFAULT_USERS_LIMIT, MAX_USERS_LIMIT);
    let rows = with_db(&state, move |db| db.list_users(page.offset, page.limit)).await?;
    let users: Vec<ShortUser> = rows.into_iter().map(views::short_user).collect();
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(loaders::user(&state, &user_id).await?))
}

/// `PUT /user` edits the actor's own profile.
pub async fn update_me(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let user_id = actor.id();
    let update = ProfileUpdate {
        first_name: req.first_name,
        last_name: req.last_name,
        date_of_birth: req.date_of_birth.map(views::date_column),
        about: req.about,
        image_url: req.image_url,
    };
    let category_ids = req.category_ids;

    let user = with_db(&state, move |db| {
        if !update.is_empty() {
            db.update_profile(user_id, &update)?;
        }
        if let Some(ids) = category_ids {
            db.set_categories(CategoryLink::User, &user_id, &ids)?;
        }
        loaders::load_user(db, user_id)
    })
    .await?
    .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(user))
}
