use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use agora_types::api::CreateCategoryRequest;
use agora_types::models::Category;

use crate::error::ApiResult;
use crate::extract::Json;
use crate::state::{AppState, with_db};
use crate::views;

pub async fn list_categories(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let rows = with_db(&state, |db| db.list_categories()).await?;
    let categories: Vec<Category> = rows.into_iter().map(views::category).collect();
    Ok(Json(categories))
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(req): Json<CreateCategoryRequest>,
) -> ApiResult<impl IntoResponse> {
    let req = req.trimmed();
    req.validate()?;

    let name = req.name;
    let stored = name.clone();
    let id = with_db(&state, move |db| db.create_category(&stored))
        .await
        .map_err(|e| e.on_conflict(Some("name"), "Category already exists"))?;

    Ok((StatusCode::CREATED, Json(Category { id, name })))
}
