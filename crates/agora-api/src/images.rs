use std::path::Path;

use axum::{
    Extension,
    extract::{Multipart, State},
    response::IntoResponse,
};
use bytes::Bytes;
use sha2::{Digest, Sha256};
use tracing::{error, info};

use agora_types::api::ImageResponse;

use crate::error::{ApiError, ApiResult};
use crate::extract::Json;
use crate::middleware::Actor;
use crate::state::AppState;

/// 5 MB upload limit for images
pub const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024;

/// `POST /image`: multipart field `image` (jpeg or png). Stored under the
/// uploads directory as `<sha256>.<ext>`, so identical uploads share a file.
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let extension = image_extension(field.content_type())?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;

        if bytes.is_empty() {
            return Err(ApiError::bad_request("Image is empty"));
        }
        if bytes.len() > MAX_IMAGE_SIZE {
            return Err(ApiError::bad_request("Image is too large"));
        }

        let name = store_image(&state.uploads_dir, &bytes, extension).await?;
        info!(user_id = actor.id(), %name, size = bytes.len(), "Stored image");

        return Ok(Json(ImageResponse {
            image_url: format!("/uploads/{name}"),
        }));
    }

    Err(ApiError::bad_request("Please attach an image"))
}

fn image_extension(content_type: Option<&str>) -> ApiResult<&'static str> {
    match content_type {
        Some("image/jpeg" | "image/jpg") => Ok("jpg"),
        Some("image/png") => Ok("png"),
        _ => Err(ApiError::bad_request("Bad image format")),
    }
}

async fn store_image(dir: &Path, bytes: &Bytes, extension: &str) -> ApiResult<String> {
    let name = format!("{}.{}", hex::encode(Sha256::digest(bytes)), extension);

    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        error!("Failed to create uploads directory: {}", e);
        ApiError::Internal(e.to_string())
    })?;

    let path = dir.join(&name);
    tokio::fs::write(&path, bytes).await.map_err(|e| {
        error!("Failed to write image {}: {}", path.display(), e);
        ApiError::Internal(e.to_string())
    })?;

    Ok(name)
}
