use crate::api::error::AppError;
use axum::{Json, extract::State};

use super::types::*;

#[utoipa::path(
    get,
    path = "/images",
    responses(
        (status = 200, description = "All images", body = Vec<ImageResponse>)
    ),
    tag = "images"
)]
pub async fn list_images(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<ImageResponse>>, AppError> {
    let images = state.image_service.list_images().await?;
    Ok(Json(images.into_iter().map(ImageResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/sync-images",
    responses(
        (status = 200, description = "Rows without a stored object removed", body = SyncResponse)
    ),
    tag = "images"
)]
pub async fn sync_images(
    State(state): State<crate::AppState>,
) -> Result<Json<SyncResponse>, AppError> {
    let report = state.image_service.sync_images().await?;
    Ok(Json(SyncResponse {
        message: "Synchronization complete".to_string(),
        checked: report.checked,
        removed: report.removed,
        failed: report.failed,
    }))
}
