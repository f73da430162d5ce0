use crate::api::error::AppError;
use crate::api::extract::{ApiJson, ApiPath};
use crate::utils::validation::{parse_collection_ref, require_metadata_object};
use axum::{
    Json,
    extract::State,
};

use super::types::*;

#[utoipa::path(
    get,
    path = "/image/{id}",
    params(("id" = i32, Path, description = "Image id")),
    responses(
        (status = 200, description = "Image found", body = ImageResponse),
        (status = 404, description = "Image not found")
    ),
    tag = "images"
)]
pub async fn get_image(
    State(state): State<crate::AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ImageResponse>, AppError> {
    let image = state.image_service.find_image(id).await?;
    Ok(Json(image.into()))
}

#[utoipa::path(
    put,
    path = "/image/{id}",
    params(("id" = i32, Path, description = "Image id")),
    request_body = UpdateImageRequest,
    responses(
        (status = 200, description = "Metadata replaced", body = ImageResponse),
        (status = 400, description = "Metadata missing or not an object"),
        (status = 404, description = "Image or collection not found")
    ),
    tag = "images"
)]
pub async fn update_image(
    State(state): State<crate::AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(req): ApiJson<UpdateImageRequest>,
) -> Result<Json<ImageResponse>, AppError> {
    let metadata = require_metadata_object(req.metadata)?;
    let collection = parse_collection_ref(req.collection_id.as_ref())?;

    let image = state
        .image_service
        .update_image(id, metadata, collection)
        .await?;
    Ok(Json(image.into()))
}

#[utoipa::path(
    delete,
    path = "/image/{id}",
    params(("id" = i32, Path, description = "Image id")),
    responses(
        (status = 200, description = "Image deleted", body = MessageResponse),
        (status = 404, description = "Image not found")
    ),
    tag = "images"
)]
pub async fn delete_image(
    State(state): State<crate::AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    state.image_service.delete_image(id).await?;
    Ok(Json(MessageResponse {
        message: "Image deleted successfully".to_string(),
    }))
}

#[utoipa::path(
    delete,
    path = "/image/{id}/collection",
    params(("id" = i32, Path, description = "Image id")),
    responses(
        (status = 200, description = "Image removed from its collection", body = ImageResponse),
        (status = 404, description = "Image not found")
    ),
    tag = "images"
)]
pub async fn detach_collection(
    State(state): State<crate::AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ImageResponse>, AppError> {
    let image = state.image_service.detach_collection(id).await?;
    Ok(Json(image.into()))
}
