use crate::api::error::AppError;
use crate::api::extract::{ApiJson, ApiPath};
use crate::api::handlers::images::{
    CollectionResponse, CollectionWithImagesResponse, CreateCollectionRequest, ImageResponse,
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use validator::Validate;

#[utoipa::path(
    post,
    path = "/collections",
    request_body = CreateCollectionRequest,
    responses(
        (status = 201, description = "Collection created", body = CollectionResponse),
        (status = 400, description = "Name missing or too long")
    ),
    tag = "collections"
)]
pub async fn create_collection(
    State(state): State<crate::AppState>,
    ApiJson(req): ApiJson<CreateCollectionRequest>,
) -> Result<(StatusCode, Json<CollectionResponse>), AppError> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let name = req
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::BadRequest("Collection name not provided".to_string()))?;

    let collection = state.image_service.create_collection(name).await?;
    Ok((StatusCode::CREATED, Json(collection.into())))
}

#[utoipa::path(
    get,
    path = "/collections",
    responses(
        (status = 200, description = "All collections", body = Vec<CollectionResponse>)
    ),
    tag = "collections"
)]
pub async fn list_collections(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<CollectionResponse>>, AppError> {
    let collections = state.image_service.list_collections().await?;
    Ok(Json(
        collections
            .into_iter()
            .map(CollectionResponse::from)
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/collections/{id}",
    params(("id" = i32, Path, description = "Collection id")),
    responses(
        (status = 200, description = "Collection with its images", body = CollectionWithImagesResponse),
        (status = 404, description = "Collection not found")
    ),
    tag = "collections"
)]
pub async fn get_collection(
    State(state): State<crate::AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<CollectionWithImagesResponse>, AppError> {
    let (collection, images) = state.image_service.get_collection(id).await?;

    Ok(Json(CollectionWithImagesResponse {
        id: collection.id,
        name: collection.name,
        created_at: collection.created_at,
        images: images.into_iter().map(ImageResponse::from).collect(),
    }))
}
