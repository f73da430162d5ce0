use crate::api::error::AppError;
use crate::services::image_service::{UploadFile, UploadRequest};
use crate::utils::validation::{parse_collection_id_text, parse_metadata_text};
use axum::{
    Json,
    extract::{Multipart, State, multipart::{MultipartError, MultipartRejection}},
    http::StatusCode,
};

use super::types::*;

fn multipart_error(e: MultipartError) -> AppError {
    let err_msg = e.to_string();
    if err_msg.contains("length limit exceeded") {
        AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
    } else {
        AppError::BadRequest(err_msg)
    }
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = Multipart, description = "One or more `images` parts, optional `metadata` (JSON object) and `collectionId`"),
    responses(
        (status = 201, description = "Images uploaded", body = Vec<ImageResponse>),
        (status = 400, description = "No images or invalid fields"),
        (status = 404, description = "Collection not found"),
        (status = 413, description = "File too large")
    ),
    tag = "images"
)]
pub async fn upload_images(
    State(state): State<crate::AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Vec<ImageResponse>>), AppError> {
    let mut multipart = multipart?;
    // Capture errors so the rest of the multipart stream can be drained
    let result: Result<Vec<ImageResponse>, AppError> = async {
        let mut request = UploadRequest::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();

            match name.as_str() {
                "images" | "images[]" | "image" => {
                    // Browsers send an empty part when no file was chosen
                    let filename = match field.file_name() {
                        Some(name) if !name.is_empty() => name.to_string(),
                        _ => continue,
                    };
                    let content_type = field.content_type().map(|s| s.to_string());
                    let data = field.bytes().await.map_err(multipart_error)?;

                    request.files.push(UploadFile {
                        filename,
                        content_type,
                        data,
                    });
                }
                "metadata" => {
                    let text = field.text().await.map_err(multipart_error)?;
                    request.metadata = parse_metadata_text(&text)?;
                }
                "collectionId" => {
                    let text = field.text().await.map_err(multipart_error)?;
                    request.collection_id = parse_collection_id_text(&text)?;
                }
                other => tracing::debug!("Ignoring multipart field {}", other),
            }
        }

        let images = state
            .image_service
            .upload_images(request)
            .await?;
        Ok(images.into_iter().map(ImageResponse::from).collect())
    }
    .await;

    match result {
        Ok(images) => Ok((StatusCode::CREATED, Json(images))),
        Err(e) => {
            // Consume the remaining stream so the client sees the error instead of a reset
            tracing::warn!("Upload failed: {}. Consuming remaining stream...", e);
            while let Ok(Some(mut field)) = multipart.next_field().await {
                while let Ok(Some(_)) = field.chunk().await {}
            }
            Err(e)
        }
    }
}
