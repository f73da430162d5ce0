use crate::api::error::AppError;
use crate::api::extract::ApiPath;
use crate::utils::content::attachment_disposition;
use axum::{
    body::Body,
    extract::State,
    http::{StatusCode, header},
    response::Response,
};
use futures::{StreamExt, stream};
use tokio_util::io::ReaderStream;

#[utoipa::path(
    get,
    path = "/download/{id}",
    params(("id" = i32, Path, description = "Image id")),
    responses(
        (status = 200, description = "Image file with its metadata embedded", content_type = "application/octet-stream"),
        (status = 404, description = "Image not found")
    ),
    tag = "images"
)]
pub async fn download_image(
    State(state): State<crate::AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Response, AppError> {
    let download = state.image_service.prepare_download(id).await?;

    let file = download.file.open().await?;
    let length = file.metadata().await.ok().map(|m| m.len());

    // The scratch file travels in the stream state and is removed when the
    // stream finishes or is dropped early.
    let stream = stream::unfold(
        (ReaderStream::new(file), download.file),
        |(mut chunks, scratch)| async move {
            let chunk = chunks.next().await?;
            Some((chunk, (chunks, scratch)))
        },
    );

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, download.content_type)
        .header(
            header::CONTENT_DISPOSITION,
            attachment_disposition(&download.filename),
        )
        .header(header::CACHE_CONTROL, "no-store");
    if let Some(length) = length {
        builder = builder.header(header::CONTENT_LENGTH, length);
    }

    builder
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::Internal(format!("Failed to build download response: {}", e)))
}
