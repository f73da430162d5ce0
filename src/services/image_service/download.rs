use crate::api::error::AppError;
use crate::services::metadata::EmbedOutcome;
use crate::services::storage::{ObjectNotFound, key_from_url};
use crate::utils::content::resolve_content_type;

use super::{ImageDownload, ImageService};

impl ImageService {
    /// Fetches the image's blob into a scratch file and embeds the stored
    /// metadata document into it.
    pub async fn prepare_download(&self, id: i32) -> Result<ImageDownload, AppError> {
        let image = self.find_image(id).await?;
        let key = key_from_url(&image.url).ok_or_else(|| {
            AppError::Internal(format!("Image {} has an unparseable URL: {}", id, image.url))
        })?;

        let object = self.storage.get_object(&key).await.map_err(|e| {
            if e.downcast_ref::<ObjectNotFound>().is_some() {
                AppError::NotFound("Image file not found in storage".to_string())
            } else {
                AppError::Anyhow(e)
            }
        })?;

        let stored_type = object.content_type().map(str::to_string);
        let reader = Box::pin(object.body.into_async_read());
        let file = self.scratch.write_stream(&image.filename, reader).await?;

        let outcome = self
            .metadata
            .write_metadata(file.path(), &image.metadata)
            .await?;
        match outcome {
            EmbedOutcome::Embedded => {}
            EmbedOutcome::Unsupported => tracing::warn!(
                "Serving {} without embedded metadata: format not supported",
                image.filename
            ),
            EmbedOutcome::TooLarge => tracing::warn!(
                "Serving {} without embedded metadata: document too large for the EXIF block",
                image.filename
            ),
        }

        let sniffed = infer::get_from_path(file.path())
            .ok()
            .flatten()
            .map(|kind| kind.mime_type());
        let content_type = resolve_content_type(stored_type.as_deref(), sniffed, &image.filename);

        Ok(ImageDownload {
            filename: image.filename,
            content_type,
            file,
            outcome,
        })
    }
}
