use crate::api::error::AppError;
use crate::entities::{prelude::*, *};
use crate::utils::content::resolve_content_type;
use crate::utils::validation::{merge_metadata, sanitize_filename};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{ImageService, UploadFile, UploadRequest};

/// Side effects of an upload request that has not finished yet.
#[derive(Debug)]
enum UploadStep {
    Stored(String),
    Inserted(i32),
}

impl ImageService {
    /// Stores every file of the request and records it. Any failure undoes
    /// the blobs and rows this request already created before returning.
    pub async fn upload_images(
        &self,
        request: UploadRequest,
    ) -> Result<Vec<images::Model>, AppError> {
        if request.files.is_empty() {
            return Err(AppError::BadRequest("No images uploaded".to_string()));
        }

        if let Some(file) = request
            .files
            .iter()
            .find(|f| f.data.len() > self.config.max_file_size)
        {
            return Err(AppError::PayloadTooLarge(format!(
                "File {} exceeds the maximum size of {} bytes",
                file.filename, self.config.max_file_size
            )));
        }

        if let Some(collection_id) = request.collection_id {
            self.ensure_collection_exists(collection_id).await?;
        }

        let mut steps = Vec::new();
        let mut created = Vec::with_capacity(request.files.len());

        for file in request.files {
            let filename = file.filename.clone();
            match self
                .store_image(
                    file,
                    request.metadata.as_ref(),
                    request.collection_id,
                    &mut steps,
                )
                .await
            {
                Ok(image) => created.push(image),
                Err(e) => {
                    tracing::error!("Upload of {} failed: {}", filename, e);
                    self.compensate(steps).await;
                    return Err(e);
                }
            }
        }

        tracing::info!("📸 Uploaded {} image(s)", created.len());
        Ok(created)
    }

    async fn store_image(
        &self,
        file: UploadFile,
        user_metadata: Option<&Map<String, Value>>,
        collection_id: Option<i32>,
        steps: &mut Vec<UploadStep>,
    ) -> Result<images::Model, AppError> {
        let filename = sanitize_filename(&file.filename);
        let key = format!("{}-{}", Uuid::new_v4(), filename);

        let extracted = {
            let scratch = self.scratch.write(&filename, &file.data).await?;
            self.metadata.read_metadata(scratch.path()).await?
        };
        let metadata = merge_metadata(extracted, user_metadata);

        let sniffed = infer::get(&file.data).map(|kind| kind.mime_type());
        let content_type = resolve_content_type(file.content_type.as_deref(), sniffed, &filename);

        self.storage
            .put_object(&key, file.data, &content_type)
            .await?;
        steps.push(UploadStep::Stored(key.clone()));

        let image = images::ActiveModel {
            url: Set(self.storage.public_url(&key)),
            filename: Set(filename),
            metadata: Set(Value::Object(metadata)),
            collection_id: Set(collection_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;
        steps.push(UploadStep::Inserted(image.id));

        tracing::debug!("Stored image {} as {}", image.id, key);
        Ok(image)
    }

    /// Reverts completed steps newest first. Failures are only logged; a
    /// later sync removes rows whose blob is gone.
    async fn compensate(&self, steps: Vec<UploadStep>) {
        for step in steps.into_iter().rev() {
            match step {
                UploadStep::Inserted(id) => {
                    if let Err(e) = Images::delete_by_id(id).exec(&self.db).await {
                        tracing::warn!("Compensation: failed to remove image row {}: {}", id, e);
                    }
                }
                UploadStep::Stored(key) => {
                    if let Err(e) = self.storage.delete_object(&key).await {
                        tracing::warn!("Compensation: failed to remove object {}: {}", key, e);
                    }
                }
            }
        }
    }
}
