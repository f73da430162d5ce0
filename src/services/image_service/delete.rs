use crate::api::error::AppError;
use crate::entities::prelude::*;
use crate::services::storage::key_from_url;
use sea_orm::{EntityTrait, TransactionTrait};

use super::ImageService;

impl ImageService {
    /// Removes the row and its blob. The row delete is only committed once
    /// the object store has accepted the blob delete.
    pub async fn delete_image(&self, id: i32) -> Result<(), AppError> {
        let image = self.find_image(id).await?;
        let key = key_from_url(&image.url);

        let txn = self.db.begin().await?;
        Images::delete_by_id(image.id).exec(&txn).await?;

        match key {
            Some(key) => {
                if let Err(e) = self.storage.delete_object(&key).await {
                    txn.rollback().await?;
                    return Err(AppError::Anyhow(
                        e.context(format!("Failed to delete object for image {}", id)),
                    ));
                }
            }
            None => tracing::warn!(
                "Image {} has no storage key in its URL {}; removing the row only",
                id,
                image.url
            ),
        }

        txn.commit().await?;
        tracing::info!("🗑️  Deleted image {} ({})", id, image.filename);
        Ok(())
    }
}
