use crate::api::error::AppError;
use crate::entities::{prelude::*, *};
use crate::services::storage::key_from_url;
use sea_orm::{EntityTrait, QueryOrder};

use super::{ImageService, SyncReport};

impl ImageService {
    /// Deletes every row whose blob the object store reports missing.
    /// Rows are checked one at a time; other storage errors leave the row alone.
    pub async fn sync_images(&self) -> Result<SyncReport, AppError> {
        let images = Images::find()
            .order_by_asc(images::Column::Id)
            .all(&self.db)
            .await?;

        let mut report = SyncReport {
            checked: images.len(),
            ..Default::default()
        };

        for image in images {
            let Some(key) = key_from_url(&image.url) else {
                tracing::warn!("Image {} has an unparseable URL: {}", image.id, image.url);
                report.failed += 1;
                continue;
            };

            match self.storage.object_exists(&key).await {
                Ok(true) => {}
                Ok(false) => match Images::delete_by_id(image.id).exec(&self.db).await {
                    Ok(_) => {
                        tracing::info!(
                            "🧹 Removed image {} ({}): object {} no longer exists",
                            image.id,
                            image.filename,
                            key
                        );
                        report.removed += 1;
                    }
                    Err(e) => {
                        tracing::error!("Failed to remove stale image {}: {}", image.id, e);
                        report.failed += 1;
                    }
                },
                Err(e) => {
                    tracing::error!("Failed to check object {} for image {}: {}", key, image.id, e);
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            "Synchronization complete: checked={}, removed={}, failed={}",
            report.checked,
            report.removed,
            report.failed
        );
        Ok(report)
    }
}
