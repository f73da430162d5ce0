use crate::api::error::AppError;
use crate::config::AppConfig;
use crate::entities::{prelude::*, *};
use crate::services::{metadata::MetadataTool, scratch::ScratchSpace, storage::ObjectStore};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use std::sync::Arc;

pub mod collections;
pub mod delete;
pub mod download;
pub mod sync;
pub mod types;
pub mod update;
pub mod upload;

pub use types::*;

/// Sequences work across the database, the object store and the metadata
/// tool for every image operation.
pub struct ImageService {
    db: DatabaseConnection,
    storage: Arc<dyn ObjectStore>,
    metadata: Arc<dyn MetadataTool>,
    scratch: ScratchSpace,
    config: AppConfig,
}

impl ImageService {
    pub fn new(
        db: DatabaseConnection,
        storage: Arc<dyn ObjectStore>,
        metadata: Arc<dyn MetadataTool>,
        scratch: ScratchSpace,
        config: AppConfig,
    ) -> Self {
        Self {
            db,
            storage,
            metadata,
            scratch,
            config,
        }
    }

    pub async fn find_image(&self, id: i32) -> Result<images::Model, AppError> {
        Images::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Image not found".to_string()))
    }

    pub async fn list_images(&self) -> Result<Vec<images::Model>, AppError> {
        let images = Images::find()
            .order_by_asc(images::Column::Id)
            .all(&self.db)
            .await?;
        Ok(images)
    }

    async fn ensure_collection_exists(&self, id: i32) -> Result<(), AppError> {
        Collections::find_by_id(id)
            .one(&self.db)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("Collection not found".to_string()))
    }
}
