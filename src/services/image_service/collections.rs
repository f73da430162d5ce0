use crate::api::error::AppError;
use crate::entities::{prelude::*, *};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, ModelTrait, QueryOrder, Set};

use super::ImageService;

impl ImageService {
    pub async fn create_collection(&self, name: &str) -> Result<collections::Model, AppError> {
        let collection = collections::ActiveModel {
            name: Set(name.to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::info!("📁 Created collection {} ({})", collection.id, collection.name);
        Ok(collection)
    }

    pub async fn list_collections(&self) -> Result<Vec<collections::Model>, AppError> {
        let collections = Collections::find()
            .order_by_asc(collections::Column::Id)
            .all(&self.db)
            .await?;
        Ok(collections)
    }

    /// The collection and its images, ordered by id.
    pub async fn get_collection(
        &self,
        id: i32,
    ) -> Result<(collections::Model, Vec<images::Model>), AppError> {
        let collection = Collections::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Collection not found".to_string()))?;

        let images = collection
            .find_related(Images)
            .order_by_asc(images::Column::Id)
            .all(&self.db)
            .await?;

        Ok((collection, images))
    }
}
