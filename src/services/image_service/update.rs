use crate::api::error::AppError;
use crate::entities::*;
use crate::utils::validation::CollectionRef;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::{Map, Value};

use super::ImageService;

impl ImageService {
    /// Replaces the image's metadata document wholesale and applies the
    /// collection change, if any.
    pub async fn update_image(
        &self,
        id: i32,
        metadata: Map<String, Value>,
        collection: CollectionRef,
    ) -> Result<images::Model, AppError> {
        let image = self.find_image(id).await?;

        if let CollectionRef::Set(collection_id) = collection {
            self.ensure_collection_exists(collection_id).await?;
        }

        let mut active: images::ActiveModel = image.into();
        active.metadata = Set(Value::Object(metadata));
        match collection {
            CollectionRef::Unchanged => {}
            CollectionRef::Detach => active.collection_id = Set(None),
            CollectionRef::Set(collection_id) => active.collection_id = Set(Some(collection_id)),
        }

        let updated = active.update(&self.db).await?;
        tracing::info!("✏️  Updated metadata of image {}", updated.id);
        Ok(updated)
    }

    pub async fn detach_collection(&self, id: i32) -> Result<images::Model, AppError> {
        let image = self.find_image(id).await?;
        if image.collection_id.is_none() {
            return Ok(image);
        }

        let mut active: images::ActiveModel = image.into();
        active.collection_id = Set(None);
        Ok(active.update(&self.db).await?)
    }
}
