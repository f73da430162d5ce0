use crate::entities::{collections, images};
use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    pub id: i32,
    pub url: String,
    pub filename: String,
    pub metadata: Value,
    pub collection_id: Option<i32>,
    pub created_at: chrono::DateTime<Utc>,
}

impl From<images::Model> for ImageResponse {
    fn from(image: images::Model) -> Self {
        Self {
            id: image.id,
            url: image.url,
            filename: image.filename,
            metadata: image.metadata,
            collection_id: image.collection_id,
            created_at: image.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectionResponse {
    pub id: i32,
    pub name: String,
    pub created_at: chrono::DateTime<Utc>,
}

impl From<collections::Model> for CollectionResponse {
    fn from(collection: collections::Model) -> Self {
        Self {
            id: collection.id,
            name: collection.name,
            created_at: collection.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectionWithImagesResponse {
    pub id: i32,
    pub name: String,
    pub created_at: chrono::DateTime<Utc>,
    pub images: Vec<ImageResponse>,
}

/// `collectionId` distinguishes an absent key (leave as is) from an explicit
/// `null` (detach).
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateImageRequest {
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<i32>)]
    pub collection_id: Option<Value>,
}

fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct CreateCollectionRequest {
    #[validate(length(max = 255, message = "Collection name must be at most 255 characters"))]
    pub name: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct SyncResponse {
    pub message: String,
    pub checked: usize,
    pub removed: usize,
    pub failed: usize,
}
