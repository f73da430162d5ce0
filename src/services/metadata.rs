use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub mod embed;
pub mod extract;

pub use embed::EmbedOutcome;

/// Reads and writes embedded file metadata. Implementations work on
/// filesystem paths, so callers stage bytes in a scratch file first.
#[async_trait]
pub trait MetadataTool: Send + Sync {
    /// Extracts the embedded metadata of the file at `path` as a flat JSON object.
    async fn read_metadata(&self, path: &Path) -> Result<Map<String, Value>>;

    /// Clears the file's existing EXIF block and embeds `metadata` (serialized
    /// as JSON) into the `UserComment` tag, overwriting the file in place.
    async fn write_metadata(&self, path: &Path, metadata: &Value) -> Result<EmbedOutcome>;
}

/// In-process EXIF binding backed by `kamadak-exif`. One instance is built
/// at startup and shared by every request.
#[derive(Debug, Default, Clone)]
pub struct ExifMetadataTool;

impl ExifMetadataTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MetadataTool for ExifMetadataTool {
    async fn read_metadata(&self, path: &Path) -> Result<Map<String, Value>> {
        let path: PathBuf = path.to_path_buf();
        tokio::task::spawn_blocking(move || extract::extract_metadata(&path))
            .await
            .context("Metadata extraction task panicked")?
    }

    async fn write_metadata(&self, path: &Path, metadata: &Value) -> Result<EmbedOutcome> {
        let comment = serde_json::to_string(metadata)?;
        let path: PathBuf = path.to_path_buf();
        tokio::task::spawn_blocking(move || embed::embed_user_comment(&path, &comment))
            .await
            .context("Metadata embedding task panicked")?
    }
}
