use crate::services::metadata::EmbedOutcome;
use crate::services::scratch::ScratchFile;
use bytes::Bytes;
use serde_json::{Map, Value};

/// One file part of an upload request.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

#[derive(Debug, Default)]
pub struct UploadRequest {
    pub files: Vec<UploadFile>,
    /// User-supplied fields merged over the extracted metadata of every file
    pub metadata: Option<Map<String, Value>>,
    pub collection_id: Option<i32>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub checked: usize,
    pub removed: usize,
    pub failed: usize,
}

/// A downloaded image with its metadata embedded, staged on local disk.
/// Dropping it removes the scratch file.
#[derive(Debug)]
pub struct ImageDownload {
    pub filename: String,
    pub content_type: String,
    pub file: ScratchFile,
    pub outcome: EmbedOutcome,
}
