use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Metadata not provided")]
    MissingMetadata,

    #[error("Metadata must be a JSON object")]
    MetadataNotObject,

    #[error("Invalid metadata JSON: {0}")]
    InvalidMetadataJson(String),

    #[error("Invalid collection id: {0}")]
    InvalidCollectionId(String),
}

impl From<ValidationError> for crate::api::error::AppError {
    fn from(e: ValidationError) -> Self {
        crate::api::error::AppError::BadRequest(e.to_string())
    }
}

/// How a request refers to an image's collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionRef {
    /// Leave the current collection untouched
    Unchanged,
    /// Detach from any collection
    Detach,
    Set(i32),
}

/// Reduces a client-supplied filename to a safe single path component.
pub fn sanitize_filename(filename: &str) -> String {
    // Browsers on Windows may send full paths
    let last = filename.rsplit(['/', '\\']).next().unwrap_or("");
    let name = Path::new(last)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        tracing::warn!("Path components stripped from upload filename: {}", filename);
    }

    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_control()
                || matches!(c, ':' | '*' | '?' | '"' | '<' | '>' | '|' | ';' | '#' | '%')
            {
                '_'
            } else {
                c
            }
        })
        .collect();

    let trimmed = sanitized.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        "unnamed".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parses the optional `metadata` multipart field. Blank means no metadata.
pub fn parse_metadata_text(text: &str) -> Result<Option<Map<String, Value>>, ValidationError> {
    if text.trim().is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(text)
        .map_err(|e| ValidationError::InvalidMetadataJson(e.to_string()))?;
    match value {
        Value::Object(map) => Ok(Some(map)),
        Value::Null => Ok(None),
        _ => Err(ValidationError::MetadataNotObject),
    }
}

/// Requires a metadata document on update: present, non-null, an object.
pub fn require_metadata_object(
    value: Option<Value>,
) -> Result<Map<String, Value>, ValidationError> {
    match value {
        None | Some(Value::Null) => Err(ValidationError::MissingMetadata),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(ValidationError::MetadataNotObject),
    }
}

/// Parses the optional `collectionId` multipart field. Blank or "null" means none.
pub fn parse_collection_id_text(text: &str) -> Result<Option<i32>, ValidationError> {
    let text = text.trim();
    if text.is_empty() || text == "null" {
        return Ok(None);
    }

    text.parse::<i32>()
        .map(Some)
        .map_err(|_| ValidationError::InvalidCollectionId(text.to_string()))
}

/// Interprets `collectionId` from a JSON body. `field` is `None` when the key
/// was absent altogether.
pub fn parse_collection_ref(field: Option<&Value>) -> Result<CollectionRef, ValidationError> {
    match field {
        None => Ok(CollectionRef::Unchanged),
        Some(Value::Null) => Ok(CollectionRef::Detach),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(CollectionRef::Set)
            .ok_or_else(|| ValidationError::InvalidCollectionId(n.to_string())),
        Some(Value::String(s)) => Ok(match parse_collection_id_text(s)? {
            Some(id) => CollectionRef::Set(id),
            None => CollectionRef::Detach,
        }),
        Some(other) => Err(ValidationError::InvalidCollectionId(other.to_string())),
    }
}

/// Overlays user-supplied keys on top of the extracted document.
pub fn merge_metadata(
    mut extracted: Map<String, Value>,
    user: Option<&Map<String, Value>>,
) -> Map<String, Value> {
    if let Some(user) = user {
        for (key, value) in user {
            extracted.insert(key.clone(), value.clone());
        }
    }
    extracted
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("photo.jpg"), "photo.jpg");
        assert_eq!(sanitize_filename("my photo.jpg"), "my photo.jpg");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\ana\\praia.png"), "praia.png");
        assert_eq!(sanitize_filename("a?b#c%d.jpg"), "a_b_c_d.jpg");
        assert_eq!(sanitize_filename("  "), "unnamed");
        assert_eq!(sanitize_filename(".."), "unnamed");
        assert_eq!(sanitize_filename("férias.jpeg"), "férias.jpeg");
    }

    #[test]
    fn test_parse_metadata_text() {
        assert_eq!(parse_metadata_text("").unwrap(), None);
        assert_eq!(parse_metadata_text("null").unwrap(), None);

        let map = parse_metadata_text(r#"{"author":"Ana"}"#).unwrap().unwrap();
        assert_eq!(map["author"], "Ana");

        assert_eq!(
            parse_metadata_text("[1,2]"),
            Err(ValidationError::MetadataNotObject)
        );
        assert!(matches!(
            parse_metadata_text("{broken"),
            Err(ValidationError::InvalidMetadataJson(_))
        ));
    }

    #[test]
    fn test_require_metadata_object() {
        assert_eq!(
            require_metadata_object(None),
            Err(ValidationError::MissingMetadata)
        );
        assert_eq!(
            require_metadata_object(Some(Value::Null)),
            Err(ValidationError::MissingMetadata)
        );
        assert_eq!(
            require_metadata_object(Some(json!("text"))),
            Err(ValidationError::MetadataNotObject)
        );
        assert!(require_metadata_object(Some(json!({}))).unwrap().is_empty());
    }

    #[test]
    fn test_parse_collection_id_text() {
        assert_eq!(parse_collection_id_text("").unwrap(), None);
        assert_eq!(parse_collection_id_text("null").unwrap(), None);
        assert_eq!(parse_collection_id_text(" 12 ").unwrap(), Some(12));
        assert!(parse_collection_id_text("abc").is_err());
    }

    #[test]
    fn test_parse_collection_ref() {
        assert_eq!(parse_collection_ref(None).unwrap(), CollectionRef::Unchanged);
        assert_eq!(
            parse_collection_ref(Some(&Value::Null)).unwrap(),
            CollectionRef::Detach
        );
        assert_eq!(
            parse_collection_ref(Some(&json!(""))).unwrap(),
            CollectionRef::Detach
        );
        assert_eq!(
            parse_collection_ref(Some(&json!("7"))).unwrap(),
            CollectionRef::Set(7)
        );
        assert_eq!(
            parse_collection_ref(Some(&json!(3))).unwrap(),
            CollectionRef::Set(3)
        );
        assert!(parse_collection_ref(Some(&json!(1.5))).is_err());
        assert!(parse_collection_ref(Some(&json!([1]))).is_err());
    }

    #[test]
    fn test_merge_metadata_user_wins() {
        let extracted = json!({"Model": "X100", "ImageWidth": 10})
            .as_object()
            .cloned()
            .unwrap();
        let user = json!({"Model": "edited", "title": "Rio"})
            .as_object()
            .cloned()
            .unwrap();

        let merged = merge_metadata(extracted, Some(&user));
        assert_eq!(merged["Model"], "edited");
        assert_eq!(merged["title"], "Rio");
        assert_eq!(merged["ImageWidth"], 10);
    }
}
