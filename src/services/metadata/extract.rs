use anyhow::{Context, Result};
use exif::{Exif, In, Tag, Value as ExifValue};
use serde_json::{Map, Value, json};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// IFD pointers and vendor-specific binary payloads, useless as text.
const SKIPPED_TAGS: [Tag; 6] = [
    Tag::ExifIFDPointer,
    Tag::GPSInfoIFDPointer,
    Tag::InteropIFDPointer,
    Tag::MakerNote,
    Tag::ComponentsConfiguration,
    Tag::FileSource,
];

/// Extracts metadata from the file at `path`: sniffed MIME type, pixel
/// dimensions and every primary-image EXIF field rendered as display text.
/// Filesystem attributes (size, timestamps) are deliberately not reported.
pub fn extract_metadata(path: &Path) -> Result<Map<String, Value>> {
    let mut doc = Map::new();

    let kind = infer::get_from_path(path)
        .with_context(|| format!("Failed to open {} for metadata extraction", path.display()))?;
    if let Some(kind) = kind {
        doc.insert("MIMEType".to_string(), json!(kind.mime_type()));
        doc.insert("FileTypeExtension".to_string(), json!(kind.extension()));
    }

    if let Ok((width, height)) = image::image_dimensions(path) {
        doc.insert("ImageWidth".to_string(), json!(width));
        doc.insert("ImageHeight".to_string(), json!(height));
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open {} for EXIF parsing", path.display()))?;
    let mut reader = BufReader::new(file);

    match exif::Reader::new().read_from_container(&mut reader) {
        Ok(exif) => collect_exif_fields(&exif, &mut doc),
        Err(exif::Error::NotFound(_)) => {}
        Err(e) => tracing::debug!("No usable EXIF in {}: {}", path.display(), e),
    }

    Ok(doc)
}

fn collect_exif_fields(exif: &Exif, doc: &mut Map<String, Value>) {
    for field in exif.fields() {
        if field.ifd_num != In::PRIMARY || SKIPPED_TAGS.contains(&field.tag) {
            continue;
        }

        if field.tag == Tag::UserComment {
            if let Some(comment) = decode_user_comment(&field.value, exif.little_endian()) {
                merge_user_comment(&comment, doc);
            }
            continue;
        }

        let value = field.display_value().with_unit(exif).to_string();
        doc.insert(field.tag.to_string(), Value::String(value));
    }
}

/// A comment holding a JSON object (as written on download) is expanded
/// back into individual keys; anything else is kept as plain text.
fn merge_user_comment(comment: &str, doc: &mut Map<String, Value>) {
    match serde_json::from_str::<Value>(comment) {
        Ok(Value::Object(fields)) => {
            for (key, value) in fields {
                doc.insert(key, value);
            }
        }
        _ => {
            if !comment.is_empty() {
                doc.insert("UserComment".to_string(), json!(comment));
            }
        }
    }
}

/// Decodes an EXIF UserComment: an 8-byte character code followed by text.
pub fn decode_user_comment(value: &ExifValue, little_endian: bool) -> Option<String> {
    let ExifValue::Undefined(bytes, _) = value else {
        return None;
    };
    if bytes.len() < 8 {
        return None;
    }

    let (code, text) = bytes.split_at(8);
    let decoded = match code {
        b"UNICODE\0" => {
            let units: Vec<u16> = text
                .chunks_exact(2)
                .map(|pair| {
                    if little_endian {
                        u16::from_le_bytes([pair[0], pair[1]])
                    } else {
                        u16::from_be_bytes([pair[0], pair[1]])
                    }
                })
                .collect();
            String::from_utf16_lossy(&units)
        }
        // ASCII, JIS and undefined codes: best effort as UTF-8
        _ => String::from_utf8_lossy(text).into_owned(),
    };

    Some(decoded.trim_end_matches(['\0', ' ']).to_string())
}
