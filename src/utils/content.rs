use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

/// Picks the content type for a stored or served file: the declared type
/// unless it is missing or generic, then the sniffed type, then a guess from
/// the extension, then `application/octet-stream`.
pub fn resolve_content_type(declared: Option<&str>, sniffed: Option<&str>, filename: &str) -> String {
    if let Some(declared) = declared.map(str::trim).filter(|t| !is_generic(t)) {
        return declared.to_string();
    }

    if let Some(sniffed) = sniffed {
        return sniffed.to_string();
    }

    extension_content_type(filename).unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string())
}

fn is_generic(content_type: &str) -> bool {
    content_type.is_empty()
        || content_type == mime::APPLICATION_OCTET_STREAM.as_ref()
        || content_type == "application/stream"
}

fn extension_content_type(filename: &str) -> Option<String> {
    let (_, extension) = filename.rsplit_once('.')?;
    let content_type = match extension.to_lowercase().as_str() {
        "jpg" | "jpeg" => mime::IMAGE_JPEG.to_string(),
        "png" => mime::IMAGE_PNG.to_string(),
        "gif" => mime::IMAGE_GIF.to_string(),
        "bmp" => mime::IMAGE_BMP.to_string(),
        "svg" => mime::IMAGE_SVG.to_string(),
        "webp" => "image/webp".to_string(),
        "tif" | "tiff" => "image/tiff".to_string(),
        "heic" => "image/heic".to_string(),
        _ => return None,
    };
    Some(content_type)
}

/// `attachment` disposition with an ASCII fallback name plus the RFC 5987
/// UTF-8 form for clients that understand it.
pub fn attachment_disposition(filename: &str) -> String {
    let ascii_filename = filename
        .chars()
        .filter(|c| c.is_ascii() && !c.is_control() && *c != '"' && *c != '\\' && *c != ';')
        .take(64)
        .collect::<String>();
    let fallback_filename = if ascii_filename.trim().is_empty() {
        "image"
    } else {
        &ascii_filename
    };

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback_filename,
        utf8_percent_encode(filename, NON_ALPHANUMERIC)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_type_wins() {
        assert_eq!(
            resolve_content_type(Some("image/png"), Some("image/jpeg"), "a.jpg"),
            "image/png"
        );
    }

    #[test]
    fn test_generic_declared_type_falls_back() {
        assert_eq!(
            resolve_content_type(Some("application/octet-stream"), Some("image/jpeg"), "a.bin"),
            "image/jpeg"
        );
        assert_eq!(resolve_content_type(Some(""), None, "scan.TIFF"), "image/tiff");
        assert_eq!(
            resolve_content_type(None, None, "notes"),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_attachment_disposition() {
        assert_eq!(
            attachment_disposition("cat.jpg"),
            "attachment; filename=\"cat.jpg\"; filename*=UTF-8''cat%2Ejpg"
        );

        let header = attachment_disposition("férias \"1\".png");
        assert!(header.starts_with("attachment; filename=\"frias 1.png\""));
        assert!(header.ends_with("f%C3%A9rias%20%221%22%2Epng"));

        assert!(attachment_disposition("日本.jpg").contains("filename=\".jpg\""));
        assert!(attachment_disposition("日本").contains("filename=\"image\""));
    }
}
