use anyhow::{Context, Result, bail};
use exif::experimental::Writer;
use exif::{Field, In, Tag, Value as ExifValue};
use flate2::Crc;
use std::io::Cursor;
use std::path::Path;

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const EXIF_HEADER: &[u8; 6] = b"Exif\0\0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedOutcome {
    /// The file was rewritten with a fresh EXIF block.
    Embedded,
    /// The container has no supported EXIF location; the file is untouched.
    Unsupported,
    /// The comment does not fit the container's EXIF block; the file is untouched.
    TooLarge,
}

/// Replaces the EXIF block of the file at `path` with one holding only a
/// `UserComment` tag set to `comment`. JPEG and PNG are supported.
pub fn embed_user_comment(path: &Path, comment: &str) -> Result<EmbedOutcome> {
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read {} for metadata embedding", path.display()))?;

    let rewritten = if data.starts_with(&JPEG_SOI) {
        let tiff = build_exif_block(comment)?;
        if !fits_jpeg_segment(&tiff) {
            return Ok(EmbedOutcome::TooLarge);
        }
        embed_in_jpeg(&data, &tiff)?
    } else if data.starts_with(&PNG_SIGNATURE) {
        embed_in_png(&data, &build_exif_block(comment)?)?
    } else {
        return Ok(EmbedOutcome::Unsupported);
    };

    std::fs::write(path, rewritten)
        .with_context(|| format!("Failed to overwrite {}", path.display()))?;
    Ok(EmbedOutcome::Embedded)
}

/// Serializes a big-endian TIFF structure carrying the comment in the Exif IFD.
pub fn build_exif_block(comment: &str) -> Result<Vec<u8>> {
    let field = Field {
        tag: Tag::UserComment,
        ifd_num: In::PRIMARY,
        value: ExifValue::Undefined(encode_user_comment(comment), 0),
    };

    let mut writer = Writer::new();
    writer.push_field(&field);

    let mut buf = Cursor::new(Vec::new());
    writer
        .write(&mut buf, false)
        .context("Failed to serialize EXIF block")?;
    Ok(buf.into_inner())
}

/// UserComment payload: 8-byte character code, then the text. Pure ASCII
/// stays ASCII; anything else is UTF-16 in the block's (big-endian) order.
fn encode_user_comment(comment: &str) -> Vec<u8> {
    if comment.is_ascii() {
        let mut bytes = b"ASCII\0\0\0".to_vec();
        bytes.extend_from_slice(comment.as_bytes());
        bytes
    } else {
        let mut bytes = b"UNICODE\0".to_vec();
        for unit in comment.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        bytes
    }
}

/// An APP1 segment length is a u16 counting itself and the `Exif` header.
fn fits_jpeg_segment(tiff: &[u8]) -> bool {
    2 + EXIF_HEADER.len() + tiff.len() <= u16::MAX as usize
}

/// Drops every existing `APP1 Exif` segment and inserts `tiff` as a new one
/// right after SOI and any leading APP0 (JFIF) segments.
pub fn embed_in_jpeg(data: &[u8], tiff: &[u8]) -> Result<Vec<u8>> {
    if !data.starts_with(&JPEG_SOI) {
        bail!("Not a JPEG file");
    }

    if !fits_jpeg_segment(tiff) {
        bail!("EXIF block of {} bytes does not fit in a JPEG segment", tiff.len());
    }
    let segment_len = 2 + EXIF_HEADER.len() + tiff.len();

    let mut app1 = Vec::with_capacity(segment_len + 2);
    app1.extend_from_slice(&[0xFF, 0xE1]);
    app1.extend_from_slice(&(segment_len as u16).to_be_bytes());
    app1.extend_from_slice(EXIF_HEADER);
    app1.extend_from_slice(tiff);

    let mut out = Vec::with_capacity(data.len() + app1.len());
    out.extend_from_slice(&JPEG_SOI);

    let mut pos = JPEG_SOI.len();
    let mut inserted = false;

    while pos < data.len() {
        if data[pos] != 0xFF || pos + 1 >= data.len() {
            bail!("Malformed JPEG marker at offset {}", pos);
        }
        let marker = data[pos + 1];

        match marker {
            // Fill byte before a marker
            0xFF => {
                pos += 1;
                continue;
            }
            // Start of scan or end of image: the rest is entropy-coded data
            0xDA | 0xD9 => {
                if !inserted {
                    out.extend_from_slice(&app1);
                    inserted = true;
                }
                out.extend_from_slice(&data[pos..]);
                break;
            }
            // Standalone markers carry no length
            0x01 | 0xD0..=0xD7 => {
                out.extend_from_slice(&data[pos..pos + 2]);
                pos += 2;
                continue;
            }
            _ => {}
        }

        if pos + 4 > data.len() {
            bail!("Truncated JPEG segment at offset {}", pos);
        }
        let len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        let end = pos + 2 + len;
        if len < 2 || end > data.len() {
            bail!("Truncated JPEG segment at offset {}", pos);
        }
        let segment = &data[pos..end];

        if !inserted && marker != 0xE0 {
            out.extend_from_slice(&app1);
            inserted = true;
        }

        let is_exif = marker == 0xE1 && segment.len() >= 10 && &segment[4..10] == EXIF_HEADER;
        if !is_exif {
            out.extend_from_slice(segment);
        }
        pos = end;
    }

    if !inserted {
        out.extend_from_slice(&app1);
    }
    Ok(out)
}

/// Drops every existing `eXIf` chunk and inserts `tiff` as a new one before
/// the first `IDAT` chunk.
pub fn embed_in_png(data: &[u8], tiff: &[u8]) -> Result<Vec<u8>> {
    if !data.starts_with(&PNG_SIGNATURE) {
        bail!("Not a PNG file");
    }

    let mut out = Vec::with_capacity(data.len() + tiff.len() + 12);
    out.extend_from_slice(&PNG_SIGNATURE);

    let mut pos = PNG_SIGNATURE.len();
    let mut inserted = false;

    while pos + 8 <= data.len() {
        let len = u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
            as usize;
        let kind = &data[pos + 4..pos + 8];
        let end = pos + 12 + len;
        if end > data.len() {
            bail!("Truncated PNG chunk at offset {}", pos);
        }

        if kind == b"IDAT" && !inserted {
            write_png_chunk(&mut out, b"eXIf", tiff)?;
            inserted = true;
        }
        if kind != b"eXIf" {
            out.extend_from_slice(&data[pos..end]);
        }
        pos = end;
    }

    if !inserted {
        bail!("PNG file has no image data");
    }
    Ok(out)
}

fn write_png_chunk(out: &mut Vec<u8>, kind: &[u8; 4], payload: &[u8]) -> Result<()> {
    let len = u32::try_from(payload.len()).context("PNG chunk too large")?;

    let mut crc = Crc::new();
    crc.update(kind);
    crc.update(payload);

    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(payload);
    out.extend_from_slice(&crc.sum().to_be_bytes());
    Ok(())
}
