//! # Sniff Module
//!
//! Detects the real format of an image from its first bytes. Phones happily
//! save HEIC data under a `.jpg` name, so the extension alone is not trusted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Bytes read from the start of a file for detection
pub const HEADER_LEN: usize = 32;

/// Format detected from magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectedFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Webp,
    Heic,
    Heif,
    Unknown,
}

impl DetectedFormat {
    /// HEIC and HEIF rarely preview in a browser
    pub fn is_heif_family(&self) -> bool {
        matches!(self, DetectedFormat::Heic | DetectedFormat::Heif)
    }

    /// MIME type for a known format
    pub fn mime_type(&self) -> Option<&'static str> {
        match self {
            DetectedFormat::Jpeg => Some("image/jpeg"),
            DetectedFormat::Png => Some("image/png"),
            DetectedFormat::Gif => Some("image/gif"),
            DetectedFormat::Bmp => Some("image/bmp"),
            DetectedFormat::Webp => Some("image/webp"),
            DetectedFormat::Heic => Some("image/heic"),
            DetectedFormat::Heif => Some("image/heif"),
            DetectedFormat::Unknown => None,
        }
    }
}

impl fmt::Display for DetectedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DetectedFormat::Jpeg => "jpeg",
            DetectedFormat::Png => "png",
            DetectedFormat::Gif => "gif",
            DetectedFormat::Bmp => "bmp",
            DetectedFormat::Webp => "webp",
            DetectedFormat::Heic => "heic",
            DetectedFormat::Heif => "heif",
            DetectedFormat::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// Detect the format from header bytes.
pub fn sniff(header: &[u8]) -> DetectedFormat {
    // JPEG: FF D8 FF
    if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return DetectedFormat::Jpeg;
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if header.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return DetectedFormat::Png;
    }

    if header.starts_with(b"GIF87a") || header.starts_with(b"GIF89a") {
        return DetectedFormat::Gif;
    }

    if header.starts_with(b"BM") {
        return DetectedFormat::Bmp;
    }

    // WebP: RIFF....WEBP
    if header.len() >= 12 && header.starts_with(b"RIFF") && &header[8..12] == b"WEBP" {
        return DetectedFormat::Webp;
    }

    // ISO-BMFF: ....ftyp<brand>
    if header.len() >= 12 && &header[4..8] == b"ftyp" {
        match &header[8..12] {
            b"heic" | b"heix" | b"hevc" | b"hevx" => return DetectedFormat::Heic,
            b"mif1" | b"msf1" | b"heif" => return DetectedFormat::Heif,
            _ => {}
        }
    }

    DetectedFormat::Unknown
}

/// Read the first [`HEADER_LEN`] bytes of a file and sniff them.
///
/// An unreadable file is reported as [`DetectedFormat::Unknown`].
pub fn sniff_file(path: &Path) -> DetectedFormat {
    let mut header = Vec::with_capacity(HEADER_LEN);
    let read = File::open(path).and_then(|f| f.take(HEADER_LEN as u64).read_to_end(&mut header));

    match read {
        Ok(_) => sniff(&header),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "could not read header");
            DetectedFormat::Unknown
        }
    }
}

/// MIME type for a file, preferring the sniffed format over the extension.
///
/// `ext` is lower-case with its leading dot.
pub fn content_type(format: DetectedFormat, ext: &str) -> &'static str {
    if let Some(mime) = format.mime_type() {
        return mime;
    }

    match ext {
        ".jpg" | ".jpeg" => "image/jpeg",
        ".png" => "image/png",
        ".gif" => "image/gif",
        ".bmp" => "image/bmp",
        ".webp" => "image/webp",
        ".heif" => "image/heif",
        ".heic" => "image/heic",
        _ => "application/octet-stream",
    }
}
