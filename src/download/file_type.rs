//! File type inference and on-disk naming for downloads.

use sha2::{Digest, Sha256};

use crate::url_utils;

/// Hex characters of the URL digest kept in file names.
const NAME_DIGEST_LEN: usize = 16;

/// Extension for a `Content-Type` header value, ignoring parameters.
#[must_use]
pub fn extension_from_content_type(content_type: &str) -> Option<&'static str> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase();

    let ext = match mime.as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => ".jpg",
        "image/png" => ".png",
        "image/gif" => ".gif",
        "image/svg+xml" => ".svg",
        "image/webp" => ".webp",
        "image/bmp" => ".bmp",
        "image/x-icon" | "image/vnd.microsoft.icon" => ".ico",
        "text/html" | "application/xhtml+xml" => ".html",
        "text/plain" => ".txt",
        "text/css" => ".css",
        "application/json" => ".json",
        "application/xml" | "text/xml" => ".xml",
        "application/pdf" => ".pdf",
        _ => return None,
    };
    Some(ext)
}

/// File type of a download: the content-type table first, then an image
/// extension at the end of the URL path.
#[must_use]
pub fn infer_file_type(content_type: Option<&str>, url: &str) -> Option<String> {
    content_type
        .and_then(extension_from_content_type)
        .map(str::to_string)
        .or_else(|| url_utils::image_extension(url))
}

/// Stable file name for a persisted download.
///
/// The same URL always maps to the same name, so an image referenced twice
/// is stored once.
#[must_use]
pub fn file_name(url: &str, file_type: Option<&str>) -> String {
    let digest = Sha256::digest(url.as_bytes());
    let mut name = hex_encode(&digest);
    name.truncate(NAME_DIGEST_LEN);
    name.push_str(file_type.unwrap_or(""));
    name
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;

    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}
