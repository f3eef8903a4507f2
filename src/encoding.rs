//! Character encoding detection and transcoding for downloaded pages.
//!
//! The charset is taken from the response `Content-Type` header when it
//! names one, then from the page's own `<meta>` declarations, then UTF-8.

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use std::sync::LazyLock;

use crate::patterns::HEADER_CHARSET;

/// Match `<meta charset="...">` tag
#[allow(clippy::expect_used)]
static CHARSET_META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s/>;]+)"#).expect("valid regex")
});

/// Only the start of a page is searched for `<meta>` declarations.
const META_SCAN_LIMIT: usize = 1024;

fn lookup(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
}

/// Encoding named by a `Content-Type` header value, if any.
#[must_use]
pub fn encoding_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    HEADER_CHARSET
        .captures(content_type)
        .and_then(|c| c.get(1))
        .and_then(|m| lookup(m.as_str()))
}

/// Encoding declared by the page's `<meta>` tags, if any.
///
/// Covers both `<meta charset="...">` and the `http-equiv` form, whose
/// `content` attribute carries the same `charset=` parameter.
#[must_use]
pub fn encoding_from_meta(html: &[u8]) -> Option<&'static Encoding> {
    let head = String::from_utf8_lossy(&html[..html.len().min(META_SCAN_LIMIT)]);
    CHARSET_META_RE
        .captures(&head)
        .and_then(|c| c.get(1))
        .and_then(|m| lookup(m.as_str()))
}

/// Pick the encoding for a downloaded page.
#[must_use]
pub fn detect_encoding(html: &[u8], content_type: Option<&str>) -> &'static Encoding {
    content_type
        .and_then(encoding_from_content_type)
        .or_else(|| encoding_from_meta(html))
        .unwrap_or(UTF_8)
}

/// Decode page bytes to a UTF-8 string.
///
/// A byte-order mark overrides the detected encoding; invalid sequences
/// become U+FFFD rather than errors.
#[must_use]
pub fn decode_page(html: &[u8], content_type: Option<&str>) -> String {
    let encoding = detect_encoding(html, content_type);
    let (decoded, _, _) = encoding.decode(html);
    decoded.into_owned()
}
