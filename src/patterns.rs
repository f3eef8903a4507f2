//! Compiled regex patterns shared across the pipeline.
//!
//! All patterns are compiled once at first use using `LazyLock`.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Visibility
// =============================================================================

/// Inline style hiding an element with `display: none`.
pub static DISPLAY_NONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"display:\s*none").expect("DISPLAY_NONE regex"));

/// Inline style hiding an element with `visibility: hidden`.
///
/// The property must start the declaration list or follow a non-word
/// character, so `-webkit-visibility` style vendor names still count but
/// `xvisibility` does not.
pub static VISIBILITY_HIDDEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\W)visibility:\s*hidden").expect("VISIBILITY_HIDDEN regex"));

// =============================================================================
// Images
// =============================================================================

/// Image file extension at the end of a URL path.
pub static IMAGE_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(gif|png|jpe?g|svg|webp)$").expect("IMAGE_EXTENSION regex"));

/// Extensions the image localizer accepts into the book.
pub const EBOOK_IMAGE_TYPES: &[&str] = &[".gif", ".png", ".jpg", ".jpeg", ".svg"];

// =============================================================================
// Charset
// =============================================================================

/// `charset=` parameter inside a `Content-Type` header value.
pub static HEADER_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)charset\s*=\s*["']?([^"';\s]+)"#).expect("HEADER_CHARSET regex")
});
