//! Configuration options for the cleaning pipeline.
//!
//! The `Options` struct controls download limits, image handling and
//! validation. Every field has a default, and a partial JSON document
//! overrides only the fields it names.

use serde::Deserialize;

use crate::error::{Error, Result};

/// Per-image download cap in bytes.
pub const DEFAULT_MAX_IMAGE_SIZE: u64 = 1024 * 1024;

/// Configuration options for extraction, localization and validation.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use rs_ebook_clean::Options;
///
/// // Use defaults
/// let options = Options::default();
/// assert_eq!(options.max_images, 30);
///
/// // Customize specific fields
/// let options = Options {
///     concurrency: 2,
///     validate_results: false,
///     ..Options::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Maximum number of distinct images localized per section.
    ///
    /// Default: `30`
    pub max_images: usize,

    /// Abort an image download once this many bytes have been received.
    ///
    /// Default: `1 MiB`
    pub max_image_size: u64,

    /// Byte budget shared by all image downloads of one section.
    ///
    /// Default: `6 MiB`
    pub max_total_image_size: u64,

    /// Abort a page download once this many bytes have been received.
    ///
    /// Default: `5 MiB`
    pub max_page_size: u64,

    /// Images smaller than this that were stretched to full width are
    /// restored to their intrinsic width.
    ///
    /// Default: `4000`
    pub small_image_size: u64,

    /// Maximum number of downloads in flight per batch.
    ///
    /// Default: `8`
    pub concurrency: usize,

    /// TCP connect timeout.
    ///
    /// Default: `30`
    pub connect_timeout_secs: u64,

    /// Whole-request timeout.
    ///
    /// Default: `60`
    pub request_timeout_secs: u64,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,

    /// Folder, relative to the output directory, that localized images are
    /// written to and that rewritten `src` attributes point into.
    ///
    /// Default: `"images"`
    pub image_dir: String,

    /// Run the results validator after extraction.
    ///
    /// The validator only reports; it never blocks a section.
    ///
    /// Default: `true`
    pub validate_results: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_images: 30,
            max_image_size: DEFAULT_MAX_IMAGE_SIZE,
            max_total_image_size: 6 * DEFAULT_MAX_IMAGE_SIZE,
            max_page_size: 5 * DEFAULT_MAX_IMAGE_SIZE,
            small_image_size: 4000,
            concurrency: 8,
            connect_timeout_secs: 30,
            request_timeout_secs: 60,
            user_agent: concat!("rs-ebook-clean/", env!("CARGO_PKG_VERSION")).to_string(),
            image_dir: "images".to_string(),
            validate_results: true,
        }
    }
}

impl Options {
    /// Load options from JSON, keeping defaults for missing fields.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        options.check()?;
        Ok(options)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn check(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(Error::Config("concurrency must be at least 1".to_string()));
        }
        if self.image_dir.trim().is_empty() {
            return Err(Error::Config("image_dir must not be empty".to_string()));
        }
        if self.max_total_image_size < self.max_image_size {
            return Err(Error::Config(format!(
                "max_total_image_size ({}) is below max_image_size ({})",
                self.max_total_image_size, self.max_image_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.max_images, 30);
        assert_eq!(options.max_image_size, 1_048_576);
        assert_eq!(options.max_total_image_size, 6 * options.max_image_size);
        assert_eq!(options.small_image_size, 4000);
        assert_eq!(options.image_dir, "images");
        assert!(options.validate_results);
        assert!(options.check().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options = Options::from_json(r#"{"max_images": 5, "validate_results": false}"#).unwrap();
        assert_eq!(options.max_images, 5);
        assert!(!options.validate_results);
        assert_eq!(options.concurrency, Options::default().concurrency);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        assert!(matches!(Options::from_json(r#"{"concurrency": 0}"#), Err(Error::Config(_))));
        assert!(matches!(Options::from_json(r#"{"max_images": "many"}"#), Err(Error::Config(_))));
        assert!(matches!(
            Options::from_json(r#"{"max_image_size": 10, "max_total_image_size": 5}"#),
            Err(Error::Config(_))
        ));
    }
}
