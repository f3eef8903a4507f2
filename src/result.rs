//! Result types for extraction output.
//!
//! [`Article`] is what the extractor hands back for one page; [`Section`]
//! is the per-page record a book is assembled from.

use serde::{Deserialize, Serialize};

/// Output of content extraction for a single page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Article title, when the page has one.
    pub title: Option<String>,

    /// Cleaned content fragment. Empty when extraction failed.
    pub content: String,
}

impl Article {
    /// An article with no title and empty content.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

/// One page of a book as it moves through the pipeline.
///
/// A section is owned by a single pipeline task at a time. `html` holds the
/// raw page (downloaded when only `url` is set); `content` holds the
/// cleaned fragment once extraction has run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Source URL of the page.
    pub url: Option<String>,

    /// Raw page markup.
    pub html: Option<String>,

    /// Title found during extraction.
    pub title: Option<String>,

    /// Ebook-ready content fragment.
    pub content: Option<String>,

    /// Local paths of images referenced by `content`, relative to the
    /// output directory.
    #[serde(default)]
    pub images: Vec<String>,
}

impl Section {
    /// A section that still needs its page downloaded.
    #[must_use]
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// A section whose markup is already at hand.
    #[must_use]
    pub fn from_html(url: Option<String>, html: impl Into<String>) -> Self {
        Self {
            url,
            html: Some(html.into()),
            ..Self::default()
        }
    }
}
