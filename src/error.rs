//! Error types for rs-ebook-clean.
//!
//! This module defines the errors returned while loading rule sets and
//! options, and the failures the readability stage can report. Download
//! failures have their own type in [`crate::download::DownloadError`].

/// Error type for configuration and extraction operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A CSS selector argument could not be parsed.
    #[error("invalid CSS selector for {operation}: {selector:?}")]
    InvalidSelector {
        /// Operation the selector was given to.
        operation: &'static str,
        /// The offending selector text.
        selector: String,
    },

    /// A regex fragment argument could not be compiled.
    #[error("invalid pattern for {operation}: {source}")]
    InvalidPattern {
        /// Operation the pattern was given to.
        operation: &'static str,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// A rule set document is malformed or names an unknown operation.
    #[error("invalid rule set: {0}")]
    InvalidRuleSet(String),

    /// Options could not be parsed.
    #[error("invalid options: {0}")]
    Config(String),

    /// The readability collaborator failed to produce an article.
    #[error("Extraction failed: {0}")]
    Extraction(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidRuleSet(err.to_string())
    }
}

/// Result type alias for configuration and extraction operations.
pub type Result<T> = std::result::Result<T, Error>;
