//! Error types for the download module.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fetching a page or image.
///
/// A response with a non-2xx status is not an error: it yields a
/// [`DownloadResult`](super::DownloadResult) with `success == false`.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// No URL was given.
    #[error("missing URL")]
    MissingUrl,

    /// The URL is malformed or not http(s).
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The rejected URL string.
        url: String,
    },

    /// The transfer was stopped after reaching its byte limit.
    #[error("download aborted: {url} reached the {limit} byte limit")]
    Aborted {
        /// The URL being fetched.
        url: String,
        /// The limit that was hit.
        limit: u64,
    },

    /// Network-level failure (DNS, connect, TLS, timeout, broken body).
    #[error("network error downloading {url}: {source}")]
    Transport {
        /// The URL that failed to download.
        url: String,
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The downloaded bytes could not be written to storage.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// Destination path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// Creates a transport error from a reqwest error.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Creates an abort error for a byte limit.
    pub fn aborted(url: impl Into<String>, limit: u64) -> Self {
        Self::Aborted {
            url: url.into(),
            limit,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this download was stopped by a size limit.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aborted_message_mentions_abort() {
        let err = DownloadError::aborted("http://a.fake/big.png", 1);
        assert!(err.is_aborted());
        assert!(err.to_string().to_lowercase().contains("abort"));
    }

    #[test]
    fn test_missing_url_message() {
        assert_eq!(DownloadError::MissingUrl.to_string(), "missing URL");
        assert!(!DownloadError::MissingUrl.is_aborted());
    }
}
