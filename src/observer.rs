//! Pipeline event reporting.
//!
//! Components never log through global state directly. Each one holds an
//! `Arc<dyn Observer>`; [`TracingObserver`] forwards events to `tracing`
//! and is used when the caller supplies nothing else.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::download::{DownloadError, DownloadResult};
use crate::error::Error;

/// Receives structured events from the pipeline.
///
/// All methods have empty default bodies, so an implementation only
/// overrides the events it cares about.
pub trait Observer: Send + Sync {
    /// A download attempt finished, successfully or not.
    fn download_finished(&self, _result: &DownloadResult) {}

    /// A single download failed before producing a result.
    fn download_failed(&self, _url: &str, _error: &DownloadError) {}

    /// The readability stage failed for a page.
    fn extraction_failed(&self, _url: Option<&str>, _error: &Error) {}

    /// A results check flagged a probable over-extraction.
    fn validation_failed(&self, _url: Option<&str>, _validator: &'static str, _percent: f64) {}
}

/// Forwards pipeline events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn download_finished(&self, result: &DownloadResult) {
        match &result.error {
            Some(error) => warn!(url = %result.url, %error, "download failed"),
            None if !result.success => warn!(
                url = %result.url,
                status = ?result.status_code,
                "download returned unsuccessful status"
            ),
            None => debug!(
                url = %result.url,
                status = ?result.status_code,
                content_type = result.content_type.as_deref().unwrap_or(""),
                bytes = ?result.content_length,
                "download finished"
            ),
        }
    }

    fn download_failed(&self, url: &str, error: &DownloadError) {
        warn!(url, %error, "download failed");
    }

    fn extraction_failed(&self, url: Option<&str>, error: &Error) {
        warn!(url = url.unwrap_or(""), %error, "extraction failed");
    }

    fn validation_failed(&self, url: Option<&str>, validator: &'static str, percent: f64) {
        warn!(url = url.unwrap_or(""), validator, percent, "results validation failed");
    }
}

/// The observer used when none is supplied.
#[must_use]
pub fn default_observer() -> Arc<dyn Observer> {
    Arc::new(TracingObserver)
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl Observer for NullObserver {}
