//! Streaming HTTP downloads with size caps.
//!
//! A [`Downloader`] fetches one resource at a time with [`Downloader::download`],
//! or a batch with [`Downloader::all`]. Bodies are streamed and the transfer
//! is abandoned as soon as it reaches its byte limit. Batches can share an
//! aggregate [`SizeBudget`].
//!
//! # Example
//!
//! ```no_run
//! use rs_ebook_clean::download::{DownloadOptions, Downloader};
//! use rs_ebook_clean::Options;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = Downloader::new(&Options::default())?;
//! let result = downloader
//!     .download(Some("https://example.com/logo.png"), &DownloadOptions::in_memory(1024 * 1024))
//!     .await?;
//! println!("{:?} {:?}", result.status_code, result.file_type);
//! # Ok(())
//! # }
//! ```

mod budget;
mod error;
pub mod file_type;
mod storage;

pub use budget::SizeBudget;
pub use error::DownloadError;
pub use storage::{FileStorage, Storage};

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::observer::{default_observer, Observer};
use crate::options::Options;
use crate::url_utils;

/// Per-download settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Directory to persist a successful download into. `None` keeps the
    /// bytes in memory.
    pub path: Option<PathBuf>,

    /// Abort once this many bytes have been received.
    pub max_size: u64,
}

impl DownloadOptions {
    /// Keep the body in memory.
    #[must_use]
    pub fn in_memory(max_size: u64) -> Self {
        Self { path: None, max_size }
    }

    /// Save the body under `dir`.
    #[must_use]
    pub fn to_dir(dir: impl Into<PathBuf>, max_size: u64) -> Self {
        Self {
            path: Some(dir.into()),
            max_size,
        }
    }
}

/// One entry of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// The resource to fetch. A request without one fails with
    /// [`DownloadError::MissingUrl`] inside its result.
    pub url: Option<String>,

    /// Settings for this download.
    pub options: DownloadOptions,
}

impl DownloadRequest {
    /// A request for `url`.
    #[must_use]
    pub fn new(url: impl Into<String>, options: DownloadOptions) -> Self {
        Self {
            url: Some(url.into()),
            options,
        }
    }
}

/// Outcome of one download attempt.
#[derive(Debug, Default)]
pub struct DownloadResult {
    /// The requested URL.
    pub url: String,

    /// HTTP status, when a response arrived.
    pub status_code: Option<u16>,

    /// Whether the status was in `[200, 300)` and the body was received.
    pub success: bool,

    /// `Content-Type` header value.
    pub content_type: Option<String>,

    /// Bytes received, or the declared length when the body was not read.
    pub content_length: Option<u64>,

    /// Extension with leading dot, e.g. `.png`.
    pub file_type: Option<String>,

    /// Body bytes, for in-memory downloads.
    pub content: Option<Vec<u8>>,

    /// Where the body was written, for persisted downloads.
    pub path: Option<PathBuf>,

    /// Why the download failed. `None` for unsuccessful statuses.
    pub error: Option<DownloadError>,
}

impl DownloadResult {
    /// A result carrying only an error.
    #[must_use]
    pub fn failed(url: impl Into<String>, error: DownloadError) -> Self {
        Self {
            url: url.into(),
            error: Some(error),
            ..Self::default()
        }
    }

    /// File name of a persisted download.
    #[must_use]
    pub fn file_name(&self) -> Option<String> {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
    }
}

/// HTTP client for size-capped downloads.
///
/// Cheap to clone; clones share the connection pool, storage and observer.
#[derive(Clone)]
pub struct Downloader {
    client: Client,
    storage: Arc<dyn Storage>,
    observer: Arc<dyn Observer>,
    concurrency: usize,
}

impl fmt::Debug for Downloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Downloader")
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

impl Downloader {
    /// Build a downloader with the timeouts, user agent and concurrency
    /// from `options`.
    pub fn new(options: &Options) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(options.connect_timeout_secs))
            .timeout(Duration::from_secs(options.request_timeout_secs))
            .user_agent(options.user_agent.as_str())
            .gzip(true)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::from_client(client).with_concurrency(options.concurrency))
    }

    /// Wrap an existing client.
    #[must_use]
    pub fn from_client(client: Client) -> Self {
        Self {
            client,
            storage: Arc::new(FileStorage),
            observer: default_observer(),
            concurrency: Options::default().concurrency,
        }
    }

    /// Persist downloads through `storage`.
    #[must_use]
    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = storage;
        self
    }

    /// Report finished downloads to `observer`.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    /// Maximum downloads in flight per batch.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Fetch a single resource.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::MissingUrl`] when `url` is `None` or blank
    /// - [`DownloadError::InvalidUrl`] when it is not an http(s) URL
    /// - [`DownloadError::Aborted`] when the body reaches `options.max_size`
    /// - [`DownloadError::Transport`] on network failure
    /// - [`DownloadError::Io`] when persisting fails
    ///
    /// A non-2xx status is returned as `Ok` with `success == false`.
    #[instrument(level = "debug", skip(self, options), fields(url = url.unwrap_or("")))]
    pub async fn download(
        &self,
        url: Option<&str>,
        options: &DownloadOptions,
    ) -> std::result::Result<DownloadResult, DownloadError> {
        match self.fetch(url, options, None).await {
            Ok(result) => {
                self.observer.download_finished(&result);
                Ok(result)
            }
            Err(error) => {
                self.observer.download_failed(url.unwrap_or(""), &error);
                Err(error)
            }
        }
    }

    /// Fetch every request concurrently.
    ///
    /// Always yields exactly one result per request, in request order.
    /// Failures are reported in each result's `error` field.
    pub async fn all(&self, requests: Vec<DownloadRequest>) -> Vec<DownloadResult> {
        self.run_batch(requests, None).await
    }

    /// Like [`all`](Self::all), with the batch's total received bytes held
    /// under `max_total`. A download that would exceed it is aborted.
    pub async fn all_with_budget(&self, requests: Vec<DownloadRequest>, max_total: u64) -> Vec<DownloadResult> {
        let budget = SizeBudget::new(max_total);
        let results = self.run_batch(requests, Some(&budget)).await;
        debug!(used = budget.used(), limit = budget.limit(), "download batch finished");
        results
    }

    async fn run_batch(&self, requests: Vec<DownloadRequest>, budget: Option<&SizeBudget>) -> Vec<DownloadResult> {
        stream::iter(requests)
            .map(|request| async move {
                let outcome = self.fetch(request.url.as_deref(), &request.options, budget).await;
                let result = match outcome {
                    Ok(result) => result,
                    Err(error) => DownloadResult::failed(request.url.unwrap_or_default(), error),
                };
                self.observer.download_finished(&result);
                result
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }

    async fn fetch(
        &self,
        url: Option<&str>,
        options: &DownloadOptions,
        budget: Option<&SizeBudget>,
    ) -> std::result::Result<DownloadResult, DownloadError> {
        let url = url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(DownloadError::MissingUrl)?;
        let target = url_utils::parse_url(url).ok_or_else(|| DownloadError::InvalidUrl { url: url.to_string() })?;

        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(|e| DownloadError::transport(url, e))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut result = DownloadResult {
            url: url.to_string(),
            status_code: Some(status.as_u16()),
            success: status.is_success(),
            file_type: file_type::infer_file_type(content_type.as_deref(), url),
            content_type,
            content_length: response.content_length(),
            ..DownloadResult::default()
        };

        if !result.success {
            return Ok(result);
        }

        if result.content_length.is_some_and(|len| len >= options.max_size) {
            return Err(DownloadError::aborted(url, options.max_size));
        }

        let body = read_capped(response, url, options.max_size, budget).await?;
        result.content_length = Some(body.len() as u64);

        match &options.path {
            Some(dir) => {
                let path = dir.join(file_type::file_name(url, result.file_type.as_deref()));
                self.storage
                    .save(&path, &body)
                    .await
                    .map_err(|e| DownloadError::io(path.clone(), e))?;
                result.path = Some(path);
            }
            None => result.content = Some(body),
        }

        Ok(result)
    }
}

/// Read the body, stopping at `max_size` bytes or when the shared budget
/// runs out. Bytes reserved from the budget are returned on failure.
async fn read_capped(
    response: Response,
    url: &str,
    max_size: u64,
    budget: Option<&SizeBudget>,
) -> std::result::Result<Vec<u8>, DownloadError> {
    let mut stream = response.bytes_stream();
    let mut body = Vec::new();
    let mut reserved: u64 = 0;

    let abandon = |reserved: u64, error: DownloadError| {
        if let Some(budget) = budget {
            budget.release(reserved);
        }
        Err(error)
    };

    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => return abandon(reserved, DownloadError::transport(url, e)),
        };
        let len = chunk.len() as u64;

        if body.len() as u64 + len >= max_size {
            return abandon(reserved, DownloadError::aborted(url, max_size));
        }
        if let Some(budget) = budget {
            if !budget.reserve(len) {
                return abandon(reserved, DownloadError::aborted(url, budget.limit()));
            }
            reserved += len;
        }

        body.extend_from_slice(&chunk);
    }

    Ok(body)
}
