//! Book pipeline.
//!
//! Turns a list of [`Section`]s into ebook-ready content in four stages:
//! page download, extraction, image localization and validation. Within a
//! stage every section runs concurrently; a stage starts only after the
//! previous one finished for the whole book.
//!
//! Failures stay local to their section. A page that cannot be downloaded
//! gets a visible `Error:` paragraph as its content, a failed extraction
//! leaves empty content, and images that cannot be fetched are dropped.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{info, instrument};

use crate::dom;
use crate::download::{DownloadOptions, DownloadResult, Downloader};
use crate::encoding::decode_page;
use crate::error::{Error, Result};
use crate::extract::{Extraction, Extractor};
use crate::images::ImageLocalizer;
use crate::observer::{default_observer, Observer};
use crate::options::Options;
use crate::result::{Article, Section};
use crate::validate::ResultsValidator;

/// A section after the pipeline ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedSection {
    /// The section with `title`, `content` and `images` filled in.
    pub section: Section,

    /// Validator verdict. `None` when validation is disabled or the section
    /// was not extracted.
    pub valid: Option<bool>,
}

/// Per-section state carried between stages.
struct Work {
    section: Section,
    preprocessed: Option<String>,
}

/// Runs download, extraction, localization and validation for a book.
#[derive(Clone)]
pub struct Pipeline {
    options: Options,
    downloader: Downloader,
    extractor: Extractor,
    localizer: ImageLocalizer,
    observer: Arc<dyn Observer>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("options", &self.options)
            .field("downloader", &self.downloader)
            .field("extractor", &self.extractor)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// A pipeline with the built-in rules and a fresh HTTP client.
    pub fn new(options: Options) -> Result<Self> {
        options.check()?;
        let downloader = Downloader::new(&options)?;
        Ok(Self::with_parts(options, downloader, Extractor::new()))
    }

    /// A pipeline over an existing downloader and extractor.
    #[must_use]
    pub fn with_parts(options: Options, downloader: Downloader, extractor: Extractor) -> Self {
        let localizer = ImageLocalizer::new(downloader.clone(), &options);
        Self {
            options,
            downloader,
            extractor,
            localizer,
            observer: default_observer(),
        }
    }

    /// Report events from every stage to `observer`.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.downloader = self.downloader.with_observer(Arc::clone(&observer));
        self.extractor = self.extractor.with_observer(Arc::clone(&observer));
        self.localizer = ImageLocalizer::new(self.downloader.clone(), &self.options);
        self.observer = observer;
        self
    }

    /// Process `sections`, writing images under `output_dir`.
    ///
    /// Always returns one entry per input section, in input order.
    #[instrument(level = "info", skip_all, fields(sections = sections.len()))]
    pub async fn run(&self, sections: Vec<Section>, output_dir: &Path) -> Vec<ProcessedSection> {
        let mut work: Vec<Work> = sections
            .into_iter()
            .map(|section| Work {
                section,
                preprocessed: None,
            })
            .collect();

        self.download_pages(&mut work).await;
        self.extract_all(&mut work).await;
        self.localize_all(&mut work, output_dir).await;
        let processed = self.validate_all(work);

        info!(
            extracted = processed.iter().filter(|p| p.valid.is_some()).count(),
            "book pipeline finished"
        );
        processed
    }

    async fn download_pages(&self, work: &mut [Work]) {
        let options = DownloadOptions::in_memory(self.options.max_page_size);
        let pending: Vec<&mut Work> = work
            .iter_mut()
            .filter(|w| w.section.html.is_none() && w.section.url.is_some())
            .collect();

        let fetches = pending.into_iter().map(|w| {
            let options = &options;
            async move {
                let outcome = self.downloader.download(w.section.url.as_deref(), options).await;
                match outcome {
                    Ok(result) if result.success => match result.content.as_deref() {
                        Some(bytes) => w.section.html = Some(decode_page(bytes, result.content_type.as_deref())),
                        None => w.section.content = Some(error_placeholder("empty response")),
                    },
                    Ok(result) => w.section.content = Some(error_placeholder(&status_message(&result))),
                    Err(error) => w.section.content = Some(error_placeholder(&error.to_string())),
                }
            }
        });
        join_all(fetches).await;
    }

    async fn extract_all(&self, work: &mut [Work]) {
        let tasks = work.iter_mut().filter(|w| w.section.html.is_some()).map(|w| {
            let extractor = self.extractor.clone();
            let observer = Arc::clone(&self.observer);
            async move {
                let html = w.section.html.clone().unwrap_or_default();
                let url = w.section.url.clone();
                let task_url = url.clone();
                let joined =
                    tokio::task::spawn_blocking(move || extractor.extract_detailed(&html, task_url.as_deref())).await;

                let extraction = joined.unwrap_or_else(|e| {
                    observer.extraction_failed(url.as_deref(), &Error::Extraction(e.to_string()));
                    Extraction {
                        article: Article::empty(),
                        preprocessed: String::new(),
                    }
                });

                w.section.title = extraction.article.title;
                w.section.content = Some(extraction.article.content);
                w.preprocessed = Some(extraction.preprocessed);
            }
        });
        join_all(tasks).await;
    }

    async fn localize_all(&self, work: &mut [Work], output_dir: &Path) {
        let tasks = work.iter_mut().filter(|w| w.preprocessed.is_some()).map(|w| async move {
            let content = w.section.content.take().unwrap_or_default();
            let localized = self
                .localizer
                .localize(&content, w.section.url.as_deref(), output_dir)
                .await;
            w.section.content = Some(localized.html);
            w.section.images = localized.images;
        });
        join_all(tasks).await;
    }

    fn validate_all(&self, work: Vec<Work>) -> Vec<ProcessedSection> {
        work.into_iter()
            .map(|w| {
                let valid = match (&w.preprocessed, self.options.validate_results) {
                    (Some(pre), true) => {
                        let post = w.section.content.as_deref().unwrap_or("");
                        let validator = ResultsValidator::new(w.section.url.as_deref(), pre, post)
                            .with_observer(Arc::clone(&self.observer));
                        Some(validator.validate())
                    }
                    _ => None,
                };
                ProcessedSection {
                    section: w.section,
                    valid,
                }
            })
            .collect()
    }
}

/// Content shown in place of a page that could not be downloaded.
fn error_placeholder(message: &str) -> String {
    format!("<p>Error: {}</p>", dom::escape_html(message))
}

fn status_message(result: &DownloadResult) -> String {
    match result.status_code {
        Some(status) => format!("HTTP {status} downloading {}", result.url),
        None => format!("no response downloading {}", result.url),
    }
}
