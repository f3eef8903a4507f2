//! Content extraction.
//!
//! A page goes through four fixed steps:
//!
//! 1. site rules for the page's host, if any
//! 2. the generic pre-extraction rules
//! 3. the readability collaborator
//! 4. the generic post-extraction rules, applied to the extracted fragment
//!
//! Extraction never fails from the caller's point of view. When the
//! readability step reports an error the observer is told and the result is
//! an [`Article`] with no title and empty content.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::dom::{self, Document};
use crate::error::{Error, Result};
use crate::observer::{default_observer, Observer};
use crate::result::Article;
use crate::rules::{generic_post_rules, generic_pre_rules, SiteRules};
use crate::transform::{run_operations, OperationSet};
#[cfg(feature = "readability")]
use crate::url_utils;

/// The readability collaborator: finds the main article in a page.
///
/// It receives the preprocessed tree itself, so the page is not
/// serialized and re-parsed between stages. Implementations must not
/// rely on mutating `doc`; clone it first if they need to.
///
/// Closures of the right shape implement it, which keeps tests and custom
/// extractors short.
pub trait Readability: Send + Sync {
    /// Extract the article title and main content fragment from `doc`,
    /// the page fetched from `url`.
    fn extract(&self, doc: &Document, url: Option<&str>) -> Result<Article>;
}

impl<F> Readability for F
where
    F: Fn(&Document, Option<&str>) -> Result<Article> + Send + Sync,
{
    fn extract(&self, doc: &Document, url: Option<&str>) -> Result<Article> {
        self(doc, url)
    }
}

/// Readability backed by `dom_smoothie`.
#[cfg(feature = "readability")]
#[derive(Debug, Clone, Copy, Default)]
pub struct DomSmoothie;

#[cfg(feature = "readability")]
impl Readability for DomSmoothie {
    fn extract(&self, doc: &Document, url: Option<&str>) -> Result<Article> {
        // Only absolute http(s) URLs are accepted as the document URL.
        let url = url.filter(|u| url_utils::parse_url(u).is_some());
        let mut reader = dom_smoothie::Readability::with_document(doc.clone(), url, None)
            .map_err(|e| Error::Extraction(e.to_string()))?;
        let article = reader.parse().map_err(|e| Error::Extraction(e.to_string()))?;

        let title = article.title.trim();
        Ok(Article {
            title: (!title.is_empty()).then(|| title.to_string()),
            content: article.content.to_string(),
        })
    }
}

/// Keeps the whole body as the article.
///
/// Used when the `readability` feature is off, and handy when the site and
/// generic rules already isolate the content.
#[derive(Debug, Clone, Copy, Default)]
pub struct WholeBody;

impl Readability for WholeBody {
    fn extract(&self, doc: &Document, _url: Option<&str>) -> Result<Article> {
        Ok(Article {
            title: document_title(doc),
            content: dom::body_html(doc),
        })
    }
}

/// The readability implementation used by [`Extractor::new`].
#[must_use]
pub fn default_readability() -> Arc<dyn Readability> {
    #[cfg(feature = "readability")]
    {
        Arc::new(DomSmoothie)
    }
    #[cfg(not(feature = "readability"))]
    {
        Arc::new(WholeBody)
    }
}

/// Text of the document's `<title>`, if non-empty.
#[must_use]
pub fn document_title(doc: &Document) -> Option<String> {
    let title = doc.select("head title").text();
    let title = title.trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// Extraction output together with the page as readability saw it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// The extracted article.
    pub article: Article,
    /// Body markup after the site and generic pre-rules ran.
    pub preprocessed: String,
}

/// Runs site rules, generic rules and readability over a page.
#[derive(Clone)]
pub struct Extractor {
    site_rules: SiteRules,
    pre_rules: OperationSet,
    post_rules: OperationSet,
    readability: Arc<dyn Readability>,
    observer: Arc<dyn Observer>,
}

impl fmt::Debug for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extractor")
            .field("site_rules", &self.site_rules.len())
            .field("pre_rules", &self.pre_rules.len())
            .field("post_rules", &self.post_rules.len())
            .finish_non_exhaustive()
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    /// Built-in rules with the default readability implementation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            site_rules: SiteRules::builtin(),
            pre_rules: generic_pre_rules().clone(),
            post_rules: generic_post_rules().clone(),
            readability: default_readability(),
            observer: default_observer(),
        }
    }

    /// Replace the site rule table.
    #[must_use]
    pub fn with_site_rules(mut self, site_rules: SiteRules) -> Self {
        self.site_rules = site_rules;
        self
    }

    /// Replace the generic pre-extraction rules.
    #[must_use]
    pub fn with_pre_rules(mut self, rules: OperationSet) -> Self {
        self.pre_rules = rules;
        self
    }

    /// Replace the generic post-extraction rules.
    #[must_use]
    pub fn with_post_rules(mut self, rules: OperationSet) -> Self {
        self.post_rules = rules;
        self
    }

    /// Use a different readability implementation.
    #[must_use]
    pub fn with_readability(mut self, readability: Arc<dyn Readability>) -> Self {
        self.readability = readability;
        self
    }

    /// Report failures to `observer`.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    /// Extract the article from `html`, fetched from `url`.
    #[must_use]
    pub fn extract(&self, html: &str, url: Option<&str>) -> Article {
        self.extract_detailed(html, url).article
    }

    /// Like [`extract`](Self::extract), also returning the preprocessed body
    /// for results validation.
    #[instrument(level = "debug", skip(self, html), fields(url = url.unwrap_or(""), bytes = html.len()))]
    pub fn extract_detailed(&self, html: &str, url: Option<&str>) -> Extraction {
        let doc = dom::parse(html);

        if let Some(site) = url.and_then(|u| self.site_rules.lookup(u)) {
            debug!(operations = site.len(), "applying site rules");
            site.apply(&doc);
        }
        self.pre_rules.apply(&doc);

        let preprocessed = dom::body_html(&doc);
        let fallback_title = document_title(&doc);

        let article = match self.readability.extract(&doc, url) {
            Ok(article) => Article {
                title: article
                    .title
                    .filter(|t| !t.trim().is_empty())
                    .or(fallback_title),
                content: run_operations(article.content.as_str(), &self.post_rules),
            },
            Err(error) => {
                self.observer.extraction_failed(url, &error);
                Article::empty()
            }
        };

        Extraction { article, preprocessed }
    }
}

/// Extract with the built-in rules and default readability.
///
/// ```rust
/// let html = "<html><head><title>T</title></head><body><p>Hi</p></body></html>";
/// let article = rs_ebook_clean::extract(html, None);
/// println!("{:?}: {}", article.title, article.content);
/// ```
#[must_use]
pub fn extract(html: &str, url: Option<&str>) -> Article {
    Extractor::new().extract(html, url)
}

/// Wrap a failure message from a custom readability implementation.
pub fn extraction_error(message: impl Into<String>) -> Error {
    Error::Extraction(message.into())
}
