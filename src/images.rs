//! Image localization.
//!
//! Downloads the images a content fragment references and rewrites their
//! `src` attributes to point at the local copies, so the fragment can be
//! packaged without network access. Images that cannot be fetched, or
//! whose type an ebook reader may not render, are removed.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::debug;

use crate::dom::{self, Document, Selection};
use crate::download::{DownloadOptions, DownloadRequest, DownloadResult, Downloader};
use crate::options::Options;
use crate::patterns::EBOOK_IMAGE_TYPES;
use crate::transform::handlers;
use crate::url_utils;

/// A fragment with its images localized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Localized {
    /// The rewritten fragment.
    pub html: String,
    /// Local image paths, relative to the output directory, in document order.
    pub images: Vec<String>,
}

/// Original `src` → absolute URL.
pub type ImageMap = HashMap<String, String>;

/// Distinct `img` sources in document order, at most `max`.
#[must_use]
pub fn collect_image_sources(doc: &Document, max: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut sources = Vec::new();

    for node in doc.select("img[src]").nodes() {
        if sources.len() >= max {
            break;
        }
        let Some(src) = Selection::from(*node).attr("src") else {
            continue;
        };
        let src = src.trim().to_string();
        if !src.is_empty() && seen.insert(src.clone()) {
            sources.push(src);
        }
    }

    sources
}

/// Resolve each source against the page URL. Sources that do not resolve
/// to an http(s) URL are left out.
#[must_use]
pub fn resolve_sources(page_url: Option<&str>, sources: &[String]) -> ImageMap {
    let root = page_url.unwrap_or("");
    sources
        .iter()
        .filter_map(|src| url_utils::absolutify(root, src).map(|abs| (src.clone(), abs)))
        .collect()
}

/// Downloads and rewrites the images of a content fragment.
#[derive(Debug, Clone)]
pub struct ImageLocalizer {
    downloader: Downloader,
    max_images: usize,
    max_image_size: u64,
    max_total_image_size: u64,
    small_image_size: u64,
    image_dir: String,
}

impl ImageLocalizer {
    /// A localizer using `downloader` with the image limits from `options`.
    #[must_use]
    pub fn new(downloader: Downloader, options: &Options) -> Self {
        Self {
            downloader,
            max_images: options.max_images,
            max_image_size: options.max_image_size,
            max_total_image_size: options.max_total_image_size,
            small_image_size: options.small_image_size,
            image_dir: options.image_dir.trim_matches('/').to_string(),
        }
    }

    /// Localize the images of `html`, a fragment taken from `page_url`.
    ///
    /// Files are written to `<output_dir>/<image_dir>/`. Never fails: an
    /// image that cannot be localized is dropped from the fragment.
    pub async fn localize(&self, html: &str, page_url: Option<&str>, output_dir: &Path) -> Localized {
        let doc = dom::parse(html);

        remove_inline_images(&doc);
        doc.select("[srcset]").remove_attr("srcset");

        let sources = collect_image_sources(&doc, self.max_images);
        let image_map = resolve_sources(page_url, &sources);

        let mut urls: Vec<&String> = Vec::new();
        for src in &sources {
            if let Some(abs) = image_map.get(src) {
                if !urls.contains(&abs) {
                    urls.push(abs);
                }
            }
        }

        let target_dir = output_dir.join(&self.image_dir);
        let requests = urls
            .iter()
            .map(|url| DownloadRequest::new(url.as_str(), DownloadOptions::to_dir(&target_dir, self.max_image_size)))
            .collect();
        let results = self
            .downloader
            .all_with_budget(requests, self.max_total_image_size)
            .await;

        let usable: HashMap<&str, &DownloadResult> = results
            .iter()
            .filter(|r| is_usable(r))
            .map(|r| (r.url.as_str(), r))
            .collect();

        debug!(
            found = sources.len(),
            downloaded = usable.len(),
            page = page_url.unwrap_or(""),
            "localizing images"
        );

        let mut images = Vec::new();
        for node in doc.select("img").nodes().iter().rev() {
            let img = Selection::from(*node);
            let found = img
                .attr("src")
                .and_then(|src| image_map.get(src.trim()))
                .and_then(|abs| usable.get(abs.as_str()));

            match found.and_then(|result| result.file_name().map(|name| (result, name))) {
                Some((result, name)) => {
                    let local = format!("{}/{}", self.image_dir, name);
                    img.set_attr("src", &local);
                    if result.content_length.unwrap_or(0) < self.small_image_size && handlers::is_stretched(&img) {
                        handlers::unstretch(&img);
                    }
                    images.push(local);
                }
                None => img.remove(),
            }
        }

        images.reverse();
        let mut seen = HashSet::new();
        images.retain(|path| seen.insert(path.clone()));

        Localized {
            html: dom::body_html(&doc),
            images,
        }
    }
}

/// Drop images embedded as `data:` URIs.
fn remove_inline_images(doc: &Document) {
    for node in doc.select("img[src]").nodes().iter().rev() {
        let img = Selection::from(*node);
        let inline = img
            .attr("src")
            .is_some_and(|src| src.trim_start().to_ascii_lowercase().starts_with("data:"));
        if inline {
            img.remove();
        }
    }
}

fn is_usable(result: &DownloadResult) -> bool {
    result.success
        && result.error.is_none()
        && result.path.is_some()
        && result
            .file_type
            .as_deref()
            .is_some_and(|ext| EBOOK_IMAGE_TYPES.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_dedupes_and_caps() {
        let html: String = (0..40)
            .map(|i| format!(r#"<img src="/img/{i}.png"><img src="/img/{i}.png">"#))
            .collect();
        let doc = dom::parse(&html);
        let sources = collect_image_sources(&doc, 30);
        assert_eq!(sources.len(), 30);
        assert_eq!(sources[0], "/img/0.png");
        assert_eq!(sources[29], "/img/29.png");
    }

    #[test]
    fn test_resolve_sources_against_page() {
        let sources = vec!["a.png".to_string(), "//cdn.fake/b.png".to_string()];
        let map = resolve_sources(Some("http://test.fake/hello/stuff.html"), &sources);
        assert_eq!(map["a.png"], "http://test.fake/hello/a.png");
        assert_eq!(map["//cdn.fake/b.png"], "http://cdn.fake/b.png");
    }

    #[test]
    fn test_resolve_without_page_keeps_only_absolute() {
        let sources = vec!["a.png".to_string(), "https://cdn.fake/b.png".to_string()];
        let map = resolve_sources(None, &sources);
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("https://cdn.fake/b.png"));
    }

    #[test]
    fn test_remove_inline_images() {
        let doc = dom::parse(r#"<p><img src="data:image/png;base64,AAAA"><img src="x.png"></p>"#);
        remove_inline_images(&doc);
        assert_eq!(dom::body_html(&doc), r#"<p><img src="x.png"></p>"#);
    }

    #[test]
    fn test_usable_requires_ebook_type() {
        let mut result = DownloadResult {
            url: "http://a.fake/x.webp".to_string(),
            success: true,
            file_type: Some(".webp".to_string()),
            path: Some("images/x.webp".into()),
            ..DownloadResult::default()
        };
        assert!(!is_usable(&result));
        result.file_type = Some(".png".to_string());
        assert!(is_usable(&result));
        result.success = false;
        assert!(!is_usable(&result));
    }
}
