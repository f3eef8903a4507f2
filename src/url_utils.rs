//! URL Utility Functions
//!
//! Host extraction for site-rule lookup, image source resolution, and
//! file-extension inference from URL paths.

use url::Url;

use crate::patterns::IMAGE_EXTENSION;

/// Parse a string as an absolute http(s) URL with a host.
#[must_use]
pub fn parse_url(url_str: &str) -> Option<Url> {
    let url = Url::parse(url_str.trim()).ok()?;
    let web = matches!(url.scheme(), "http" | "https");
    (web && url.host_str().is_some()).then_some(url)
}

/// Hostname of an absolute URL, lowercased.
#[must_use]
pub fn host(url_str: &str) -> Option<String> {
    parse_url(url_str).and_then(|url| url.host_str().map(str::to_ascii_lowercase))
}

/// Resolve an image reference found on the page at `root` to an absolute URL.
///
/// - `//host/path` is promoted to `http://host/path`.
/// - A reference that already names a host is kept as-is.
/// - Anything else resolves against the directory of `root`'s path; a path
///   ending in `/` is already a directory.
///
/// Returns `None` when the reference cannot be resolved to an http(s) URL.
///
/// ```rust
/// use rs_ebook_clean::url_utils::absolutify;
///
/// let root = "http://test.fake/hello/stuff.html";
/// assert_eq!(absolutify(root, "image.png").as_deref(), Some("http://test.fake/hello/image.png"));
/// assert_eq!(absolutify(root, "../img.png").as_deref(), Some("http://test.fake/img.png"));
/// ```
#[must_use]
pub fn absolutify(root: &str, src: &str) -> Option<String> {
    let src = src.trim();
    if src.is_empty() {
        return None;
    }

    if let Some(rest) = src.strip_prefix("//") {
        return Some(format!("http://{rest}"));
    }

    if let Ok(url) = Url::parse(src) {
        if url.host_str().is_some() {
            return matches!(url.scheme(), "http" | "https").then(|| src.to_string());
        }
    }

    let base = parse_url(root)?;
    let resolved = base.join(src).ok()?;
    matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
}

/// Image extension (with leading dot, lowercased) at the end of the URL's path.
#[must_use]
pub fn image_extension(url_str: &str) -> Option<String> {
    let path = Url::parse(url_str)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url_str.split(['?', '#']).next().unwrap_or_default().to_string());

    IMAGE_EXTENSION
        .captures(&path)
        .and_then(|caps| caps.get(1))
        .map(|ext| format!(".{}", ext.as_str().to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = "http://test.fake/hello/stuff.html";

    #[test]
    fn test_absolutify_relative_to_page_directory() {
        assert_eq!(absolutify(ROOT, "image.png").as_deref(), Some("http://test.fake/hello/image.png"));
        assert_eq!(absolutify(ROOT, "../img.png").as_deref(), Some("http://test.fake/img.png"));
        assert_eq!(absolutify(ROOT, "/root.png").as_deref(), Some("http://test.fake/root.png"));
    }

    #[test]
    fn test_absolutify_protocol_relative_becomes_http() {
        assert_eq!(
            absolutify(ROOT, "//cdn.com/path/image.png").as_deref(),
            Some("http://cdn.com/path/image.png")
        );
        assert_eq!(
            absolutify("https://secure.fake/a/", "//cdn.com/x.png").as_deref(),
            Some("http://cdn.com/x.png")
        );
    }

    #[test]
    fn test_absolutify_keeps_absolute_urls() {
        assert_eq!(
            absolutify(ROOT, "https://other.fake/a.gif?x=1").as_deref(),
            Some("https://other.fake/a.gif?x=1")
        );
    }

    #[test]
    fn test_absolutify_directory_root() {
        assert_eq!(
            absolutify("http://test.fake/hello/", "image.png").as_deref(),
            Some("http://test.fake/hello/image.png")
        );
    }

    #[test]
    fn test_absolutify_unresolvable() {
        assert_eq!(absolutify("not a url", "image.png"), None);
        assert_eq!(absolutify(ROOT, ""), None);
        assert_eq!(absolutify(ROOT, "ftp://files.fake/a.png"), None);
    }

    #[test]
    fn test_host() {
        assert_eq!(host("https://EN.Wikipedia.org/wiki/X").as_deref(), Some("en.wikipedia.org"));
        assert_eq!(host("/relative/path"), None);
    }

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("http://a.fake/p/Photo.JPG?w=200").as_deref(), Some(".jpg"));
        assert_eq!(image_extension("http://a.fake/p/logo.svg").as_deref(), Some(".svg"));
        assert_eq!(image_extension("http://a.fake/p/page.html"), None);
    }
}
