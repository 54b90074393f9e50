//! HTML parser for fetched pages
//!
//! This module turns a fetched body into everything a worker needs:
//! - Outbound links (absolute URLs)
//! - The content fingerprint
//! - The page re-serialized for archival

use crate::crawler::fingerprint::fingerprint;
use scraper::{Html, Selector};
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// All links found on the page (absolute URLs), in document order
    pub links: Vec<String>,

    /// Content fingerprint used for near-duplicate detection
    pub fingerprint: String,

    /// The parsed document serialized back to markup
    pub rendered: String,
}

/// Parses HTML content
///
/// # Link Extraction Rules
///
/// Every `<a href="...">` is resolved against `base_url`. Excluded:
/// - `javascript:`, `mailto:`, `tel:` and `data:` links
/// - Fragment-only links (same page anchors)
/// - Anything that does not resolve to an http(s) URL
///
/// Links back to the page itself are kept; visited URLs are filtered when
/// they are dequeued, not here.
///
/// # Example
///
/// ```
/// use ripple_frontier::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><body><p>Hi there</p><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        links: extract_links(&document, base_url),
        fingerprint: fingerprint(&document),
        rendered: document.html(),
    }
}

/// Extracts all valid links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url.to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    #[test]
    fn test_extract_absolute_link() {
        let html = r#"<html><body><a href="https://other.com/page">Link</a></body></html>"#;
        let parsed = parse_html(html, &base_url());
        assert_eq!(parsed.links, vec!["https://other.com/page".to_string()]);
    }

    #[test]
    fn test_extract_relative_link() {
        let html = r#"<html><body><a href="/other">Link</a></body></html>"#;
        let parsed = parse_html(html, &base_url());
        assert_eq!(parsed.links, vec!["https://example.com/other".to_string()]);
    }

    #[test]
    fn test_extract_relative_path_link() {
        let html = r#"<html><body><a href="other">Link</a></body></html>"#;
        let parsed = parse_html(html, &base_url());
        assert_eq!(parsed.links, vec!["https://example.com/other".to_string()]);
    }

    #[test]
    fn test_self_link_is_kept() {
        let base = Url::parse("http://a.test/").unwrap();
        let html = r#"<a href="http://b.test/">b</a><a href="http://a.test/">home</a>"#;
        let parsed = parse_html(html, &base);
        assert_eq!(
            parsed.links,
            vec!["http://b.test/".to_string(), "http://a.test/".to_string()]
        );
    }

    #[test]
    fn test_skip_special_schemes() {
        let html = r#"<html><body>
            <a href="javascript:void(0)">js</a>
            <a href="mailto:test@example.com">mail</a>
            <a href="tel:+1234567890">tel</a>
            <a href="data:text/html,<h1>Test</h1>">data</a>
            <a href="ftp://example.com/file">ftp</a>
            </body></html>"#;
        let parsed = parse_html(html, &base_url());
        assert!(parsed.links.is_empty());
    }

    #[test]
    fn test_skip_fragment_only() {
        let html = r##"<html><body><a href="#section">Jump</a></body></html>"##;
        let parsed = parse_html(html, &base_url());
        assert!(parsed.links.is_empty());
    }

    #[test]
    fn test_duplicate_links_are_kept() {
        let html = r#"<a href="/x">1</a><a href="/x">2</a>"#;
        let parsed = parse_html(html, &base_url());
        assert_eq!(parsed.links.len(), 2);
    }

    #[test]
    fn test_fingerprint_and_rendering() {
        let html = r#"<html><body><p>abc</p><p>def</p></body></html>"#;
        let parsed = parse_html(html, &base_url());
        assert_eq!(parsed.fingerprint, "e");
        assert!(parsed.rendered.contains("<p>abc</p>"));
    }
}
