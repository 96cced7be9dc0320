// src/fetch/html.rs
// =============================================================================
// This module extracts links from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// We also use the `url` crate to:
// - Parse and validate URLs
// - Resolve relative URLs to absolute URLs
//
// Rust concepts:
// - Result<T, E>: For operations that can fail
// - Iterators: For processing collections
// - HashSet: To drop links repeated on the same page
// =============================================================================

use super::Page;
use crate::error::ExtractError;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

// A page downloaded by HttpFetcher
//
// `url` is the URL we asked for (it is what the crawler tracks), while `base`
// is where we actually ended up after redirects. Relative links resolve
// against `base`, the same way a browser would.
#[derive(Debug, Clone)]
pub struct HtmlPage {
    url: String,
    base: Url,
    html: String,
}

impl HtmlPage {
    pub fn new(url: impl Into<String>, base: Url, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            base,
            html: html.into(),
        }
    }
}

impl Page for HtmlPage {
    fn url(&self) -> &str {
        &self.url
    }

    fn extract_links(&self) -> Result<Vec<String>, ExtractError> {
        extract_html_links(&self.html, &self.base)
            .map_err(|reason| ExtractError::new(&self.url, reason))
    }
}

// Extracts all crawlable links from HTML content
//
// Parameters:
//   html: the HTML content to parse (borrowed as &str)
//   base: the URL of the page (for resolving relative links)
//
// Returns: absolute http(s) URLs in document order, without duplicates
//
// Example:
//   html = "<a href='/docs'>Docs</a>"
//   base = "https://example.com"
//   result = ["https://example.com/docs"]
pub fn extract_html_links(html: &str, base: &Url) -> Result<Vec<String>, String> {
    let document = Html::parse_document(html);

    // The selector is a constant, but we still report a parse failure as an
    // extraction error instead of panicking inside a worker
    let selector =
        Selector::parse("a[href]").map_err(|e| format!("invalid link selector: {:?}", e))?;

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            if let Some(absolute_url) = resolve_link(base, href) {
                // insert() returns false if we already had this link
                if seen.insert(absolute_url.clone()) {
                    links.push(absolute_url);
                }
            }
        }
    }

    Ok(links)
}

// Resolves a possibly-relative href to an absolute, crawlable URL
//
// We skip:
// - #anchors (same page)
// - mailto:, tel:, javascript: links
// - anything that does not end up as http:// or https://
//
// The fragment is dropped so "/a#top" and "/a" count as the same page.
fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
    {
        return None;
    }

    // join() handles both absolute hrefs and relative ones
    let mut url = base.join(href).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.set_fragment(None);

    Some(url.to_string())
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is scraper and how does it work?
//    - scraper parses HTML into a tree structure (DOM)
//    - You can then query it using CSS selectors (like jQuery or querySelector)
//    - "a[href]" means "all <a> tags that have an href attribute"
//
// 2. Why is Html parsed inside extract_links and not stored?
//    - scraper::Html is not Send, so it cannot move between worker tasks
//    - We keep the raw String in the page and parse it on the extractor pool
//
// 3. What does the ? do after .ok()?
//    - .ok() turns Result into Option
//    - ? on an Option returns None early if the value is None
// -----------------------------------------------------------------------------
