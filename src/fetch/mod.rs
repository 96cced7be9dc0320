// src/fetch/mod.rs
// =============================================================================
// This module defines what the crawler needs from the outside world:
// - Fetcher: turns a URL into a downloaded page (or a FetchError)
// - Page: a downloaded page that knows how to list its outbound links
//
// The crawler only talks to these traits, so tests can plug in an in-memory
// link graph and the binary plugs in the real HTTP implementation.
//
// Submodules:
// - http: HttpFetcher, the reqwest-based Fetcher
// - html: HtmlPage and the scraper-based link extraction
//
// Rust concepts:
// - Traits with associated types: each Fetcher decides its own Page type
// - BoxFuture: an owned, type-erased future so the trait stays object-friendly
// =============================================================================

mod html;
mod http;

pub use html::{extract_html_links, HtmlPage};
pub use http::{HttpFetcher, HttpFetcherConfig};

use crate::error::{ExtractError, FetchError};
use futures::future::BoxFuture;

// A downloaded page
//
// extract_links is synchronous on purpose: it is CPU work and runs on the
// extractor pool, never on the downloader pool.
pub trait Page: Send + 'static {
    /// The URL this page was requested with
    fn url(&self) -> &str;

    /// Every outbound link on the page, as absolute URLs
    fn extract_links(&self) -> Result<Vec<String>, ExtractError>;
}

// Something that can download a URL
//
// Implementations must be shareable across worker tasks (Send + Sync) because
// every downloader worker calls fetch on the same instance.
pub trait Fetcher: Send + Sync + 'static {
    type Page: Page;

    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Self::Page, FetchError>>;
}
