// src/error.rs
// =============================================================================
// Error types for the crawler library.
//
// There are two families of errors:
// - Per-URL failures (FetchError, ExtractError). These never stop a crawl.
//   They are collected into CrawlResult::errors, keyed by URL.
// - Call failures (CrawlError). These are returned from WebCrawler::new or
//   WebCrawler::crawl and mean the call itself did not produce a result.
//
// Rust concepts:
// - thiserror: derives std::error::Error and Display from attributes
// - Enums with data: each variant carries the details of what went wrong
// =============================================================================

use serde::Serialize;
use thiserror::Error;

// Why a fetch failed
//
// The variants mirror the ways an HTTP request can go wrong, so the CLI can
// print something more useful than a raw reqwest message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FetchErrorKind {
    /// Request timed out
    #[error("request timed out")]
    Timeout,
    /// Redirect loop or too many hops
    #[error("too many redirects")]
    TooManyRedirects,
    /// Could not resolve hostname
    #[error("could not resolve hostname")]
    Dns,
    /// SSL/TLS certificate or handshake error
    #[error("TLS error")]
    Tls,
    /// Could not open a connection
    #[error("connection failed")]
    Connect,
    /// Server answered with a non-success status
    #[error("HTTP {0}")]
    Status(u16),
    /// Response body could not be read
    #[error("failed to read body: {0}")]
    Body(String),
    /// Anything else (including invalid URLs)
    #[error("{0}")]
    Other(String),
}

// A failure to download one URL
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("failed to fetch {url}: {kind}")]
pub struct FetchError {
    pub url: String,
    #[serde(flatten)]
    pub kind: FetchErrorKind,
}

impl FetchError {
    pub fn new(url: impl Into<String>, kind: FetchErrorKind) -> Self {
        Self { url: url.into(), kind }
    }
}

// A failure to extract links from an already downloaded page
//
// The url is always the page's own URL, not a link found inside it.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("failed to extract links from {url}: {reason}")]
pub struct ExtractError {
    pub url: String,
    pub reason: String,
}

impl ExtractError {
    pub fn new(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

// What ends up in CrawlResult::errors for a URL
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum CrawlFailure {
    #[error(transparent)]
    Fetch(FetchError),
    #[error(transparent)]
    Extract(ExtractError),
}

impl From<FetchError> for CrawlFailure {
    fn from(err: FetchError) -> Self {
        CrawlFailure::Fetch(err)
    }
}

impl From<ExtractError> for CrawlFailure {
    fn from(err: ExtractError) -> Self {
        CrawlFailure::Extract(err)
    }
}

// Errors returned by the crawler API itself
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Depth must be at least 1 (1 = only the start page)
    #[error("invalid depth {0}: depth must be at least 1")]
    InvalidDepth(usize),

    /// A pool or per-host limit was configured with zero workers
    #[error("invalid {name}: must be at least 1, got {value}")]
    InvalidPoolSize { name: &'static str, value: usize },

    /// The caller stopped waiting before the crawl finished
    #[error("crawl interrupted before completion")]
    Interrupted,

    /// A task could not be handed to a worker pool
    #[error("{0} pool is closed")]
    PoolClosed(&'static str),
}
