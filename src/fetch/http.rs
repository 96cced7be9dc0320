// src/fetch/http.rs
// =============================================================================
// The real Fetcher: downloads pages over HTTP with reqwest.
//
// Key functionality:
// - GET requests with a timeout and a limited number of redirects
// - Non-2xx responses are failures (we only crawl pages that load)
// - Transport errors are sorted into FetchErrorKind (timeout, DNS, TLS, ...)
//
// Rust concepts:
// - async/await: network I/O without blocking a worker
// - Client is cheap to share: it pools connections internally
// =============================================================================

use super::{Fetcher, HtmlPage};
use crate::error::{FetchError, FetchErrorKind};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;
use std::time::Duration;

// Settings for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpFetcherConfig {
    /// Per-request timeout (connect + headers + body)
    pub timeout: Duration,
    /// How many redirects to follow before giving up
    pub max_redirects: usize,
    /// Value of the User-Agent header
    pub user_agent: String,
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_redirects: 5,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

// Fetcher backed by a shared reqwest Client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpFetcherConfig) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }

    async fn get(&self, url: &str) -> Result<HtmlPage, FetchError> {
        tracing::debug!(url, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::new(url, categorize_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(url, FetchErrorKind::Status(status.as_u16())));
        }

        // Keep the final URL: relative links resolve against it
        let base = response.url().clone();
        let html = response
            .text()
            .await
            .map_err(|e| FetchError::new(url, FetchErrorKind::Body(e.to_string())))?;

        Ok(HtmlPage::new(url, base, html))
    }
}

impl Fetcher for HttpFetcher {
    type Page = HtmlPage;

    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<HtmlPage, FetchError>> {
        self.get(url).boxed()
    }
}

// Categorizes different error types from reqwest
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure
// - SSL certificate issues
// - Too many redirects
// - An invalid URL (reported as a builder error)
fn categorize_error(error: &reqwest::Error) -> FetchErrorKind {
    // Lowercase once so the substring checks below are case-insensitive
    let error_string = format!("{:?}", error).to_lowercase();

    if error.is_timeout() {
        FetchErrorKind::Timeout
    } else if error.is_redirect() {
        FetchErrorKind::TooManyRedirects
    } else if error.is_connect() {
        // Connection errors often mean DNS issues or host unreachable
        if error_string.contains("dns") || error_string.contains("resolve") {
            FetchErrorKind::Dns
        } else if error_string.contains("certificate") || error_string.contains("tls") {
            FetchErrorKind::Tls
        } else {
            FetchErrorKind::Connect
        }
    } else if error_string.contains("certificate") || error_string.contains("ssl") {
        FetchErrorKind::Tls
    } else {
        FetchErrorKind::Other(error.to_string())
    }
}
