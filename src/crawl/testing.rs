// src/crawl/testing.rs
// =============================================================================
// An in-memory Fetcher for tests.
//
// GraphFetcher serves a made-up link graph instead of the network. Pages can
// be told to fail to download, fail (or panic) during link extraction, hang
// forever, take a while to load, or burn a while parsing. Every call is counted in FetchStats so
// tests can check what the crawler actually did.
// =============================================================================

use crate::error::{ExtractError, FetchError, FetchErrorKind};
use crate::fetch::{Fetcher, Page};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// Turns a short page name into a URL on the test host
pub fn url(name: &str) -> String {
    format!("https://site.test/{}", name)
}

#[derive(Debug, Default)]
pub struct FetchStats {
    per_url: Mutex<HashMap<String, usize>>,
    pub fetches_started: AtomicUsize,
    pub fetches_finished: AtomicUsize,
    pub extracts_started: AtomicUsize,
    pub extracts_finished: AtomicUsize,
    in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
    extracts_in_flight: AtomicUsize,
    pub peak_extracts: AtomicUsize,
}

impl FetchStats {
    pub fn fetch_count(&self, url: &str) -> usize {
        self.per_url.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn fetched_urls(&self) -> HashMap<String, usize> {
        self.per_url.lock().unwrap().clone()
    }

    pub fn load(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn begin_fetch(&self, url: &str) {
        *self.per_url.lock().unwrap().entry(url.to_string()).or_insert(0) += 1;
        self.fetches_started.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    fn end_fetch(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.fetches_finished.fetch_add(1, Ordering::SeqCst);
    }

    fn begin_extract(&self) {
        let now = self.extracts_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_extracts.fetch_max(now, Ordering::SeqCst);
    }

    fn end_extract(&self) {
        self.extracts_in_flight.fetch_sub(1, Ordering::SeqCst);
        self.extracts_finished.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
pub struct GraphFetcher {
    links: HashMap<String, Vec<String>>,
    fail_fetch: HashSet<String>,
    fail_extract: HashSet<String>,
    panic_extract: HashSet<String>,
    hang: HashSet<String>,
    slow_extract: HashMap<String, Duration>,
    latency: Duration,
    stats: Arc<FetchStats>,
}

impl GraphFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    // Adds edges `from -> each of to`, using short page names
    pub fn link(mut self, from: &str, to: &[&str]) -> Self {
        self.links
            .entry(url(from))
            .or_default()
            .extend(to.iter().map(|name| url(name)));
        self
    }

    // Straight chain: names[0] -> names[1] -> ...
    pub fn chain(mut self, names: &[&str]) -> Self {
        for pair in names.windows(2) {
            self = self.link(pair[0], &[pair[1]]);
        }
        self
    }

    pub fn fail_fetch(mut self, name: &str) -> Self {
        self.fail_fetch.insert(url(name));
        self
    }

    pub fn fail_extract(mut self, name: &str) -> Self {
        self.fail_extract.insert(url(name));
        self
    }

    pub fn panic_extract(mut self, name: &str) -> Self {
        self.panic_extract.insert(url(name));
        self
    }

    pub fn hang(mut self, name: &str) -> Self {
        self.hang.insert(url(name));
        self
    }

    // Parsing this page blocks its thread for `busy`, like a big document would
    pub fn slow_extract(mut self, name: &str, busy: Duration) -> Self {
        self.slow_extract.insert(url(name), busy);
        self
    }

    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn stats(&self) -> Arc<FetchStats> {
        Arc::clone(&self.stats)
    }

    async fn load(&self, url: &str) -> Result<GraphPage, FetchError> {
        self.stats.begin_fetch(url);

        if self.hang.contains(url) {
            std::future::pending::<()>().await;
        }
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let result = if self.fail_fetch.contains(url) {
            Err(FetchError::new(url, FetchErrorKind::Status(404)))
        } else {
            Ok(GraphPage {
                url: url.to_string(),
                links: self.links.get(url).cloned().unwrap_or_default(),
                fail: self.fail_extract.contains(url),
                panic: self.panic_extract.contains(url),
                busy: self.slow_extract.get(url).copied().unwrap_or_default(),
                stats: Arc::clone(&self.stats),
            })
        };

        self.stats.end_fetch();
        result
    }
}

impl Fetcher for GraphFetcher {
    type Page = GraphPage;

    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<GraphPage, FetchError>> {
        self.load(url).boxed()
    }
}

#[derive(Debug)]
pub struct GraphPage {
    url: String,
    links: Vec<String>,
    fail: bool,
    panic: bool,
    busy: Duration,
    stats: Arc<FetchStats>,
}

impl Page for GraphPage {
    fn url(&self) -> &str {
        &self.url
    }

    fn extract_links(&self) -> Result<Vec<String>, ExtractError> {
        self.stats.extracts_started.fetch_add(1, Ordering::SeqCst);
        if self.panic {
            panic!("extractor blew up on {}", self.url);
        }
        self.stats.begin_extract();
        if !self.busy.is_zero() {
            std::thread::sleep(self.busy);
        }
        let result = if self.fail {
            Err(ExtractError::new(&self.url, "malformed page"))
        } else {
            Ok(self.links.clone())
        };
        self.stats.end_extract();
        result
    }
}
