// src/crawl/crawler.rs
// =============================================================================
// The crawl orchestrator.
//
// How it works:
// 1. The start URL is marked visited and handed to the download pool
// 2. A download task fetches its URL. If depth remains, it hands the page
//    to the extraction pool
// 3. An extraction task lists the page's links. Every link not seen before
//    becomes a new download task, one level deeper
// 4. crawl() waits until the PendingTracker says nothing is outstanding,
//    then builds the result from the visited set and the error map
//
// Depth counts fetch hops from the start page:
//   depth 1 = only the start page, no extraction at all
//   depth 2 = start page + every page it links to
//   depth 3 = ... + every page those link to
//
// Failures are per URL. A page that fails to download or to parse is
// recorded in the error map and simply contributes no new links; the rest
// of the crawl carries on.
//
// Rust concepts:
// - Arc<Crawl<F>>: per-crawl state shared by every task of that crawl
// - Generics: WebCrawler works with any Fetcher (HTTP in main, a fake in tests)
// - tokio::select!: wait for completion OR an interruption, whichever is first
// =============================================================================

use super::host::HostLimiter;
use super::pool::{PoolHandle, WorkerPool};
use super::state::{assemble_result, ErrorMap, VisitedSet};
use super::tracker::{PendingTracker, PendingUnit};
use super::CrawlResult;
use crate::config::CrawlerConfig;
use crate::error::{CrawlError, ExtractError, FetchError, FetchErrorKind};
use crate::fetch::{Fetcher, Page};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// A long-lived crawler with its own download and extraction pools.
///
/// Create it once, call [`crawl`](Self::crawl) as many times as needed, then
/// [`close`](Self::close) it. Each crawl has its own visited set and error
/// map; only the pools and the per-host limit are shared between calls.
pub struct WebCrawler<F: Fetcher> {
    fetcher: Arc<F>,
    downloaders: WorkerPool,
    extractors: WorkerPool,
    hosts: Arc<HostLimiter>,
}

impl<F: Fetcher> WebCrawler<F> {
    /// Validates `config` and starts both worker pools.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn new(fetcher: F, config: CrawlerConfig) -> Result<Self, CrawlError> {
        config.validate()?;

        tracing::debug!(
            downloaders = config.downloaders,
            extractors = config.extractors,
            per_host = config.per_host,
            "starting crawler"
        );

        Ok(Self {
            fetcher: Arc::new(fetcher),
            downloaders: WorkerPool::new("download", config.downloaders),
            extractors: WorkerPool::new("extract", config.extractors),
            hosts: Arc::new(HostLimiter::new(config.per_host)),
        })
    }

    /// Crawls from `start_url`, following links up to `max_depth` fetch hops.
    pub async fn crawl(&self, start_url: &str, max_depth: usize) -> Result<CrawlResult, CrawlError> {
        self.crawl_until(start_url, max_depth, std::future::pending())
            .await
    }

    /// Like [`crawl`](Self::crawl), but gives up with
    /// [`CrawlError::Interrupted`] as soon as `interrupt` resolves.
    ///
    /// Tasks already handed to the pools finish on their own; they just stop
    /// scheduling new work. Dropping the returned future has the same effect.
    pub async fn crawl_until<I>(
        &self,
        start_url: &str,
        max_depth: usize,
        interrupt: I,
    ) -> Result<CrawlResult, CrawlError>
    where
        I: Future<Output = ()>,
    {
        if max_depth < 1 {
            return Err(CrawlError::InvalidDepth(max_depth));
        }

        let started = Instant::now();
        let start_url = normalize_seed(start_url);
        let start_url = start_url.as_str();
        tracing::info!(url = start_url, max_depth, "starting crawl");

        let crawl = Arc::new(Crawl {
            fetcher: Arc::clone(&self.fetcher),
            downloaders: self.downloaders.handle(),
            extractors: self.extractors.handle(),
            hosts: Arc::clone(&self.hosts),
            visited: VisitedSet::new(),
            errors: ErrorMap::new(),
            tracker: PendingTracker::new(),
            cancelled: AtomicBool::new(false),
        });
        let _cancel_on_drop = CancelOnDrop(&crawl.cancelled);

        // Seed: the start URL is visited and its unit registered before we
        // start waiting, so the tracker cannot read zero too early
        crawl.visited.try_visit(start_url);
        let seed = crawl.tracker.register();
        crawl.schedule_download(start_url.to_string(), max_depth, seed)?;

        tokio::select! {
            _ = crawl.tracker.drained() => {}
            _ = interrupt => {
                tracing::warn!(
                    url = start_url,
                    pending = crawl.tracker.pending(),
                    "crawl interrupted"
                );
                return Err(CrawlError::Interrupted);
            }
        }

        let result = assemble_result(crawl.visited.snapshot(), crawl.errors.snapshot());
        tracing::info!(
            url = start_url,
            downloaded = result.downloaded.len(),
            errors = result.errors.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "crawl finished"
        );
        Ok(result)
    }

    /// Shuts both pools down, waiting for any queued work to drain.
    ///
    /// Takes `self` by value, so it cannot run while a crawl still borrows
    /// the crawler.
    pub async fn close(self) {
        tokio::join!(self.downloaders.close(), self.extractors.close());
        tracing::debug!("crawler closed");
    }
}

// State for one crawl() call
struct Crawl<F: Fetcher> {
    fetcher: Arc<F>,
    downloaders: PoolHandle,
    extractors: PoolHandle,
    hosts: Arc<HostLimiter>,
    visited: VisitedSet,
    errors: ErrorMap,
    tracker: Arc<PendingTracker>,
    // Set once the caller stops waiting; tasks then stop scheduling children
    cancelled: AtomicBool,
}

impl<F: Fetcher> Crawl<F> {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    // `unit` travels with the task; if the pool refuses the task, the task
    // is dropped and the unit retires with it
    fn schedule_download(
        self: &Arc<Self>,
        url: String,
        remaining: usize,
        unit: PendingUnit,
    ) -> Result<(), CrawlError> {
        let crawl = Arc::clone(self);
        self.downloaders
            .submit(async move { crawl.download(url, remaining, unit).await })
    }

    fn schedule_extract(
        self: &Arc<Self>,
        page: F::Page,
        remaining: usize,
        unit: PendingUnit,
    ) -> Result<(), CrawlError> {
        let crawl = Arc::clone(self);
        self.extractors
            .submit(async move { crawl.extract(page, remaining, unit).await })
    }

    async fn download(self: Arc<Self>, url: String, remaining: usize, unit: PendingUnit) {
        let fetched = {
            let _permit = self.hosts.acquire(&url).await;
            AssertUnwindSafe(self.fetcher.fetch(&url))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    Err(FetchError::new(
                        &url,
                        FetchErrorKind::Other("fetcher panicked".to_string()),
                    ))
                })
        };

        match fetched {
            Ok(page) => {
                tracing::debug!(url = %url, remaining, "downloaded");
                if remaining > 1 && !self.is_cancelled() {
                    // Register the extraction before this download retires
                    let child = self.tracker.register();
                    if let Err(e) = self.schedule_extract(page, remaining - 1, child) {
                        tracing::error!(url = %url, error = %e, "could not schedule extraction");
                    }
                }
            }
            Err(err) => {
                tracing::warn!(url = %url, error = %err, "download failed");
                self.errors.record(&url, err.into());
            }
        }

        drop(unit);
    }

    async fn extract(self: Arc<Self>, page: F::Page, remaining: usize, unit: PendingUnit) {
        let page_url = page.url().to_string();

        // Parsing is CPU work: run it on the blocking thread pool so it does
        // not stall the runtime threads the other pool workers need. This job
        // keeps its extractor slot until the parse is done.
        let links = tokio::task::spawn_blocking(move || page.extract_links())
            .await
            .unwrap_or_else(|_| Err(ExtractError::new(&page_url, "link extraction panicked")));

        match links {
            Ok(links) => {
                tracing::debug!(url = %page_url, links = links.len(), remaining, "extracted");
                for link in links {
                    if self.is_cancelled() {
                        break;
                    }
                    if self.visited.try_visit(&link) {
                        let child = self.tracker.register();
                        if let Err(e) = self.schedule_download(link, remaining, child) {
                            tracing::error!(error = %e, "could not schedule download");
                        }
                    }
                }
            }
            Err(err) => {
                tracing::warn!(url = %page_url, error = %err, "link extraction failed");
                self.errors.record(&page_url, err.into());
            }
        }

        // Every child above is registered; only now may this unit retire
        drop(unit);
    }
}

// The seed goes through the same normalization as extracted links, so
// "https://example.com" and a link back to "https://example.com/" are one URL.
// Unparseable seeds are kept as-is; the fetcher reports them.
fn normalize_seed(raw: &str) -> String {
    match Url::parse(raw.trim()) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => raw.to_string(),
    }
}

// Marks the crawl cancelled when crawl_until returns or its future is dropped
struct CancelOnDrop<'a>(&'a AtomicBool);

impl Drop for CancelOnDrop<'_> {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}
