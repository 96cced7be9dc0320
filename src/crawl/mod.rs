// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Breadth-first crawling starting from a URL, limited by depth
// - Two worker pools: one downloads pages, the other extracts their links
// - Every URL is downloaded at most once, even when many pages link to it
// - Failures are recorded per URL and never stop the rest of the crawl
// - A per-host limit on concurrent downloads
//
// Submodules:
// - crawler: WebCrawler, the orchestrator
// - pool: fixed-size worker pools
// - tracker: knows when all outstanding work is done
// - state: the visited set and the error map
// - host: the per-host download limit
// - result: CrawlResult
// =============================================================================

mod crawler;
mod host;
mod pool;
mod result;
mod state;
mod tracker;

#[cfg(test)]
pub(crate) mod testing;

// Re-export the public API
pub use crawler::WebCrawler;
pub use result::CrawlResult;
