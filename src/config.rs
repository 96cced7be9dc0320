// src/config.rs
// =============================================================================
// Crawler configuration.
//
// These are the knobs that live as long as a WebCrawler:
// - downloaders: worker count of the download pool
// - extractors: worker count of the link extraction pool
// - per_host: how many downloads may hit one host at the same time
//
// The crawl depth is not here: it is chosen per crawl() call.
// =============================================================================

use crate::error::CrawlError;

pub const DEFAULT_DOWNLOADERS: usize = 10;
pub const DEFAULT_EXTRACTORS: usize = 10;
pub const DEFAULT_PER_HOST: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlerConfig {
    pub downloaders: usize,
    pub extractors: usize,
    pub per_host: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            downloaders: DEFAULT_DOWNLOADERS,
            extractors: DEFAULT_EXTRACTORS,
            per_host: DEFAULT_PER_HOST,
        }
    }
}

impl CrawlerConfig {
    pub fn new(downloaders: usize, extractors: usize, per_host: usize) -> Self {
        Self {
            downloaders,
            extractors,
            per_host,
        }
    }

    // Every value has to be at least 1: a pool with no workers would never
    // run anything, and a per-host limit of 0 would block every download
    pub fn validate(&self) -> Result<(), CrawlError> {
        for (name, value) in [
            ("downloaders", self.downloaders),
            ("extractors", self.extractors),
            ("per_host", self.per_host),
        ] {
            if value == 0 {
                return Err(CrawlError::InvalidPoolSize { name, value });
            }
        }
        Ok(())
    }
}
