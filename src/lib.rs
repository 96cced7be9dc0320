// src/lib.rs
// =============================================================================
// web-crawler: a depth-limited web crawler with separate worker pools for
// downloading pages and for extracting their links.
//
// Modules:
// - crawl: the crawler itself (WebCrawler and its building blocks)
// - fetch: the Fetcher/Page traits plus the HTTP + HTML implementations
// - config: pool sizes and the per-host limit
// - error: error types
//
// Quick example:
//
//     use web_crawler::{CrawlerConfig, HttpFetcher, HttpFetcherConfig, WebCrawler};
//
//     let fetcher = HttpFetcher::new(&HttpFetcherConfig::default())?;
//     let crawler = WebCrawler::new(fetcher, CrawlerConfig::default())?;
//     let result = crawler.crawl("https://example.com", 2).await?;
//     println!("{} pages downloaded", result.downloaded.len());
//     crawler.close().await;
// =============================================================================

pub mod config;
pub mod crawl;
pub mod error;
pub mod fetch;

pub use config::CrawlerConfig;
pub use crawl::{CrawlResult, WebCrawler};
pub use error::{CrawlError, CrawlFailure, ExtractError, FetchError, FetchErrorKind};
pub use fetch::{Fetcher, HtmlPage, HttpFetcher, HttpFetcherConfig, Page};
