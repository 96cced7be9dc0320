// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Usage:
//   web-crawler <url> [depth [downloaders [extractors [per_host]]]] [--json]
//
// Everything after the URL is optional and positional, so
//   web-crawler https://example.com 3
// crawls three levels deep with the default pool sizes.
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Derive macros: Automatically generate code for our types
// =============================================================================

use clap::Parser;
use std::time::Duration;
use web_crawler::config::{DEFAULT_DOWNLOADERS, DEFAULT_EXTRACTORS, DEFAULT_PER_HOST};
use web_crawler::{CrawlerConfig, HttpFetcherConfig};

// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "web-crawler",
    version,
    about = "Crawl a website breadth-first and report which pages could be downloaded",
    long_about = "web-crawler downloads a page, follows its links up to the given depth, \
                  and reports every page it downloaded plus every page that failed. \
                  Downloads and link extraction run on separate worker pools."
)]
pub struct Cli {
    /// URL to start crawling from (e.g., https://example.com)
    pub url: String,

    /// Maximum crawl depth
    ///
    /// Depth 1 = just the starting page
    /// Depth 2 = starting page + all pages it links to
    /// etc.
    #[arg(default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..))]
    pub depth: u32,

    /// Number of download workers
    #[arg(default_value_t = DEFAULT_DOWNLOADERS, value_parser = parse_positive)]
    pub downloaders: usize,

    /// Number of link extraction workers
    #[arg(default_value_t = DEFAULT_EXTRACTORS, value_parser = parse_positive)]
    pub extractors: usize,

    /// Maximum concurrent downloads per host
    #[arg(default_value_t = DEFAULT_PER_HOST, value_parser = parse_positive)]
    pub per_host: usize,

    /// Output results in JSON format instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,
}

impl Cli {
    pub fn crawler_config(&self) -> CrawlerConfig {
        CrawlerConfig::new(self.downloaders, self.extractors, self.per_host)
    }

    pub fn fetcher_config(&self) -> HttpFetcherConfig {
        HttpFetcherConfig {
            timeout: Duration::from_secs(self.timeout),
            ..HttpFetcherConfig::default()
        }
    }
}

// Pool sizes have to be at least 1; reject 0 here so the user gets a usage
// message instead of an error from deep inside the crawler
fn parse_positive(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["web-crawler", "https://example.com"]).unwrap();
        assert_eq!(cli.depth, 2);
        assert_eq!(cli.crawler_config(), CrawlerConfig::default());
        assert!(!cli.json);
    }

    #[test]
    fn test_all_positionals() {
        let cli =
            Cli::try_parse_from(["web-crawler", "https://example.com", "3", "4", "5", "6", "--json"])
                .unwrap();
        assert_eq!(cli.depth, 3);
        assert_eq!(cli.crawler_config(), CrawlerConfig::new(4, 5, 6));
        assert!(cli.json);
    }

    #[test]
    fn test_zero_is_a_usage_error() {
        assert!(Cli::try_parse_from(["web-crawler", "https://example.com", "0"]).is_err());
        assert!(Cli::try_parse_from(["web-crawler", "https://example.com", "2", "0"]).is_err());
    }

    #[test]
    fn test_missing_url_is_a_usage_error() {
        assert!(Cli::try_parse_from(["web-crawler"]).is_err());
    }
}
