// src/crawl/result.rs
// =============================================================================
// The outcome of one crawl.
//
// - downloaded: URLs that were fetched (and, where depth allowed, had their
//   links extracted) without any failure
// - errors: URL -> the failure recorded for it
//
// A URL appears in at most one of the two. BTree collections keep the output
// sorted, which makes the CLI table and JSON stable between runs.
// =============================================================================

use crate::error::CrawlFailure;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlResult {
    pub downloaded: BTreeSet<String>,
    pub errors: BTreeMap<String, CrawlFailure>,
}

impl CrawlResult {
    /// Every URL the crawl scheduled, successful or not
    pub fn total(&self) -> usize {
        self.downloaded.len() + self.errors.len()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, FetchErrorKind};

    #[test]
    fn test_counts() {
        let mut result = CrawlResult::default();
        assert!(result.is_clean());

        result.downloaded.insert("https://example.com/".to_string());
        result.errors.insert(
            "https://example.com/missing".to_string(),
            FetchError::new("https://example.com/missing", FetchErrorKind::Status(404)).into(),
        );

        assert_eq!(result.total(), 2);
        assert!(!result.is_clean());
    }
}
