// src/crawl/state.rs
// =============================================================================
// Shared bookkeeping for a single crawl:
// - VisitedSet: every URL that has been scheduled for download
// - ErrorMap: the first failure recorded for each URL
//
// Both are shared by every worker task of one crawl, so all access goes
// through a Mutex. Locks are held for a single insert or lookup and never
// across network or parsing work.
// =============================================================================

use super::CrawlResult;
use crate::error::CrawlFailure;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

// A poisoned lock only means some task panicked while holding it. Every
// critical section here is a single insert, so the data is still consistent.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// The set of URLs already scheduled
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    // Records `url` and returns true the first time it is seen.
    // Returns false (and changes nothing) on every later call.
    pub fn try_visit(&self, url: &str) -> bool {
        let mut urls = lock(&self.urls);
        if urls.contains(url) {
            return false;
        }
        urls.insert(url.to_string())
    }

    // A copy of the current contents. Worker tasks may still hold a
    // reference to the set for a moment after their last unit retires, so
    // the result is built from a copy instead of unwrapping the Arc
    pub fn snapshot(&self) -> HashSet<String> {
        lock(&self.urls).clone()
    }
}

// URL -> first failure
#[derive(Debug, Default)]
pub struct ErrorMap {
    errors: Mutex<HashMap<String, CrawlFailure>>,
}

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    // Stores the failure unless the URL already has one.
    // Returns true if this call stored it.
    pub fn record(&self, url: &str, failure: CrawlFailure) -> bool {
        match lock(&self.errors).entry(url.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(failure);
                true
            }
        }
    }

    pub fn snapshot(&self) -> HashMap<String, CrawlFailure> {
        lock(&self.errors).clone()
    }
}

// Splits the final visited set into successes and failures:
// downloaded = visited - keys(errors)
pub fn assemble_result(
    visited: HashSet<String>,
    errors: HashMap<String, CrawlFailure>,
) -> CrawlResult {
    let downloaded: BTreeSet<String> = visited
        .into_iter()
        .filter(|url| !errors.contains_key(url))
        .collect();
    let errors: BTreeMap<String, CrawlFailure> = errors.into_iter().collect();
    CrawlResult { downloaded, errors }
}
