// src/crawl/host.rs
// =============================================================================
// Per-host concurrency limit for downloads.
//
// Each host gets its own semaphore with `per_host` permits. A download task
// takes a permit for its URL's host before fetching and releases it when the
// fetch finishes, so at most `per_host` requests hit one host at a time even
// when many downloader workers are free.
//
// The table of semaphores lives as long as the crawler, so the limit also
// holds across concurrent crawl() calls. A host's entry is removed as soon as
// nobody holds or waits for one of its permits, so the table only holds
// hosts that are being downloaded from right now.
// =============================================================================

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use url::Url;

#[derive(Debug)]
pub struct HostLimiter {
    per_host: usize,
    hosts: Mutex<HashMap<String, HostSlot>>,
}

// `users` counts the permits held plus the tasks still waiting for one
#[derive(Debug)]
struct HostSlot {
    semaphore: Arc<Semaphore>,
    users: usize,
}

impl HostLimiter {
    pub fn new(per_host: usize) -> Self {
        Self {
            per_host,
            hosts: Mutex::new(HashMap::new()),
        }
    }

    // Waits for a permit for the host of `url`.
    //
    // URLs without a host (or that do not parse) are not limited and get
    // None; the fetcher reports those as errors on its own.
    pub async fn acquire(&self, url: &str) -> Option<HostPermit<'_>> {
        let host = host_key(url)?;
        let semaphore = self.join(&host);

        // Build the guard before waiting: if this future is dropped while
        // queued, the guard still leaves the host
        let mut permit = HostPermit {
            limiter: self,
            host,
            permit: None,
        };
        // The semaphores are never closed, so acquire_owned only fails if
        // that changes; treat it as "not limited"
        permit.permit = semaphore.acquire_owned().await.ok();
        Some(permit)
    }

    fn lock_hosts(&self) -> MutexGuard<'_, HashMap<String, HostSlot>> {
        self.hosts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn join(&self, host: &str) -> Arc<Semaphore> {
        let mut hosts = self.lock_hosts();
        let slot = hosts.entry(host.to_string()).or_insert_with(|| HostSlot {
            semaphore: Arc::new(Semaphore::new(self.per_host)),
            users: 0,
        });
        slot.users += 1;
        Arc::clone(&slot.semaphore)
    }

    fn leave(&self, host: &str) {
        let mut hosts = self.lock_hosts();
        if let Some(slot) = hosts.get_mut(host) {
            slot.users -= 1;
            if slot.users == 0 {
                hosts.remove(host);
            }
        }
    }

    #[cfg(test)]
    fn tracked_hosts(&self) -> usize {
        self.lock_hosts().len()
    }
}

// Held by a download task while it fetches
#[derive(Debug)]
pub struct HostPermit<'a> {
    limiter: &'a HostLimiter,
    host: String,
    permit: Option<OwnedSemaphorePermit>,
}

impl Drop for HostPermit<'_> {
    fn drop(&mut self) {
        // Hand the permit back before leaving so a waiter can take it
        drop(self.permit.take());
        self.limiter.leave(&self.host);
    }
}

// "host:port" so http://a:80 and http://a:8080 are limited separately
fn host_key(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    match url.port_or_known_default() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}
