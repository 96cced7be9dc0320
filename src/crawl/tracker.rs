// src/crawl/tracker.rs
// =============================================================================
// Completion detection for a crawl.
//
// Every download and every extraction is one "pending unit". The tracker
// counts units that are still outstanding; the crawl is finished when the
// count drops back to zero.
//
// Units are RAII guards (PendingUnit): registering returns a guard, dropping
// the guard retires the unit. A task that spawns children creates the
// children's guards while it still holds its own, so the count can never
// touch zero while a child is about to be scheduled. This holds even if the
// task panics, because unwinding drops the guard too.
//
// Rust concepts:
// - Drop: code that runs automatically when a value goes out of scope
// - Atomics: lock-free counters shared between threads
// - tokio::sync::Notify: wake a waiting task without polling
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
pub struct PendingTracker {
    pending: AtomicUsize,
    drained: Notify,
}

impl PendingTracker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    // Adds one unit of outstanding work. The unit retires when the returned
    // guard is dropped.
    pub fn register(self: &Arc<Self>) -> PendingUnit {
        self.pending.fetch_add(1, Ordering::SeqCst);
        PendingUnit {
            tracker: Arc::clone(self),
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    // Resolves once no units are outstanding.
    //
    // Returns immediately if nothing was ever registered, so callers must
    // register the first unit before waiting.
    pub async fn drained(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            // Enable before checking the count so a notify_waiters() that
            // races with the check is not lost
            notified.as_mut().enable();

            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }

    fn retire(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.drained.notify_waiters();
        }
    }
}

// One outstanding unit of work
#[derive(Debug)]
#[must_use = "dropping a PendingUnit retires it immediately"]
pub struct PendingUnit {
    tracker: Arc<PendingTracker>,
}

impl Drop for PendingUnit {
    fn drop(&mut self) {
        self.tracker.retire();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_drained_when_nothing_registered() {
        let tracker = PendingTracker::new();
        tracker.drained().await;
        assert_eq!(tracker.pending(), 0);
    }

    #[tokio::test]
    async fn test_guard_drop_retires() {
        let tracker = PendingTracker::new();
        let a = tracker.register();
        let b = tracker.register();
        assert_eq!(tracker.pending(), 2);
        drop(a);
        assert_eq!(tracker.pending(), 1);
        drop(b);
        assert_eq!(tracker.pending(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_waiter_wakes_after_last_unit() {
        let tracker = PendingTracker::new();
        let unit = tracker.register();

        let waiter = {
            let tracker = Arc::clone(&tracker);
            tokio::spawn(async move { tracker.drained().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(unit);
        tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .expect("waiter should wake up")
            .unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_child_registered_before_parent_retires() {
        let tracker = PendingTracker::new();
        let root = tracker.register();

        // Each "task" registers its child before dropping itself, so the
        // count stays above zero until the whole chain is done
        let tracker_for_chain = Arc::clone(&tracker);
        tokio::spawn(async move {
            let mut parent = root;
            for _ in 0..100 {
                let child = tracker_for_chain.register();
                tokio::task::yield_now().await;
                drop(parent);
                assert!(tracker_for_chain.pending() >= 1);
                parent = child;
            }
            drop(parent);
        });

        tokio::time::timeout(Duration::from_secs(5), tracker.drained())
            .await
            .expect("chain should drain");
        assert_eq!(tracker.pending(), 0);
    }

    #[test]
    fn test_panic_still_retires() {
        let tracker = PendingTracker::new();
        let unit = tracker.register();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _unit = unit;
            panic!("task failed");
        }));
        assert!(result.is_err());
        assert_eq!(tracker.pending(), 0);
    }
}
