// src/crawl/pool.rs
// =============================================================================
// A fixed-size worker pool on top of tokio.
//
// How it works:
// 1. `size` worker tasks are spawned when the pool is created
// 2. Jobs (boxed futures) go into one shared FIFO queue
// 3. Each idle worker takes the next job and runs it to completion
// 4. close() stops accepting jobs, lets the queue drain, and joins the workers
//
// The crawler owns two of these: one for downloads and one for extraction.
// A job never waits on another job from its own pool, so a pool cannot
// deadlock itself no matter how small it is.
//
// Rust concepts:
// - mpsc channel: the job queue (many senders, one receiver)
// - Arc<Mutex<Receiver>>: lets several workers share the single receiver
// - JoinHandle: lets close() wait for every worker to exit
// =============================================================================

use crate::error::CrawlError;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

type Job = BoxFuture<'static, ()>;
type Receiver = mpsc::UnboundedReceiver<Job>;

pub struct WorkerPool {
    name: &'static str,
    sender: mpsc::UnboundedSender<Job>,
    workers: Vec<JoinHandle<()>>,
}

// A cheap, cloneable way to submit jobs to a pool
//
// Tasks hold handles to the *other* pool so a download can queue an
// extraction and vice versa.
#[derive(Clone)]
pub struct PoolHandle {
    name: &'static str,
    sender: mpsc::UnboundedSender<Job>,
}

impl WorkerPool {
    // Spawns `size` workers on the current tokio runtime.
    //
    // Panics if called outside a runtime (tokio::spawn does).
    pub fn new(name: &'static str, size: usize) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..size)
            .map(|id| {
                let receiver = Arc::clone(&receiver);
                tokio::spawn(worker_loop(name, id, receiver))
            })
            .collect();

        tracing::debug!(pool = name, size, "worker pool started");
        Self {
            name,
            sender,
            workers,
        }
    }

    pub fn handle(&self) -> PoolHandle {
        PoolHandle {
            name: self.name,
            sender: self.sender.clone(),
        }
    }

    // Stops accepting new jobs from this pool object and waits for the
    // workers to finish.
    //
    // Workers exit once every sender is gone and the queue is empty. Jobs that
    // are still queued or running keep their own handles alive, so this also
    // waits for them to drain.
    pub async fn close(self) {
        let WorkerPool {
            name,
            sender,
            workers,
        } = self;
        drop(sender);

        for worker in workers {
            if let Err(e) = worker.await {
                tracing::error!(pool = name, error = %e, "worker did not shut down cleanly");
            }
        }
        tracing::debug!(pool = name, "worker pool closed");
    }
}

impl PoolHandle {
    pub fn submit<F>(&self, job: F) -> Result<(), CrawlError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.sender
            .send(job.boxed())
            .map_err(|_| CrawlError::PoolClosed(self.name))
    }
}

async fn worker_loop(name: &'static str, id: usize, receiver: Arc<Mutex<Receiver>>) {
    loop {
        // Hold the lock only while waiting for the next job, not while
        // running it, so other workers can pick up work in parallel
        let job = {
            let mut receiver = receiver.lock().await;
            receiver.recv().await
        };

        let Some(job) = job else {
            break;
        };

        // A panicking job must not take the worker down with it
        if AssertUnwindSafe(job).catch_unwind().await.is_err() {
            tracing::error!(pool = name, worker = id, "job panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_runs_every_job_before_close_returns() {
        let pool = WorkerPool::new("test", 3);
        let handle = pool.handle();
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..50 {
            let done = Arc::clone(&done);
            handle
                .submit(async move {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    done.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
        }
        drop(handle);

        pool.close().await;
        assert_eq!(done.load(Ordering::SeqCst), 50);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_is_bounded_by_size() {
        let pool = WorkerPool::new("bounded", 2);
        let handle = pool.handle();
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        for _ in 0..20 {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            handle
                .submit(async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                })
                .unwrap();
        }
        drop(handle);

        pool.close().await;
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_worker_survives_panicking_job() {
        let pool = WorkerPool::new("panics", 1);
        let handle = pool.handle();
        let done = Arc::new(AtomicUsize::new(0));

        handle.submit(async { panic!("boom") }).unwrap();
        let counter = Arc::clone(&done);
        handle
            .submit(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        drop(handle);

        pool.close().await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_submit_after_workers_exit_fails() {
        let pool = WorkerPool::new("closed", 1);
        let handle = pool.handle();
        // Abort the workers so the receiver is dropped
        for worker in &pool.workers {
            worker.abort();
        }
        for worker in pool.workers {
            let _ = worker.await;
        }

        let err = handle.submit(async {}).unwrap_err();
        assert!(matches!(err, CrawlError::PoolClosed("closed")));
    }
}
