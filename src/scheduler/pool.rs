//! Worker pool
//!
//! A fixed number of concurrent executors pull from the shared queue
//! and run each job to completion through its kind's wrapper before
//! pulling the next. Workers share no mutable state with each other;
//! the queue, the result channel, and the in-flight counter are the
//! only shared structures.
//!
//! There is no backpressure: fan-out is unbounded and the depth gate in
//! the wrapper is the only brake. Cancellation is cooperative — after
//! the signal fires, in-flight jobs finish naturally but no further
//! dequeues happen.

use crate::scheduler::job::JobKind;
use crate::scheduler::monitor::InFlight;
use crate::scheduler::queue::JobQueue;
use crate::scheduler::registry::WorkRegistry;
use crate::scheduler::wrapper::{JobDisposition, JobWrapper, RetryPolicy};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Fixed-size pool of job executors
pub struct WorkerPool {
    size: usize,
    queue: Arc<JobQueue>,
    wrappers: Arc<HashMap<JobKind, JobWrapper>>,
    in_flight: InFlight,
    cancel: watch::Receiver<bool>,
}

impl WorkerPool {
    /// Builds a pool of `size` executors over a validated registry
    ///
    /// One wrapper per kind is constructed up front; workers share them
    /// read-only.
    pub fn new(
        size: usize,
        queue: Arc<JobQueue>,
        registry: &WorkRegistry,
        retry: RetryPolicy,
        depth_limit: u32,
        in_flight: InFlight,
        cancel: watch::Receiver<bool>,
    ) -> Self {
        let mut wrappers = HashMap::new();
        for kind in JobKind::ALL {
            if let Some(work_fn) = registry.get(*kind) {
                wrappers.insert(*kind, JobWrapper::new(work_fn, retry.clone(), depth_limit));
            }
        }

        Self {
            size,
            queue,
            wrappers: Arc::new(wrappers),
            in_flight,
            cancel,
        }
    }

    /// Launches the executors and returns their join handles
    pub fn start(&self) -> Vec<JoinHandle<()>> {
        (0..self.size)
            .map(|worker_id| {
                let queue = self.queue.clone();
                let wrappers = self.wrappers.clone();
                let in_flight = self.in_flight.clone();
                let cancel = self.cancel.clone();
                tokio::spawn(worker_loop(worker_id, queue, wrappers, in_flight, cancel))
            })
            .collect()
    }
}

/// One executor: dequeue-or-wait, dispatch, repeat until cancelled
async fn worker_loop(
    worker_id: usize,
    queue: Arc<JobQueue>,
    wrappers: Arc<HashMap<JobKind, JobWrapper>>,
    in_flight: InFlight,
    mut cancel: watch::Receiver<bool>,
) {
    loop {
        if *cancel.borrow() {
            break;
        }

        // The in-flight mark must cover the dequeue itself, otherwise
        // the monitor could observe "queue empty, nothing running" in
        // the gap between removal and execution.
        let guard = in_flight.begin();
        match queue.try_dequeue() {
            Some(job) => {
                let kind = job.kind;
                match wrappers.get(&kind) {
                    Some(wrapper) => match wrapper.run(job).await {
                        JobDisposition::Completed | JobDisposition::Discarded => {}
                        JobDisposition::Failed(e) => {
                            tracing::error!("worker {}: {} job failed: {}", worker_id, kind, e);
                        }
                    },
                    None => {
                        // Registry validation runs before the pool starts,
                        // so this only fires if a job of an unregistered
                        // kind was submitted mid-run.
                        tracing::error!("worker {}: no handler for {} job", worker_id, kind);
                    }
                }
                drop(guard);
            }
            None => {
                drop(guard);
                tokio::select! {
                    _ = queue.wait_nonempty() => {}
                    _ = cancel.changed() => break,
                }
            }
        }
    }

    tracing::debug!("worker {} exiting", worker_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::job::Job;
    use crate::scheduler::registry::WorkFn;
    use crate::scheduler::wrapper::WorkStatus;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn counting_registry(calls: Arc<AtomicU32>) -> WorkRegistry {
        let mut registry = WorkRegistry::new();
        for kind in JobKind::ALL {
            let calls = calls.clone();
            let handler: WorkFn = Arc::new(move |_payload| {
                let calls = calls.clone();
                Box::pin(async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(WorkStatus::Completed)
                })
            });
            registry.register(*kind, handler);
        }
        registry
    }

    #[tokio::test]
    async fn test_pool_drains_queue_and_stops_on_cancel() {
        let queue = Arc::new(JobQueue::new());
        for i in 0..8 {
            queue.enqueue(Job::crawl_repo(format!("github.com/acme/app{}", i), None, 0));
        }

        let calls = Arc::new(AtomicU32::new(0));
        let registry = counting_registry(calls.clone());
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let in_flight = InFlight::new();

        let pool = WorkerPool::new(
            3,
            queue.clone(),
            &registry,
            RetryPolicy::default(),
            5,
            in_flight.clone(),
            cancel_rx,
        );
        let workers = pool.start();

        // Wait for the queue to drain, then cancel.
        for _ in 0..200 {
            if queue.is_empty() && in_flight.count() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        cancel_tx.send(true).unwrap();

        for worker in workers {
            tokio::time::timeout(Duration::from_secs(1), worker)
                .await
                .expect("worker must exit after cancellation")
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 8);
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_stops_idle_workers() {
        let queue = Arc::new(JobQueue::new());
        let registry = counting_registry(Arc::new(AtomicU32::new(0)));
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let pool = WorkerPool::new(
            2,
            queue,
            &registry,
            RetryPolicy::default(),
            5,
            InFlight::new(),
            cancel_rx,
        );
        let workers = pool.start();

        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel_tx.send(true).unwrap();

        for worker in workers {
            tokio::time::timeout(Duration::from_secs(1), worker)
                .await
                .expect("idle worker must exit after cancellation")
                .unwrap();
        }
    }
}
