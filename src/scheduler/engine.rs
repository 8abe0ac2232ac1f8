//! Crawl engine: seeding, execution, and shutdown
//!
//! The engine ties the queue, worker pool, result collector, and
//! quiescence monitor together behind one entry point: seed the initial
//! jobs, run the pool until the system goes quiet, cancel, join, and
//! return the accumulated results in arrival order.

use crate::scheduler::collector::{ActivityStamp, ResultCollector};
use crate::scheduler::job::{Job, JobResult};
use crate::scheduler::monitor::{InFlight, QuiescenceMonitor};
use crate::scheduler::queue::JobQueue;
use crate::scheduler::registry::WorkRegistry;
use crate::scheduler::wrapper::RetryPolicy;
use crate::scheduler::SchedulerError;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Engine construction parameters
///
/// Read-only after construction; shared by reference with every
/// component the engine spawns.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of concurrent executors
    pub pool_size: usize,

    /// Depth at which crawl jobs are refused before doing any work
    pub depth_limit: u32,

    /// Interval between quiescence checks
    pub poll_interval: Duration,

    /// How long the idle condition must hold before completion is declared
    pub grace_period: Duration,

    /// Budget for immediate in-place retries
    pub retry: RetryPolicy,
}

/// Handle for enqueueing work
///
/// Callable by the seed driver and by any running work function;
/// enqueueing never blocks.
#[derive(Clone)]
pub struct SubmitHandle {
    queue: Arc<JobQueue>,
}

impl SubmitHandle {
    /// Enqueues one job
    pub fn submit(&self, job: Job) {
        self.queue.enqueue(job);
    }
}

/// Handle for publishing a completed computation's output
///
/// Callable only from within a work function's execution context.
#[derive(Clone)]
pub struct PublishHandle {
    results_tx: mpsc::UnboundedSender<JobResult>,
}

impl PublishHandle {
    /// Pushes one result toward the collector
    pub fn publish(&self, result: JobResult) {
        if self.results_tx.send(result).is_err() {
            tracing::warn!("result published after collector shutdown, dropping");
        }
    }
}

/// Concurrent set of targets already scheduled
///
/// Consulted before submitting a child when the revisit policy is
/// first-discoverer-wins; under the revisit-always policy it is simply
/// never asked.
#[derive(Clone)]
pub struct SeenSet {
    targets: Arc<Mutex<HashSet<String>>>,
}

impl SeenSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self {
            targets: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Records a target; returns true if this is its first appearance
    pub fn first_visit(&self, target: &str) -> bool {
        self.targets.lock().unwrap().insert(target.to_string())
    }

    /// Number of distinct targets recorded
    pub fn len(&self) -> usize {
        self.targets.lock().unwrap().len()
    }

    /// True if no target has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.targets.lock().unwrap().is_empty()
    }
}

impl Default for SeenSet {
    fn default() -> Self {
        Self::new()
    }
}

/// The recursive, depth-bounded work scheduler
pub struct Engine {
    config: EngineConfig,
    queue: Arc<JobQueue>,
    results_tx: mpsc::UnboundedSender<JobResult>,
    results_rx: mpsc::UnboundedReceiver<JobResult>,
    in_flight: InFlight,
}

impl Engine {
    /// Creates an engine; handles may be taken before [`run`](Self::run)
    pub fn new(config: EngineConfig) -> Self {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        Self {
            config,
            queue: Arc::new(JobQueue::new()),
            results_tx,
            results_rx,
            in_flight: InFlight::new(),
        }
    }

    /// Returns a handle work functions use to enqueue more work
    pub fn submitter(&self) -> SubmitHandle {
        SubmitHandle {
            queue: self.queue.clone(),
        }
    }

    /// Returns a handle work functions use to publish results
    pub fn publisher(&self) -> PublishHandle {
        PublishHandle {
            results_tx: self.results_tx.clone(),
        }
    }

    /// Seeds the initial jobs, runs to quiescence, and returns the
    /// accumulated results in arrival order
    ///
    /// Fails fast — before any worker starts — on an incomplete
    /// registry or an empty seed set. A failing job never aborts the
    /// run; the returned results reflect whatever completed before
    /// quiescence was declared.
    pub async fn run(
        self,
        registry: WorkRegistry,
        seeds: Vec<Job>,
    ) -> Result<Vec<JobResult>, SchedulerError> {
        registry.validate()?;
        if seeds.is_empty() {
            return Err(SchedulerError::NoSeeds);
        }

        let Engine {
            config,
            queue,
            results_tx,
            results_rx,
            in_flight,
        } = self;

        tracing::info!(
            "starting crawl: {} seeds, {} workers, depth limit {}",
            seeds.len(),
            config.pool_size,
            config.depth_limit
        );
        for job in seeds {
            queue.enqueue(job);
        }

        let (cancel_tx, cancel_rx) = watch::channel(false);

        let activity = ActivityStamp::new();
        let collector = ResultCollector::new(results_rx, cancel_rx.clone(), activity.clone());
        let collector_handle = tokio::spawn(collector.collect());

        let pool = super::pool::WorkerPool::new(
            config.pool_size,
            queue.clone(),
            &registry,
            config.retry.clone(),
            config.depth_limit,
            in_flight.clone(),
            cancel_rx,
        );
        let workers = pool.start();

        let monitor = QuiescenceMonitor::new(
            queue.clone(),
            in_flight,
            config.poll_interval,
            config.grace_period,
        );
        monitor.wait_for_quiescence().await;
        tracing::info!("crawl quiescent, shutting down pool");

        // Exactly-once cancellation edge; workers finish in-flight jobs
        // and stop dequeuing.
        let _ = cancel_tx.send(true);
        for worker in workers {
            if let Err(e) = worker.await {
                tracing::error!("worker task failed to join: {}", e);
            }
        }
        drop(results_tx);

        let results = collector_handle
            .await
            .map_err(|e| SchedulerError::Join(e.to_string()))?;
        tracing::info!("crawl finished with {} results", results.len());
        Ok(results)
    }
}
