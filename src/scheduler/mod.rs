//! Recursive, depth-bounded work scheduler
//!
//! The engine at the heart of the crawl: it accepts an initial set of
//! jobs, runs them concurrently with bounded parallelism, lets running
//! jobs enqueue more jobs, enforces a retry/reschedule contract per
//! job, collects results out of band, and decides on its own when the
//! whole system has gone idle and is safe to shut down.
//!
//! Producers and consumers are the same pool and the total amount of
//! work is unknown in advance; termination is detected exactly from
//! queue emptiness plus an in-flight execution counter, confirmed over
//! a grace window.

mod collector;
mod engine;
mod job;
mod monitor;
mod pool;
mod queue;
mod registry;
mod wrapper;

pub use collector::{ActivityStamp, ResultCollector};
pub use engine::{Engine, EngineConfig, PublishHandle, SeenSet, SubmitHandle};
pub use job::{Job, JobKind, JobPayload, JobResult, RepoCrawlPayload, SeedFilePayload};
pub use monitor::{InFlight, InFlightGuard, QuiescenceMonitor};
pub use pool::WorkerPool;
pub use queue::JobQueue;
pub use registry::{WorkFn, WorkFuture, WorkRegistry};
pub use wrapper::{JobDisposition, JobWrapper, RetryPolicy, WorkStatus};

use thiserror::Error;

/// Errors raised by the scheduler itself
///
/// Work-function failures are not represented here; they are terminal
/// for their job only and surface through logs and the failure count.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("no work function registered for job kind '{kind}'")]
    MissingHandler { kind: JobKind },

    #[error("work function for '{expected}' received a payload of another kind")]
    PayloadMismatch { expected: JobKind },

    #[error("no seed jobs to run")]
    NoSeeds,

    #[error("'{kind}' job exhausted its immediate-retry budget after {attempts} attempts")]
    RetryBudgetExhausted { kind: JobKind, attempts: u32 },

    #[error("scheduler task failed to join: {0}")]
    Join(String),
}
