//! Job wrapper enforcing the retry/reschedule contract
//!
//! The wrapper is the per-kind adapter between a raw work function and
//! the worker pool. It brackets every invocation with start/stop
//! tracing, short-circuits depth-exhausted jobs before any work runs,
//! and interprets the closed set of work outcomes:
//!
//! - `Completed` — done, move on to the next job
//! - `RetryNow` — retry the same job immediately, in place, without
//!   re-enqueueing; bounded by an explicit retry budget
//! - `Discard` — drop the job silently; an expected outcome, not a
//!   failure
//! - any error — terminal failure for this job; logged and discarded,
//!   never aborts the pool or other jobs

use crate::scheduler::job::Job;
use crate::scheduler::registry::WorkFn;
use crate::scheduler::SchedulerError;
use crate::DepvineError;
use std::time::Duration;

/// Non-error outcome of one work-function invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkStatus {
    /// The job finished; nothing further to do
    Completed,

    /// Retry this same job immediately without yielding the pool slot
    RetryNow,

    /// Drop this job; treat as handled, do not report as failure
    Discard,
}

/// Budget for `RetryNow` loops
///
/// Without a budget a persistently failing "retry now" work function
/// would starve its worker forever.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of immediate retries per job
    pub max_immediate_retries: u32,

    /// Optional delay between immediate retries
    pub backoff: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_immediate_retries: 5,
            backoff: None,
        }
    }
}

/// How a wrapped job execution ended, as seen by the pool
#[derive(Debug)]
pub enum JobDisposition {
    /// Work function returned `Completed`
    Completed,

    /// Work function returned `Discard`, or the depth gate refused the job
    Discarded,

    /// Terminal failure; the job is dropped
    Failed(DepvineError),
}

/// Per-kind adapter between a work function and the pool
///
/// Owns no state beyond its configuration; every invocation is
/// independent and the wrapper performs no locking.
pub struct JobWrapper {
    work_fn: WorkFn,
    retry: RetryPolicy,
    depth_limit: u32,
}

impl JobWrapper {
    /// Creates a wrapper around a work function
    pub fn new(work_fn: WorkFn, retry: RetryPolicy, depth_limit: u32) -> Self {
        Self {
            work_fn,
            retry,
            depth_limit,
        }
    }

    /// Runs one job to its final disposition
    ///
    /// A job whose payload carries a depth at or beyond the configured
    /// limit is refused here, before the work function performs any I/O.
    pub async fn run(&self, job: Job) -> JobDisposition {
        if let Some(depth) = job.payload.depth() {
            if depth >= self.depth_limit {
                tracing::debug!("depth limit {} reached, dropping {}", self.depth_limit, job.summary());
                return JobDisposition::Discarded;
            }
        }

        let summary = job.summary();
        let mut attempts: u32 = 0;
        loop {
            tracing::debug!("START {}", summary);
            let outcome = (self.work_fn)(job.payload.clone()).await;
            tracing::debug!("STOP {}", summary);

            match outcome {
                Ok(WorkStatus::Completed) => return JobDisposition::Completed,
                Ok(WorkStatus::Discard) => {
                    tracing::debug!("{} discarded by its work function", job.kind);
                    return JobDisposition::Discarded;
                }
                Ok(WorkStatus::RetryNow) => {
                    attempts += 1;
                    if attempts > self.retry.max_immediate_retries {
                        return JobDisposition::Failed(
                            SchedulerError::RetryBudgetExhausted {
                                kind: job.kind,
                                attempts,
                            }
                            .into(),
                        );
                    }
                    tracing::debug!("RE-RUN IMMEDIATELY ({}/{}) {}", attempts, self.retry.max_immediate_retries, summary);
                    if let Some(delay) = self.retry.backoff {
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(e) => return JobDisposition::Failed(e),
            }
        }
    }
}
