//! Quiescence detection
//!
//! The crawl has no global job counter: jobs are created from inside
//! running jobs, so the total amount of work is unknown in advance.
//! Termination is detected from two observations instead:
//!
//! - the queue is empty, and
//! - no job is in flight (dequeued but not yet fully finished,
//!   including its enqueue side effects).
//!
//! The in-flight counter is incremented *before* a worker removes a job
//! from the queue and decremented only when the execution has fully
//! completed, so there is no instant at which work exists but neither
//! signal shows it. A grace window on top requires the idle condition
//! to hold continuously before completion is declared.

use crate::scheduler::queue::JobQueue;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Counter of jobs currently being executed
///
/// Cloneable handle over shared state; increments pair with guard drops.
#[derive(Clone)]
pub struct InFlight {
    count: Arc<AtomicUsize>,
}

impl InFlight {
    /// Creates a counter at zero
    pub fn new() -> Self {
        Self {
            count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Marks the start of one execution; the returned guard marks its end
    ///
    /// Must be called before the job is removed from the queue so the
    /// queue-empty and in-flight-zero observations never race.
    pub fn begin(&self) -> InFlightGuard {
        self.count.fetch_add(1, Ordering::SeqCst);
        InFlightGuard {
            count: self.count.clone(),
        }
    }

    /// Number of executions currently in flight
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl Default for InFlight {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrements the in-flight count when dropped
pub struct InFlightGuard {
    count: Arc<AtomicUsize>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Polls queue and in-flight state until the crawl has gone quiet
pub struct QuiescenceMonitor {
    queue: Arc<JobQueue>,
    in_flight: InFlight,
    poll_interval: Duration,
    grace_period: Duration,
}

impl QuiescenceMonitor {
    /// Creates a monitor over the given queue and counter
    pub fn new(
        queue: Arc<JobQueue>,
        in_flight: InFlight,
        poll_interval: Duration,
        grace_period: Duration,
    ) -> Self {
        Self {
            queue,
            in_flight,
            poll_interval,
            grace_period,
        }
    }

    /// Returns once the queue has been empty with nothing in flight for
    /// the whole grace period
    ///
    /// Any observed activity resets the grace window.
    pub async fn wait_for_quiescence(&self) {
        let mut idle_since: Option<Instant> = None;
        let mut polls: u64 = 0;

        loop {
            tokio::time::sleep(self.poll_interval).await;
            polls += 1;

            let pending = self.queue.len();
            let running = self.in_flight.count();

            if pending == 0 && running == 0 {
                let since = idle_since.get_or_insert_with(Instant::now);
                if since.elapsed() >= self.grace_period {
                    tracing::debug!("quiescence confirmed after {} polls", polls);
                    return;
                }
            } else {
                idle_since = None;
                if polls % 20 == 0 {
                    tracing::info!(
                        "crawl in progress: {} queued, {} in flight",
                        pending,
                        running
                    );
                }
            }
        }
    }
}
