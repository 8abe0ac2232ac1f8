//! Pending-job queue
//!
//! An unbounded, thread-safe buffer of pending jobs with an emptiness
//! signal. Enqueue never blocks and never rejects; dequeue is
//! non-blocking; workers that find the queue empty can await the signal
//! instead of spinning.
//!
//! FIFO order is best-effort, not a contract: the only guarantee is that
//! every enqueued job is eventually dequeued exactly once while the pool
//! keeps running.

use crate::scheduler::job::Job;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::Notify;

/// Thread-safe unbounded job buffer
pub struct JobQueue {
    pending: Mutex<VecDeque<Job>>,
    notify: Notify,
}

impl JobQueue {
    /// Creates an empty queue
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
        }
    }

    /// Appends a job; never blocks, never rejects
    pub fn enqueue(&self, job: Job) {
        let mut pending = self.pending.lock().unwrap();
        pending.push_back(job);
        drop(pending);
        self.notify.notify_one();
    }

    /// Removes and returns the oldest pending job, or None if empty
    ///
    /// If jobs remain after the removal, one more waiter is woken so a
    /// burst of enqueues cannot leave sleeping workers behind.
    pub fn try_dequeue(&self) -> Option<Job> {
        let mut pending = self.pending.lock().unwrap();
        let job = pending.pop_front();
        let more = !pending.is_empty();
        drop(pending);
        if more {
            self.notify.notify_one();
        }
        job
    }

    /// Snapshot of emptiness; a concurrent enqueue may race it
    pub fn is_empty(&self) -> bool {
        self.pending.lock().unwrap().is_empty()
    }

    /// Number of pending jobs at this instant
    pub fn len(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Waits until the queue may have become non-empty
    ///
    /// Wakeups can be spurious; callers must re-check with
    /// [`try_dequeue`](Self::try_dequeue).
    pub async fn wait_nonempty(&self) {
        self.notify.notified().await;
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}
