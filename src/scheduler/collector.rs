//! Result collection
//!
//! Results travel out of the worker pool on an unbounded channel,
//! separate from the job queue. The collector drains that channel into
//! an arrival-ordered list and stamps the time of the last result seen,
//! which the engine reports in its progress logs.

use crate::scheduler::job::JobResult;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::{mpsc, watch};

/// Shared record of the last time any result arrived
#[derive(Clone)]
pub struct ActivityStamp {
    last_seen: Arc<Mutex<Option<Instant>>>,
}

impl ActivityStamp {
    /// Creates a stamp with no activity recorded
    pub fn new() -> Self {
        Self {
            last_seen: Arc::new(Mutex::new(None)),
        }
    }

    fn touch(&self) {
        *self.last_seen.lock().unwrap() = Some(Instant::now());
    }

    /// Time of the most recent result, if any has arrived
    pub fn last_seen(&self) -> Option<Instant> {
        *self.last_seen.lock().unwrap()
    }
}

impl Default for ActivityStamp {
    fn default() -> Self {
        Self::new()
    }
}

/// Drains the result channel into an accumulating list
pub struct ResultCollector {
    results_rx: mpsc::UnboundedReceiver<JobResult>,
    cancel: watch::Receiver<bool>,
    activity: ActivityStamp,
}

impl ResultCollector {
    /// Creates a collector over the given channel and cancel signal
    pub fn new(
        results_rx: mpsc::UnboundedReceiver<JobResult>,
        cancel: watch::Receiver<bool>,
        activity: ActivityStamp,
    ) -> Self {
        Self {
            results_rx,
            cancel,
            activity,
        }
    }

    /// Runs until the channel closes or cancellation fires, returning
    /// all accumulated results in arrival order
    ///
    /// On cancellation anything already sitting in the channel is
    /// drained before returning, so results published just before the
    /// shutdown edge are not dropped.
    pub async fn collect(mut self) -> Vec<JobResult> {
        let mut results = Vec::new();

        loop {
            tokio::select! {
                received = self.results_rx.recv() => match received {
                    Some(result) => {
                        self.activity.touch();
                        results.push(result);
                    }
                    None => break,
                },
                _ = self.cancel.changed() => {
                    while let Ok(result) = self.results_rx.try_recv() {
                        results.push(result);
                    }
                    break;
                }
            }
        }

        tracing::debug!("collector finished with {} results", results.len());
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::job::JobKind;
    use std::time::Duration;

    fn result(tag: &str) -> JobResult {
        JobResult {
            kind: JobKind::CrawlRepo,
            payload: serde_json::json!({ "target": tag }),
        }
    }

    #[tokio::test]
    async fn test_collects_in_arrival_order_until_channel_closes() {
        let (tx, rx) = mpsc::unbounded_channel();
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        let activity = ActivityStamp::new();
        let collector = ResultCollector::new(rx, cancel_rx, activity.clone());
        let handle = tokio::spawn(collector.collect());

        tx.send(result("a")).unwrap();
        tx.send(result("b")).unwrap();
        drop(tx);

        let results = handle.await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].payload["target"], "a");
        assert_eq!(results[1].payload["target"], "b");
        assert!(activity.last_seen().is_some());
    }

    #[tokio::test]
    async fn test_cancellation_stops_collector_and_drains_backlog() {
        let (tx, rx) = mpsc::unbounded_channel();
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let collector = ResultCollector::new(rx, cancel_rx, ActivityStamp::new());
        let handle = tokio::spawn(collector.collect());

        tx.send(result("a")).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        tx.send(result("b")).unwrap();
        cancel_tx.send(true).unwrap();

        // Sender stays alive; only cancellation can end the loop.
        let results = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("collector must exit promptly on cancellation")
            .unwrap();
        assert_eq!(results.len(), 2);
        drop(tx);
    }
}
