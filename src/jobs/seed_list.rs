//! The seed-list work function
//!
//! Reads a newline-separated file of repository references and enqueues
//! a depth-0 crawl job for every GitHub reference in it. Lines that do
//! not name a crawlable repository are logged and skipped.

use crate::jobs::{enqueue_crawl, JobContext};
use crate::repos::RepoRef;
use crate::scheduler::{JobKind, JobPayload, SchedulerError, WorkStatus};
use std::sync::Arc;

/// Runs one seed-list job
pub async fn run(payload: JobPayload, ctx: Arc<JobContext>) -> crate::Result<WorkStatus> {
    let JobPayload::SeedFile(job) = payload else {
        return Err(SchedulerError::PayloadMismatch {
            expected: JobKind::SeedList,
        }
        .into());
    };

    let content = tokio::fs::read_to_string(&job.path).await?;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match RepoRef::parse(line) {
            Ok(repo) if repo.is_github() => {
                enqueue_crawl(&ctx, repo.to_string(), None, 0);
            }
            _ => {
                tracing::info!("no scoring job for '{}' in file {}", line, job.path);
            }
        }
    }

    Ok(WorkStatus::Completed)
}
