//! Output module for crawl reports and summaries
//!
//! This module handles:
//! - Emitting the JSON report (the primary machine-readable output)
//! - Generating a markdown summary of a finished crawl

mod json;
mod markdown;

pub use json::{format_reports, write_reports};
pub use markdown::{format_markdown_summary, generate_markdown_summary};

use crate::jobs::RepoReport;
use crate::scheduler::{JobKind, JobResult};
use chrono::{DateTime, Utc};

/// Decoded view of a finished crawl, ready for summarization
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub reports: Vec<RepoReport>,
}

impl CrawlSummary {
    /// Total dependency edges across all reports
    pub fn total_edges(&self) -> usize {
        self.reports.iter().map(|r| r.dependencies.len()).sum()
    }

    /// Total dependency problems across all reports
    pub fn total_problems(&self) -> usize {
        self.reports
            .iter()
            .map(|r| r.dependency_problems.len())
            .sum()
    }

    /// Count of `[HIGH]` risk notes across all reports
    pub fn high_risk_findings(&self) -> usize {
        self.reports
            .iter()
            .flat_map(|r| r.risk_notes.risk.iter())
            .filter(|note| note.starts_with("[HIGH]"))
            .count()
    }

    /// Mean score, or None for an empty crawl
    pub fn average_score(&self) -> Option<f64> {
        if self.reports.is_empty() {
            return None;
        }
        let total: i64 = self.reports.iter().map(|r| r.score as i64).sum();
        Some(total as f64 / self.reports.len() as f64)
    }
}

/// Decodes the engine's opaque results into a crawl summary
///
/// Results of other kinds or with undecodable payloads are skipped with
/// a warning; a malformed report must not sink the whole summary.
pub fn summarize(
    results: &[JobResult],
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
) -> CrawlSummary {
    let mut reports = Vec::new();

    for result in results {
        if result.kind != JobKind::CrawlRepo {
            continue;
        }
        match serde_json::from_value::<RepoReport>(result.payload.clone()) {
            Ok(report) => reports.push(report),
            Err(e) => tracing::warn!("skipping undecodable report payload: {}", e),
        }
    }

    CrawlSummary {
        started_at,
        finished_at,
        reports,
    }
}
