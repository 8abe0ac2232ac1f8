//! Job and result types for the crawl engine
//!
//! A Job is an immutable unit of work: a kind tag plus a kind-specific
//! payload. Jobs are created by the seed driver or by running work
//! functions, owned by the queue until dequeued, then owned by the
//! executing worker until the execution finishes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of job kinds the engine knows how to execute
///
/// Every kind must have a handler in the work registry; the registry is
/// validated against this set before the worker pool starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobKind {
    /// Fetch, score, and expand one repository
    CrawlRepo,

    /// Read a file of repository references and seed crawl jobs
    SeedList,
}

impl JobKind {
    /// All kinds, in registry-validation order
    pub const ALL: &'static [JobKind] = &[JobKind::CrawlRepo, JobKind::SeedList];

    /// Stable string tag for logs and serialized results
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::CrawlRepo => "crawl-repo",
            JobKind::SeedList => "seed-list",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload for a repository crawl job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoCrawlPayload {
    /// Repository to examine, e.g. "github.com/owner/name"
    pub target: String,

    /// Node id of the repository whose manifest discovered this edge,
    /// or None for a seed
    pub discovered_by: Option<String>,

    /// Discovery hops from the seed; seeds are 0, children are parent + 1
    pub depth: u32,
}

/// Payload for a seed-list job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedFilePayload {
    /// Path to a newline-separated file of repository references
    pub path: String,
}

/// Kind-specific job payload
///
/// The set of payloads is closed: one variant per [`JobKind`], so a
/// payload always knows its own kind and dispatch never has to guess.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum JobPayload {
    RepoCrawl(RepoCrawlPayload),
    SeedFile(SeedFilePayload),
}

impl JobPayload {
    /// The kind this payload belongs to
    pub fn kind(&self) -> JobKind {
        match self {
            JobPayload::RepoCrawl(_) => JobKind::CrawlRepo,
            JobPayload::SeedFile(_) => JobKind::SeedList,
        }
    }

    /// Recursion depth carried by this payload, if the kind is depth-bounded
    pub fn depth(&self) -> Option<u32> {
        match self {
            JobPayload::RepoCrawl(p) => Some(p.depth),
            JobPayload::SeedFile(_) => None,
        }
    }

    /// Short single-line description used in trace brackets
    fn describe(&self) -> String {
        match self {
            JobPayload::RepoCrawl(p) => {
                format!("target={} depth={}", p.target, p.depth)
            }
            JobPayload::SeedFile(p) => format!("path={}", p.path),
        }
    }
}

/// One schedulable unit of work
#[derive(Debug, Clone)]
pub struct Job {
    /// Which work function handles this job
    pub kind: JobKind,

    /// Kind-specific payload
    pub payload: JobPayload,
}

impl Job {
    /// Creates a job from a payload; the kind is derived from the variant
    pub fn new(payload: JobPayload) -> Self {
        Self {
            kind: payload.kind(),
            payload,
        }
    }

    /// Creates a repository crawl job
    pub fn crawl_repo(target: String, discovered_by: Option<String>, depth: u32) -> Self {
        Self::new(JobPayload::RepoCrawl(RepoCrawlPayload {
            target,
            discovered_by,
            depth,
        }))
    }

    /// Creates a seed-list job
    pub fn seed_file(path: String) -> Self {
        Self::new(JobPayload::SeedFile(SeedFilePayload { path }))
    }

    /// One-line summary for trace brackets, truncated to a sane length
    pub fn summary(&self) -> String {
        let full = format!("{} {}", self.kind, self.payload.describe());
        truncate(&full, 100).to_string()
    }
}

/// The output record of a completed job
///
/// The engine treats the payload as opaque: it neither inspects nor
/// deduplicates result contents. A job yields at most one result even
/// when retried; only the final successful invocation emits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    /// Kind of the job that produced this result
    pub kind: JobKind,

    /// Domain payload, opaque to the engine
    pub payload: serde_json::Value,
}

/// Clamps a string to at most `max` bytes on a char boundary
pub(crate) fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_derived_from_payload() {
        let job = Job::crawl_repo("github.com/acme/app".to_string(), None, 0);
        assert_eq!(job.kind, JobKind::CrawlRepo);
        assert_eq!(job.payload.depth(), Some(0));

        let job = Job::seed_file("./seeds.txt".to_string());
        assert_eq!(job.kind, JobKind::SeedList);
        assert_eq!(job.payload.depth(), None);
    }

    #[test]
    fn test_all_kinds_have_distinct_tags() {
        let mut tags: Vec<&str> = JobKind::ALL.iter().map(|k| k.as_str()).collect();
        tags.sort();
        tags.dedup();
        assert_eq!(tags.len(), JobKind::ALL.len());
    }

    #[test]
    fn test_summary_is_truncated() {
        let long_target = format!("github.com/{}/app", "a".repeat(200));
        let job = Job::crawl_repo(long_target, None, 3);
        assert!(job.summary().len() <= 100);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let s = "αβγδε";
        let t = truncate(s, 3);
        assert!(s.starts_with(t));
        assert!(t.len() <= 3);
    }

    #[test]
    fn test_job_result_roundtrip() {
        let result = JobResult {
            kind: JobKind::CrawlRepo,
            payload: serde_json::json!({"target": "github.com/acme/app"}),
        };
        let encoded = serde_json::to_string(&result).unwrap();
        let decoded: JobResult = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.kind, JobKind::CrawlRepo);
        assert_eq!(decoded.payload["target"], "github.com/acme/app");
    }
}
