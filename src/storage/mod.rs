//! Persistent graph ledger
//!
//! After a crawl finishes, the nodes, edges, and reports it produced
//! are written to a SQLite database so later runs and the `--stats`
//! mode can read them back. This is plain post-run CRUD; the job queue
//! itself is never persisted.

mod schema;
mod sqlite;

pub use schema::SCHEMA_SQL;
pub use sqlite::SqliteStorage;

use crate::jobs::RepoReport;
use crate::repos::RepoRef;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "completed" => RunStatus::Completed,
            _ => RunStatus::Running,
        }
    }
}

/// A crawl run row
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
}

/// A repository node row
#[derive(Debug, Clone)]
pub struct RepoNode {
    pub id: String,
    pub target: String,
    pub owner: String,
    pub name: String,
    pub url: String,
}

impl RepoNode {
    /// Builds a node row from a canonical target reference
    pub fn from_target(target: &str) -> Option<Self> {
        let repo = RepoRef::parse(target).ok()?;
        Some(Self {
            id: repo.node_id(),
            target: repo.to_string(),
            owner: repo.owner.clone(),
            name: repo.name.clone(),
            url: format!("https://{}", repo),
        })
    }
}

/// Aggregate counts over the ledger
#[derive(Debug, Clone, Default)]
pub struct GraphStats {
    pub runs: i64,
    pub repos: i64,
    pub edges: i64,
    pub reports: i64,
    pub average_score: Option<f64>,
}

/// Trait for storage backend implementations
pub trait Storage {
    /// Creates a new crawl run and returns its id
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Marks a run as completed
    fn complete_run(&mut self, run_id: i64) -> StorageResult<()>;

    /// Returns the most recent run, if any
    fn latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Inserts a repository node if its target is new
    fn upsert_repo(&mut self, node: &RepoNode, run_id: i64) -> StorageResult<()>;

    /// Records a dependency edge between two nodes
    fn insert_edge(&mut self, from_id: &str, to_id: &str, run_id: i64) -> StorageResult<()>;

    /// Stores one scored report
    fn insert_report(&mut self, run_id: i64, report: &RepoReport) -> StorageResult<()>;

    /// Aggregate counts over everything stored
    fn stats(&self) -> StorageResult<GraphStats>;
}

/// Persists a finished crawl into the ledger
///
/// Creates a run, writes every report with its node and outgoing edges
/// (dependency targets get placeholder nodes until they are crawled
/// themselves), then marks the run completed. Returns the run id.
pub fn record_run(
    storage: &mut dyn Storage,
    config_hash: &str,
    reports: &[RepoReport],
) -> StorageResult<i64> {
    let run_id = storage.create_run(config_hash)?;

    for report in reports {
        if let Some(node) = RepoNode::from_target(&report.target) {
            storage.upsert_repo(&node, run_id)?;
        }
        storage.insert_report(run_id, report)?;

        for dependency in &report.dependencies {
            if let Some(node) = RepoNode::from_target(dependency) {
                storage.upsert_repo(&node, run_id)?;
                storage.insert_edge(&report.id, &node.id, run_id)?;
            }
        }
    }

    storage.complete_run(run_id)?;
    Ok(run_id)
}
