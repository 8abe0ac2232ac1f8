//! SQLite storage implementation

use crate::jobs::RepoReport;
use crate::storage::schema::SCHEMA_SQL;
use crate::storage::{GraphStats, RepoNode, RunRecord, RunStatus, Storage, StorageResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite-backed graph ledger
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the database at the given path and applies
    /// the schema
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self { conn })
    }

    /// Opens an in-memory database, used by tests
    pub fn in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self { conn })
    }
}

impl Storage for SqliteStorage {
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![
                Utc::now().to_rfc3339(),
                config_hash,
                RunStatus::Running.as_str()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn complete_run(&mut self, run_id: i64) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE runs SET finished_at = ?1, status = ?2 WHERE id = ?3",
            params![
                Utc::now().to_rfc3339(),
                RunStatus::Completed.as_str(),
                run_id
            ],
        )?;
        if updated == 0 {
            return Err(crate::storage::StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status
                 FROM runs ORDER BY id DESC LIMIT 1",
                [],
                |row| {
                    Ok(RunRecord {
                        id: row.get(0)?,
                        started_at: row.get(1)?,
                        finished_at: row.get(2)?,
                        config_hash: row.get(3)?,
                        status: RunStatus::parse(&row.get::<_, String>(4)?),
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    fn upsert_repo(&mut self, node: &RepoNode, run_id: i64) -> StorageResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO repos (id, target, owner, name, url, first_seen_run)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![node.id, node.target, node.owner, node.name, node.url, run_id],
        )?;
        Ok(())
    }

    fn insert_edge(&mut self, from_id: &str, to_id: &str, run_id: i64) -> StorageResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO edges (from_id, to_id, discovered_run) VALUES (?1, ?2, ?3)",
            params![from_id, to_id, run_id],
        )?;
        Ok(())
    }

    fn insert_report(&mut self, run_id: i64, report: &RepoReport) -> StorageResult<()> {
        let body = serde_json::to_string(report)?;
        self.conn.execute(
            "INSERT INTO reports (repo_id, run_id, depth, score, body, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                report.id,
                run_id,
                report.depth,
                report.score,
                body,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    fn stats(&self) -> StorageResult<GraphStats> {
        let runs: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM runs", [], |row| row.get(0))?;
        let repos: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM repos", [], |row| row.get(0))?;
        let edges: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM edges", [], |row| row.get(0))?;
        let reports: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM reports", [], |row| row.get(0))?;
        let average_score: Option<f64> = self
            .conn
            .query_row("SELECT AVG(score) FROM reports", [], |row| row.get(0))?;

        Ok(GraphStats {
            runs,
            repos,
            edges,
            reports,
            average_score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::RiskNotes;
    use crate::storage::record_run;

    fn test_report(target: &str, id: &str, deps: Vec<&str>) -> RepoReport {
        RepoReport {
            id: id.to_string(),
            target: target.to_string(),
            discovered_by: None,
            depth: 0,
            owner: "acme".to_string(),
            name: "app".to_string(),
            url: format!("https://{}", target),
            dependencies: deps.into_iter().map(String::from).collect(),
            dependency_problems: vec![],
            risk_notes: RiskNotes::default(),
            score: 90,
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_run_lifecycle() {
        let mut storage = SqliteStorage::in_memory().unwrap();

        let run_id = storage.create_run("hash1").unwrap();
        let latest = storage.latest_run().unwrap().unwrap();
        assert_eq!(latest.id, run_id);
        assert_eq!(latest.status, RunStatus::Running);
        assert!(latest.finished_at.is_none());

        storage.complete_run(run_id).unwrap();
        let latest = storage.latest_run().unwrap().unwrap();
        assert_eq!(latest.status, RunStatus::Completed);
        assert!(latest.finished_at.is_some());
    }

    #[test]
    fn test_complete_unknown_run_fails() {
        let mut storage = SqliteStorage::in_memory().unwrap();
        assert!(storage.complete_run(99).is_err());
    }

    #[test]
    fn test_latest_run_on_empty_database() {
        let storage = SqliteStorage::in_memory().unwrap();
        assert!(storage.latest_run().unwrap().is_none());
    }

    #[test]
    fn test_upsert_repo_is_idempotent() {
        let mut storage = SqliteStorage::in_memory().unwrap();
        let run_id = storage.create_run("hash").unwrap();

        let node = RepoNode::from_target("github.com/acme/app").unwrap();
        storage.upsert_repo(&node, run_id).unwrap();
        storage.upsert_repo(&node, run_id).unwrap();

        assert_eq!(storage.stats().unwrap().repos, 1);
    }

    #[test]
    fn test_record_run_writes_nodes_edges_and_reports() {
        let mut storage = SqliteStorage::in_memory().unwrap();

        let report_a = {
            let app = RepoNode::from_target("github.com/acme/app").unwrap();
            test_report("github.com/acme/app", &app.id, vec!["github.com/acme/lib"])
        };
        let report_b = {
            let lib = RepoNode::from_target("github.com/acme/lib").unwrap();
            test_report("github.com/acme/lib", &lib.id, vec![])
        };

        let run_id = record_run(&mut storage, "hash", &[report_a, report_b]).unwrap();

        let stats = storage.stats().unwrap();
        assert_eq!(stats.runs, 1);
        assert_eq!(stats.repos, 2);
        assert_eq!(stats.edges, 1);
        assert_eq!(stats.reports, 2);
        assert_eq!(stats.average_score, Some(90.0));

        let latest = storage.latest_run().unwrap().unwrap();
        assert_eq!(latest.id, run_id);
        assert_eq!(latest.status, RunStatus::Completed);
    }

    #[test]
    fn test_duplicate_edges_are_ignored() {
        let mut storage = SqliteStorage::in_memory().unwrap();
        let run_id = storage.create_run("hash").unwrap();

        let app = RepoNode::from_target("github.com/acme/app").unwrap();
        let lib = RepoNode::from_target("github.com/acme/lib").unwrap();
        storage.upsert_repo(&app, run_id).unwrap();
        storage.upsert_repo(&lib, run_id).unwrap();

        storage.insert_edge(&app.id, &lib.id, run_id).unwrap();
        storage.insert_edge(&app.id, &lib.id, run_id).unwrap();

        assert_eq!(storage.stats().unwrap().edges, 1);
    }
}
