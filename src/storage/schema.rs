//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Depvine
//! graph ledger.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL
);

-- Repository nodes, one per distinct target
CREATE TABLE IF NOT EXISTS repos (
    id TEXT PRIMARY KEY,
    target TEXT NOT NULL UNIQUE,
    owner TEXT NOT NULL,
    name TEXT NOT NULL,
    url TEXT NOT NULL,
    first_seen_run INTEGER NOT NULL REFERENCES runs(id)
);

CREATE INDEX IF NOT EXISTS idx_repos_target ON repos(target);

-- Dependency edges between repository nodes
CREATE TABLE IF NOT EXISTS edges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    from_id TEXT NOT NULL REFERENCES repos(id),
    to_id TEXT NOT NULL REFERENCES repos(id),
    discovered_run INTEGER NOT NULL REFERENCES runs(id),
    UNIQUE(from_id, to_id)
);

CREATE INDEX IF NOT EXISTS idx_edges_from ON edges(from_id);
CREATE INDEX IF NOT EXISTS idx_edges_to ON edges(to_id);

-- Scored reports, one per crawled repository per run
CREATE TABLE IF NOT EXISTS reports (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    repo_id TEXT NOT NULL REFERENCES repos(id),
    run_id INTEGER NOT NULL REFERENCES runs(id),
    depth INTEGER NOT NULL,
    score INTEGER NOT NULL,
    body TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_reports_repo ON reports(repo_id);
CREATE INDEX IF NOT EXISTS idx_reports_run ON reports(run_id);
"#;
