//! Depvine: a recursive dependency-risk crawler
//!
//! This crate crawls a graph of source-code repositories outward from seed
//! repositories, following dependency edges discovered in manifest files,
//! and produces a scored risk report per repository.

pub mod config;
pub mod github;
pub mod jobs;
pub mod manifests;
pub mod output;
pub mod repos;
pub mod resolve;
pub mod scheduler;
pub mod score;
pub mod storage;

use thiserror::Error;

/// Main error type for Depvine operations
#[derive(Debug, Error)]
pub enum DepvineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] scheduler::SchedulerError),

    #[error("GitHub API error: {0}")]
    Github(#[from] github::GithubError),

    #[error("Repository reference error: {0}")]
    RepoRef(#[from] repos::RepoRefError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Output error: {0}")]
    Output(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid seed repository '{0}'")]
    InvalidSeed(String),
}

/// Result type alias for Depvine operations
pub type Result<T> = std::result::Result<T, DepvineError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use jobs::RepoReport;
pub use repos::RepoRef;
pub use scheduler::{Engine, Job, JobKind, JobResult};
