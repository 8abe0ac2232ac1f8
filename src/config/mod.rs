//! Configuration module for Depvine
//!
//! This module handles loading, parsing, and validating TOML
//! configuration files. Every section has sensible defaults, so a
//! config file is optional and CLI flags can override the pieces that
//! matter per run.
//!
//! # Example
//!
//! ```no_run
//! use depvine::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("depvine.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.scheduler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, GithubConfig, OutputConfig, RegistryConfig, RevisitPolicy, SchedulerConfig, SeedEntry,
};

// Re-export parser functions
pub use parser::{compute_config_hash, hash_str, load_config, load_config_with_hash};

// Re-export validation for callers that mutate a loaded config
pub use validation::validate;
