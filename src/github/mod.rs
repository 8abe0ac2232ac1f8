//! GitHub API access
//!
//! This module contains the typed REST client used by the crawl work
//! function: repository metadata, contributor and fork samples, and raw
//! manifest downloads.

mod client;
mod types;

pub use client::{build_http_client, GithubClient, GithubError};
pub use types::{Contributor, ForkEntry, LicenseInfo, OwnerInfo, ParentInfo, RepoInfo};
