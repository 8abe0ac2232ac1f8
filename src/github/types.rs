use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Repository metadata returned by the GitHub REST API
///
/// Only the fields the scorer and crawler consume are deserialized;
/// everything else in the response is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoInfo {
    pub name: String,

    pub full_name: String,

    pub owner: OwnerInfo,

    pub html_url: String,

    #[serde(default)]
    pub fork: bool,

    /// Present only for forks
    #[serde(default)]
    pub parent: Option<ParentInfo>,

    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub stargazers_count: u32,

    #[serde(default)]
    pub watchers_count: u32,

    #[serde(default)]
    pub has_wiki: bool,

    #[serde(default)]
    pub license: Option<LicenseInfo>,

    #[serde(default)]
    pub default_branch: Option<String>,
}

impl RepoInfo {
    /// Branch raw manifest files are fetched from
    pub fn branch(&self) -> &str {
        self.default_branch.as_deref().unwrap_or("master")
    }
}

/// Repository owner
#[derive(Debug, Clone, Deserialize)]
pub struct OwnerInfo {
    pub login: String,

    /// "User" or "Organization"
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl OwnerInfo {
    pub fn is_organization(&self) -> bool {
        self.kind == "Organization"
    }
}

/// Parent repository of a fork
#[derive(Debug, Clone, Deserialize)]
pub struct ParentInfo {
    pub full_name: String,
}

/// License attached to a repository
#[derive(Debug, Clone, Deserialize)]
pub struct LicenseInfo {
    #[serde(default)]
    pub key: Option<String>,
}

/// One entry of the contributors listing
#[derive(Debug, Clone, Deserialize)]
pub struct Contributor {
    pub login: String,

    #[serde(default)]
    pub contributions: u32,
}

/// One entry of the forks listing
#[derive(Debug, Clone, Deserialize)]
pub struct ForkEntry {
    pub full_name: String,
}
