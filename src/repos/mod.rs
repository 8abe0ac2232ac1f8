//! Repository references
//!
//! A [`RepoRef`] is the canonical identity of a repository in the crawl
//! graph: host, owner, and name. References are parsed from seed input
//! and from normalized dependency URLs; each carries a stable node id
//! derived from its owner/name pair.

mod normalize;

pub use normalize::normalize_repo_url;

use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

/// The code host the crawler knows how to expand
pub const GITHUB_HOST: &str = "github.com";

/// Errors from parsing repository references
#[derive(Debug, Error)]
pub enum RepoRefError {
    #[error("malformed repository reference '{0}', expected host/owner/name")]
    Malformed(String),
}

/// Canonical identity of one repository
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    pub host: String,
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// Parses a reference from any of the accepted URL spellings
    pub fn parse(input: &str) -> Result<Self, RepoRefError> {
        let canonical =
            normalize_repo_url(input).ok_or_else(|| RepoRefError::Malformed(input.to_string()))?;

        let mut segments = canonical.split('/');
        match (segments.next(), segments.next(), segments.next()) {
            (Some(host), Some(owner), Some(name)) => Ok(Self {
                host: host.to_string(),
                owner: owner.to_string(),
                name: name.to_string(),
            }),
            _ => Err(RepoRefError::Malformed(input.to_string())),
        }
    }

    /// True if this repository lives on GitHub and can be expanded
    pub fn is_github(&self) -> bool {
        self.host == GITHUB_HOST
    }

    /// Stable node id: truncated hex SHA-256 of the owner/name pair
    ///
    /// Case-folded so the same repository reached through differently
    /// cased URLs maps to one node.
    pub fn node_id(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("{}/{}", self.owner, self.name).to_lowercase());
        let digest = hasher.finalize();
        hex::encode(digest)[..32].to_string()
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.host, self.owner, self.name)
    }
}
