//! GitHub REST client
//!
//! All GitHub traffic goes through this client: repository metadata,
//! contributor and fork samples for scoring, and raw manifest file
//! downloads. Responses are classified into a small error taxonomy so
//! work functions can decide between immediate retry and terminal
//! failure.

use crate::config::GithubConfig;
use crate::github::types::{Contributor, ForkEntry, RepoInfo};
use crate::repos::RepoRef;
use reqwest::{Client, RequestBuilder, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Errors from the GitHub API
#[derive(Debug, Error)]
pub enum GithubError {
    #[error("repository not found: {0}")]
    NotFound(String),

    #[error("rate limited by the GitHub API")]
    RateLimited,

    #[error("GitHub returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl GithubError {
    /// True for failures worth an immediate in-place retry
    pub fn is_transient(&self) -> bool {
        match self {
            GithubError::Status { status, .. } => (500..=599).contains(status),
            GithubError::Transport(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// Builds the shared HTTP client with the crawler's user agent
///
/// GitHub rejects requests without a user agent, so the crate name and
/// version identify the crawler on every call.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let user_agent = format!("depvine/{}", env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Client for the GitHub REST API and raw file host
#[derive(Clone)]
pub struct GithubClient {
    http: Client,
    api_base: String,
    raw_base: String,
    auth_token: Option<String>,
}

impl GithubClient {
    /// Creates a client over a shared HTTP client and configuration
    pub fn new(http: Client, config: &GithubConfig) -> Self {
        Self {
            http,
            api_base: config.api_base.clone(),
            raw_base: config.raw_base.clone(),
            auth_token: config.auth_token.clone(),
        }
    }

    fn request(&self, url: &str) -> RequestBuilder {
        let mut builder = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.auth_token {
            builder = builder.header("Authorization", format!("token {}", token));
        }
        builder
    }

    /// Fetches metadata for one repository
    pub async fn get_repo(&self, repo: &RepoRef) -> Result<RepoInfo, GithubError> {
        let url = format!("{}/repos/{}/{}", self.api_base, repo.owner, repo.name);
        let response = self.request(&url).send().await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            StatusCode::NOT_FOUND => Err(GithubError::NotFound(repo.to_string())),
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => Err(GithubError::RateLimited),
            status => Err(GithubError::Status {
                status: status.as_u16(),
                url,
            }),
        }
    }

    /// Counts contributors, sampled from the first listing page
    pub async fn contributor_count(&self, repo: &RepoRef) -> Result<usize, GithubError> {
        let url = format!(
            "{}/repos/{}/{}/contributors?per_page=100",
            self.api_base, repo.owner, repo.name
        );
        let response = self.request(&url).send().await?;

        match response.status() {
            StatusCode::OK => {
                let contributors: Vec<Contributor> = response.json().await?;
                Ok(contributors.len())
            }
            // An empty repository answers 204
            StatusCode::NO_CONTENT => Ok(0),
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => Err(GithubError::RateLimited),
            status => Err(GithubError::Status {
                status: status.as_u16(),
                url,
            }),
        }
    }

    /// Counts forks, sampled from the first listing page
    pub async fn fork_count(&self, repo: &RepoRef) -> Result<usize, GithubError> {
        let url = format!(
            "{}/repos/{}/{}/forks?per_page=100",
            self.api_base, repo.owner, repo.name
        );
        let response = self.request(&url).send().await?;

        match response.status() {
            StatusCode::OK => {
                let forks: Vec<ForkEntry> = response.json().await?;
                Ok(forks.len())
            }
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => Err(GithubError::RateLimited),
            status => Err(GithubError::Status {
                status: status.as_u16(),
                url,
            }),
        }
    }

    /// Downloads one file from the raw host
    ///
    /// Returns None when the file does not exist on the branch; a
    /// missing manifest is the normal case, not an error.
    pub async fn fetch_raw_file(
        &self,
        repo: &RepoRef,
        branch: &str,
        filename: &str,
    ) -> Result<Option<Vec<u8>>, GithubError> {
        let url = format!(
            "{}/{}/{}/{}/{}",
            self.raw_base, repo.owner, repo.name, branch, filename
        );
        let response = self.http.get(&url).send().await?;

        if response.status() == StatusCode::OK {
            tracing::debug!("downloaded {}", url);
            let bytes = response.bytes().await?;
            Ok(Some(bytes.to_vec()))
        } else {
            Ok(None)
        }
    }
}
