//! npm registry resolution

use crate::resolve::Resolution;
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct NpmInfo {
    #[serde(default)]
    repository: Option<NpmRepository>,
}

#[derive(Debug, Deserialize)]
struct NpmRepository {
    #[serde(rename = "type", default)]
    kind: String,

    #[serde(default)]
    url: String,
}

/// Looks up a package's repository URL in the npm registry
pub async fn resolve(http: &Client, base: &str, name: &str) -> Resolution {
    let url = format!("{}/{}/", base, name);

    let response = match http.get(&url).send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!("npm lookup failed for {}: {}", name, e);
            return Resolution::default();
        }
    };
    if !response.status().is_success() {
        return Resolution::default();
    }

    let info: NpmInfo = match response.json().await {
        Ok(i) => i,
        Err(e) => {
            tracing::debug!("npm response for {} was not parseable: {}", name, e);
            return Resolution::default();
        }
    };

    let mut resolution = Resolution::default();
    if let Some(repository) = info.repository {
        if repository.kind.to_lowercase() == "git" && !repository.url.is_empty() {
            let cleaned = repository
                .url
                .trim_start_matches("git+")
                .trim_end_matches(".git")
                .to_string();
            resolution.repo_urls.push(cleaned);
        }
    }
    resolution
}
