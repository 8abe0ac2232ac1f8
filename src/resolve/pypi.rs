//! PyPI resolution
//!
//! PyPI project pages carry the repository link as page content rather
//! than a stable API field, so resolution scrapes the project page for
//! a github/bitbucket/gitlab link. libraries.io is used as a second
//! attempt (its rate limit is too strict to be the first). Packages
//! that still cannot be traced to a repository are reported as
//! dependency problems, including a homepage pointer when the page has
//! one.

use crate::manifests::DependencyProblem;
use crate::resolve::Resolution;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;

const NO_DESCRIPTION_TEXT: &str =
    "The author of this package has not provided a project description";

#[derive(Debug, Deserialize)]
struct LibrariesIoInfo {
    #[serde(default)]
    repository_url: Option<String>,
}

/// What one pass over the project page HTML yields
#[derive(Debug, Default)]
struct PageScan {
    no_description: bool,
    repo_path: Option<String>,
    homepage: Option<String>,
}

/// Scans the project page for a repository link, a missing-description
/// marker, and a homepage pointer
///
/// Synchronous on purpose: the parsed DOM stays inside this function.
fn scan_project_page(body: &str, name: &str) -> PageScan {
    let mut scan = PageScan::default();

    let pattern = format!(
        r"((?:github\.com|bitbucket\.org|gitlab\.com)/(?:repos/)?[A-Za-z0-9._-]+/(?:{}|{}))",
        regex::escape(name),
        regex::escape(&name.to_lowercase())
    );
    if let Ok(re) = Regex::new(&pattern) {
        scan.repo_path = re.captures(body).map(|caps| caps[1].to_string());
    }

    let document = Html::parse_document(body);

    if let Ok(selector) = Selector::parse("div#description p") {
        if let Some(paragraph) = document.select(&selector).next() {
            let text: String = paragraph.text().collect();
            if text.trim() == NO_DESCRIPTION_TEXT {
                scan.no_description = true;
            }
        }
    }

    if let Ok(selector) = Selector::parse("div.sidebar-section a") {
        for link in document.select(&selector) {
            let text: String = link.text().collect();
            if text.trim().to_lowercase() == "homepage" {
                scan.homepage = link.value().attr("href").map(String::from);
                break;
            }
        }
    }

    scan
}

/// Second attempt: ask libraries.io for the repository URL
async fn try_libraries_io(http: &Client, base: &str, name: &str) -> Option<String> {
    tracing::debug!("trying to acquire repository url for {} from libraries.io", name);
    let url = format!("{}/{}", base, name);

    let response = http.get(&url).send().await.ok()?;
    if !response.status().is_success() {
        return None;
    }

    let info: LibrariesIoInfo = response.json().await.ok()?;
    info.repository_url
        .filter(|u| !u.is_empty() && u != "null")
}

/// Resolves a PyPI package to its repository URL
pub async fn resolve(http: &Client, pypi_base: &str, libraries_io_base: &str, name: &str) -> Resolution {
    let page_url = format!("{}/{}", pypi_base, name);
    let mut resolution = Resolution::default();

    let response = match http.get(&page_url).send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!("pypi lookup failed for {}: {}", name, e);
            return resolution;
        }
    };

    if !response.status().is_success() {
        resolution.problems.push(DependencyProblem {
            name: name.to_string(),
            url: page_url,
            risk_notes: vec![
                "[MEDIUM] Could not retrieve information from the PyPI website for this library"
                    .to_string(),
            ],
        });
        return resolution;
    }

    let body = match response.text().await {
        Ok(b) => b,
        Err(_) => return resolution,
    };

    let scan = scan_project_page(&body, name);

    let mut problem = DependencyProblem {
        name: name.to_string(),
        url: page_url,
        risk_notes: Vec::new(),
    };

    if scan.no_description {
        problem
            .risk_notes
            .push("[MEDIUM] This project does not have a description page on PyPI".to_string());
    }

    if let Some(repo_path) = scan.repo_path {
        resolution.repo_urls.push(repo_path);
    } else if let Some(repo_url) = try_libraries_io(http, libraries_io_base, name).await {
        tracing::debug!("found repository url {} using libraries.io", repo_url);
        resolution.repo_urls.push(repo_url);
    } else {
        problem
            .risk_notes
            .push("[MEDIUM] PyPI page does not have any reference to a repository".to_string());
        if let Some(homepage) = scan.homepage {
            problem.risk_notes.push(format!(
                "[INFO] PyPI page has a homepage for the project at {}",
                homepage
            ));
        }
    }

    if !problem.risk_notes.is_empty() {
        resolution.problems.push(problem);
    }
    resolution
}
