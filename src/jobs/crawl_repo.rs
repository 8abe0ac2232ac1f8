//! The repository crawl work function
//!
//! One invocation handles one repository: fetch its metadata, score it,
//! pull the manifest files the crawler understands, parse them into
//! dependency edges, resolve named packages through their registries,
//! publish a report, and enqueue a child crawl for every GitHub-hosted
//! dependency at depth + 1.

use crate::jobs::{enqueue_crawl, JobContext};
use crate::manifests::{self, DependencyProblem, DependencyRef};
use crate::repos::{normalize_repo_url, RepoRef};
use crate::resolve::resolve_package;
use crate::scheduler::{JobKind, JobPayload, JobResult, SchedulerError, WorkStatus};
use crate::score::{self, RiskNotes, ScoringWeights};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The report one crawl publishes for its repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoReport {
    /// Stable node id of the repository
    pub id: String,

    /// Canonical reference, e.g. "github.com/owner/name"
    pub target: String,

    /// Node id of the repository that discovered this one, if any
    pub discovered_by: Option<String>,

    /// Discovery depth from the seed
    pub depth: u32,

    pub owner: String,

    pub name: String,

    pub url: String,

    /// Canonical references of every discovered dependency repository
    pub dependencies: Vec<String>,

    /// Dependencies that could not be followed cleanly
    pub dependency_problems: Vec<DependencyProblem>,

    /// Risk/merit notes from the scoring heuristic
    pub risk_notes: RiskNotes,

    /// Folded 0..=100 health score
    pub score: i32,

    pub fetched_at: DateTime<Utc>,
}

/// Runs one repository crawl
pub async fn run(payload: JobPayload, ctx: Arc<JobContext>) -> crate::Result<WorkStatus> {
    let JobPayload::RepoCrawl(job) = payload else {
        return Err(SchedulerError::PayloadMismatch {
            expected: JobKind::CrawlRepo,
        }
        .into());
    };

    let repo = RepoRef::parse(&job.target)?;
    let node_id = repo.node_id();

    let info = match ctx.github.get_repo(&repo).await {
        Ok(info) => info,
        Err(e) if e.is_transient() => {
            tracing::warn!("transient error fetching {}, retrying: {}", repo, e);
            return Ok(WorkStatus::RetryNow);
        }
        Err(e) => return Err(e.into()),
    };

    let contributor_count = match ctx.github.contributor_count(&repo).await {
        Ok(count) => count,
        Err(e) if e.is_transient() => return Ok(WorkStatus::RetryNow),
        Err(e) => return Err(e.into()),
    };
    let fork_count = match ctx.github.fork_count(&repo).await {
        Ok(count) => count,
        Err(e) if e.is_transient() => return Ok(WorkStatus::RetryNow),
        Err(e) => return Err(e.into()),
    };

    let risk_notes = score::evaluate(&info, contributor_count, fork_count, Utc::now());
    let score = risk_notes.total_score(&ScoringWeights::default());

    let (dependencies, dependency_problems) = collect_dependencies(&ctx, &repo, &info).await;

    let report = RepoReport {
        id: node_id.clone(),
        target: repo.to_string(),
        discovered_by: job.discovered_by.clone(),
        depth: job.depth,
        owner: info.owner.login.clone(),
        name: info.name.clone(),
        url: info.html_url.clone(),
        dependencies: dependencies.clone(),
        dependency_problems,
        risk_notes,
        score,
        fetched_at: Utc::now(),
    };
    ctx.publish.publish(JobResult {
        kind: JobKind::CrawlRepo,
        payload: serde_json::to_value(&report)?,
    });

    for target in &dependencies {
        match RepoRef::parse(target) {
            Ok(dep) if dep.is_github() => {
                if enqueue_crawl(&ctx, dep.to_string(), Some(node_id.clone()), job.depth + 1) {
                    tracing::info!("queued scoring job for '{}' found in {}", dep, repo);
                }
            }
            _ => {
                tracing::info!("no scoring job for '{}' found in {}", target, repo);
            }
        }
    }

    Ok(WorkStatus::Completed)
}

/// Downloads and parses every supported manifest of a repository
///
/// Returns canonical dependency references (sorted, deduplicated) and
/// accumulated problem records. Manifest-level failures degrade to
/// fewer edges; they never fail the job.
async fn collect_dependencies(
    ctx: &JobContext,
    repo: &RepoRef,
    info: &crate::github::RepoInfo,
) -> (Vec<String>, Vec<DependencyProblem>) {
    let mut discovered = Vec::new();
    let mut problems = Vec::new();

    for (filename, parser) in manifests::SUPPORTED {
        let bytes = match ctx.github.fetch_raw_file(repo, info.branch(), filename).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!("could not download {} for {}: {}", filename, repo, e);
                continue;
            }
        };

        let parsed = parser(&bytes);
        problems.extend(parsed.problems);

        for dependency in parsed.dependencies {
            match dependency {
                DependencyRef::Repo(raw) => {
                    if let Some(canonical) = normalize_repo_url(&raw) {
                        discovered.push(canonical);
                    }
                }
                DependencyRef::Package { ecosystem, name } => {
                    let resolution =
                        resolve_package(&ctx.http, &ctx.config.registries, ecosystem, &name).await;
                    problems.extend(resolution.problems);
                    for url in resolution.repo_urls {
                        if let Some(canonical) = normalize_repo_url(&url) {
                            discovered.push(canonical);
                        }
                    }
                }
            }
        }
    }

    discovered.sort();
    discovered.dedup();
    (discovered, problems)
}
