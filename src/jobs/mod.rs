//! Work functions and crawl wiring
//!
//! This module owns the domain side of the crawl: the work function per
//! job kind, the shared context they execute against, and the
//! [`run_crawl`] entry point that assembles the engine, registry, and
//! seeds into one end-to-end run.

mod crawl_repo;
mod seed_list;

pub use crawl_repo::RepoReport;

use crate::config::{Config, RevisitPolicy};
use crate::github::{build_http_client, GithubClient};
use crate::repos::RepoRef;
use crate::scheduler::{
    Engine, EngineConfig, Job, JobKind, JobResult, PublishHandle, RetryPolicy, SeenSet,
    SubmitHandle, WorkRegistry,
};
use std::sync::Arc;
use std::time::Duration;

/// Shared execution context captured by every work function
///
/// Read-only after construction; work functions must not retain state
/// between invocations beyond what these handles provide.
pub struct JobContext {
    pub config: Arc<Config>,
    pub http: reqwest::Client,
    pub github: GithubClient,
    pub submit: SubmitHandle,
    pub publish: PublishHandle,
    pub seen: SeenSet,
}

/// Submits a crawl job for a target, honoring the revisit policy
///
/// Under the `once` policy a target reached via a second discovery path
/// is recorded but not crawled again; first discoverer wins. Returns
/// whether a job was actually enqueued.
pub fn enqueue_crawl(
    ctx: &JobContext,
    target: String,
    discovered_by: Option<String>,
    depth: u32,
) -> bool {
    if ctx.config.scheduler.revisit_policy == RevisitPolicy::Once && !ctx.seen.first_visit(&target)
    {
        tracing::debug!("'{}' already scheduled, skipping revisit", target);
        return false;
    }
    ctx.submit.submit(Job::crawl_repo(target, discovered_by, depth));
    true
}

/// Builds the work registry over a shared context
pub fn build_registry(ctx: Arc<JobContext>) -> WorkRegistry {
    let mut registry = WorkRegistry::new();

    let crawl_ctx = ctx.clone();
    registry.register(
        JobKind::CrawlRepo,
        Arc::new(move |payload| {
            let ctx = crawl_ctx.clone();
            Box::pin(crawl_repo::run(payload, ctx))
        }),
    );

    let seed_ctx = ctx;
    registry.register(
        JobKind::SeedList,
        Arc::new(move |payload| {
            let ctx = seed_ctx.clone();
            Box::pin(seed_list::run(payload, ctx))
        }),
    );

    registry
}

/// Derives the engine configuration from the application config
pub fn engine_config(config: &Config) -> EngineConfig {
    let backoff = match config.scheduler.retry_backoff_ms {
        0 => None,
        ms => Some(Duration::from_millis(ms)),
    };

    EngineConfig {
        pool_size: config.scheduler.pool_size,
        depth_limit: config.scheduler.max_depth,
        poll_interval: Duration::from_millis(config.scheduler.poll_interval_ms),
        grace_period: Duration::from_millis(config.scheduler.grace_period_ms),
        retry: RetryPolicy {
            max_immediate_retries: config.scheduler.max_immediate_retries,
            backoff,
        },
    }
}

/// Runs a complete crawl: seed, run to quiescence, return the reports
///
/// Seeds come from the configuration's seed list plus any seed files;
/// at least one of the two must be non-empty.
///
/// # Example
///
/// ```no_run
/// use depvine::config::{Config, SeedEntry};
/// use depvine::jobs::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut config = Config::default();
/// config.seeds.push(SeedEntry {
///     repo: "github.com/acme/app".to_string(),
/// });
/// let results = run_crawl(config, &[]).await?;
/// println!("{} repositories scored", results.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, seed_files: &[String]) -> crate::Result<Vec<JobResult>> {
    let engine = Engine::new(engine_config(&config));

    let http = build_http_client()?;
    let github = GithubClient::new(http.clone(), &config.github);
    let config = Arc::new(config);

    let ctx = Arc::new(JobContext {
        config: config.clone(),
        http,
        github,
        submit: engine.submitter(),
        publish: engine.publisher(),
        seen: SeenSet::new(),
    });

    let mut seeds = Vec::new();
    for entry in &config.seeds {
        let repo = RepoRef::parse(&entry.repo)?;
        let target = repo.to_string();
        ctx.seen.first_visit(&target);
        seeds.push(Job::crawl_repo(target, None, 0));
    }
    for path in seed_files {
        seeds.push(Job::seed_file(path.clone()));
    }

    let registry = build_registry(ctx);
    let results = engine.run(registry, seeds).await?;
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeedEntry;

    fn test_context(config: Config) -> (Engine, Arc<JobContext>) {
        let engine = Engine::new(engine_config(&config));
        let config = Arc::new(config);
        let http = build_http_client().unwrap();
        let github = GithubClient::new(http.clone(), &config.github);
        let ctx = Arc::new(JobContext {
            config,
            http,
            github,
            submit: engine.submitter(),
            publish: engine.publisher(),
            seen: SeenSet::new(),
        });
        (engine, ctx)
    }

    #[test]
    fn test_enqueue_crawl_suppresses_revisits_under_once_policy() {
        let (_engine, ctx) = test_context(Config::default());

        assert!(enqueue_crawl(&ctx, "github.com/acme/app".to_string(), None, 0));
        assert!(!enqueue_crawl(
            &ctx,
            "github.com/acme/app".to_string(),
            Some("deadbeef".to_string()),
            1
        ));
        assert!(enqueue_crawl(&ctx, "github.com/acme/lib".to_string(), None, 0));
    }

    #[test]
    fn test_enqueue_crawl_allows_revisits_under_always_policy() {
        let mut config = Config::default();
        config.scheduler.revisit_policy = RevisitPolicy::Always;
        let (_engine, ctx) = test_context(config);

        assert!(enqueue_crawl(&ctx, "github.com/acme/app".to_string(), None, 0));
        assert!(enqueue_crawl(&ctx, "github.com/acme/app".to_string(), None, 1));
    }

    #[test]
    fn test_engine_config_derivation() {
        let mut config = Config::default();
        config.scheduler.pool_size = 7;
        config.scheduler.max_depth = 2;
        config.scheduler.retry_backoff_ms = 50;

        let engine_cfg = engine_config(&config);
        assert_eq!(engine_cfg.pool_size, 7);
        assert_eq!(engine_cfg.depth_limit, 2);
        assert_eq!(engine_cfg.retry.backoff, Some(Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn test_run_crawl_without_seeds_is_a_startup_error() {
        let result = run_crawl(Config::default(), &[]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_config_seeds_are_marked_seen() {
        // A config seed and a discovered edge to the same target must not
        // crawl twice under the once policy; the marking happens before
        // the engine starts.
        let mut config = Config::default();
        config.seeds.push(SeedEntry {
            repo: "github.com/acme/app".to_string(),
        });
        let (_engine, ctx) = test_context(config);

        ctx.seen.first_visit("github.com/acme/app");
        assert!(!enqueue_crawl(
            &ctx,
            "github.com/acme/app".to_string(),
            None,
            1
        ));
    }
}
