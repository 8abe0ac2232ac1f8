//! Integration tests for the crawl engine
//!
//! These tests drive the engine with synthetic work functions — no
//! network, no domain logic — to pin down the scheduling contract:
//! nothing is lost, recursion is bounded, retries converge, and the
//! engine stops promptly once the system goes quiet.

use depvine::scheduler::{
    Engine, EngineConfig, Job, JobKind, JobPayload, JobResult, PublishHandle, RetryPolicy, WorkFn,
    WorkRegistry, WorkStatus,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn fast_config(pool_size: usize, depth_limit: u32) -> EngineConfig {
    EngineConfig {
        pool_size,
        depth_limit,
        poll_interval: Duration::from_millis(10),
        grace_period: Duration::from_millis(50),
        retry: RetryPolicy::default(),
    }
}

/// Registers the same handler for every kind so validation passes
fn registry_with(handler: WorkFn) -> WorkRegistry {
    let mut registry = WorkRegistry::new();
    for kind in JobKind::ALL {
        registry.register(*kind, handler.clone());
    }
    registry
}

fn publish_target(publish: &PublishHandle, target: &str) {
    publish.publish(JobResult {
        kind: JobKind::CrawlRepo,
        payload: serde_json::json!({ "target": target }),
    });
}

fn targets_of(results: &[JobResult]) -> Vec<String> {
    let mut targets: Vec<String> = results
        .iter()
        .map(|r| r.payload["target"].as_str().unwrap_or("").to_string())
        .collect();
    targets.sort();
    targets
}

#[tokio::test]
async fn test_no_loss_every_seed_yields_one_result() {
    let engine = Engine::new(fast_config(4, 5));
    let publish = engine.publisher();

    let handler: WorkFn = Arc::new(move |payload| {
        let publish = publish.clone();
        Box::pin(async move {
            if let JobPayload::RepoCrawl(p) = payload {
                publish_target(&publish, &p.target);
            }
            Ok(WorkStatus::Completed)
        })
    });

    let seeds: Vec<Job> = (0..10)
        .map(|i| Job::crawl_repo(format!("github.com/acme/app{}", i), None, 0))
        .collect();

    let results = engine.run(registry_with(handler), seeds).await.unwrap();
    assert_eq!(results.len(), 10);
}

#[tokio::test]
async fn test_bounded_recursion_terminates_an_infinite_fan_out() {
    // The work function always emits one child at depth + 1; only the
    // engine's depth gate keeps the crawl finite.
    let depth_limit = 3;
    let engine = Engine::new(fast_config(2, depth_limit));
    let submit = engine.submitter();
    let calls = Arc::new(AtomicU32::new(0));

    let handler: WorkFn = {
        let calls = calls.clone();
        Arc::new(move |payload| {
            let submit = submit.clone();
            let calls = calls.clone();
            Box::pin(async move {
                if let JobPayload::RepoCrawl(p) = payload {
                    calls.fetch_add(1, Ordering::SeqCst);
                    submit.submit(Job::crawl_repo(p.target.clone(), None, p.depth + 1));
                }
                Ok(WorkStatus::Completed)
            })
        })
    };

    let seeds = vec![Job::crawl_repo("github.com/acme/app".to_string(), None, 0)];
    let results = tokio::time::timeout(
        Duration::from_secs(5),
        engine.run(registry_with(handler), seeds),
    )
    .await
    .expect("run must terminate despite infinite fan-out")
    .unwrap();

    // Depths 0..depth_limit execute; the job at depth_limit is refused.
    assert_eq!(calls.load(Ordering::SeqCst), depth_limit);
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_discard_produces_no_results_and_no_retries() {
    let engine = Engine::new(fast_config(2, 5));
    let calls = Arc::new(AtomicU32::new(0));

    let handler: WorkFn = {
        let calls = calls.clone();
        Arc::new(move |_payload| {
            let calls = calls.clone();
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(WorkStatus::Discard)
            })
        })
    };

    let seeds: Vec<Job> = (0..3)
        .map(|i| Job::crawl_repo(format!("github.com/acme/app{}", i), None, 0))
        .collect();

    let results = tokio::time::timeout(
        Duration::from_secs(5),
        engine.run(registry_with(handler), seeds),
    )
    .await
    .expect("a run of discards must not hang")
    .unwrap();

    assert!(results.is_empty());
    // One invocation per seed, no retry of any of them
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_busy_retry_converges_with_exactly_one_result() {
    let engine = Engine::new(fast_config(1, 5));
    let publish = engine.publisher();
    let calls = Arc::new(AtomicU32::new(0));
    let k: u32 = 3;

    let handler: WorkFn = {
        let calls = calls.clone();
        Arc::new(move |_payload| {
            let publish = publish.clone();
            let calls = calls.clone();
            Box::pin(async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < k {
                    Ok(WorkStatus::RetryNow)
                } else {
                    publish_target(&publish, "github.com/acme/app");
                    Ok(WorkStatus::Completed)
                }
            })
        })
    };

    let seeds = vec![Job::crawl_repo("github.com/acme/app".to_string(), None, 0)];
    let results = engine.run(registry_with(handler), seeds).await.unwrap();

    // K retries then success: exactly K + 1 invocations, exactly 1 result
    assert_eq!(calls.load(Ordering::SeqCst), k + 1);
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn test_failing_job_does_not_abort_the_run() {
    let engine = Engine::new(fast_config(2, 5));
    let publish = engine.publisher();

    let handler: WorkFn = Arc::new(move |payload| {
        let publish = publish.clone();
        Box::pin(async move {
            if let JobPayload::RepoCrawl(p) = payload {
                if p.target.contains("poison") {
                    return Err(depvine::DepvineError::Output("synthetic failure".to_string()));
                }
                publish_target(&publish, &p.target);
            }
            Ok(WorkStatus::Completed)
        })
    });

    let seeds = vec![
        Job::crawl_repo("github.com/acme/poison".to_string(), None, 0),
        Job::crawl_repo("github.com/acme/good".to_string(), None, 0),
    ];

    let results = engine.run(registry_with(handler), seeds).await.unwrap();
    assert_eq!(targets_of(&results), vec!["github.com/acme/good"]);
}

#[tokio::test]
async fn test_quiescence_declared_promptly_after_idleness() {
    let engine = Engine::new(EngineConfig {
        pool_size: 2,
        depth_limit: 5,
        poll_interval: Duration::from_millis(10),
        grace_period: Duration::from_millis(100),
        retry: RetryPolicy::default(),
    });

    let handler: WorkFn = Arc::new(|_| Box::pin(async { Ok(WorkStatus::Completed) }));
    let seeds = vec![Job::crawl_repo("github.com/acme/app".to_string(), None, 0)];

    let start = Instant::now();
    engine.run(registry_with(handler), seeds).await.unwrap();
    let elapsed = start.elapsed();

    // The grace window must elapse before completion is declared, and
    // the run must return within a handful of polls past it.
    assert!(elapsed >= Duration::from_millis(100), "returned before the grace window: {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(2), "took far too long to notice idleness: {:?}", elapsed);
}

#[tokio::test]
async fn test_three_level_chain_yields_three_results() {
    // Seed "A" whose work function emits one child per job with
    // depth < 2 plus a result carrying the target name; expect exactly
    // A, A-child, A-child-child in some order with nothing pending.
    let engine = Engine::new(fast_config(3, 10));
    let submit = engine.submitter();
    let publish = engine.publisher();

    let handler: WorkFn = Arc::new(move |payload| {
        let submit = submit.clone();
        let publish = publish.clone();
        Box::pin(async move {
            if let JobPayload::RepoCrawl(p) = payload {
                publish_target(&publish, &p.target);
                if p.depth < 2 {
                    submit.submit(Job::crawl_repo(
                        format!("{}-child", p.target),
                        None,
                        p.depth + 1,
                    ));
                }
            }
            Ok(WorkStatus::Completed)
        })
    });

    let seeds = vec![Job::crawl_repo("A".to_string(), None, 0)];
    let results = engine.run(registry_with(handler), seeds).await.unwrap();

    assert_eq!(
        targets_of(&results),
        vec!["A".to_string(), "A-child".to_string(), "A-child-child".to_string()]
    );
}

#[tokio::test]
async fn test_wide_fan_out_is_fully_explored() {
    // Every job emits two children until depth 3: 1 + 2 + 4 + 8 jobs,
    // all of which must execute exactly once.
    let engine = Engine::new(fast_config(4, 10));
    let submit = engine.submitter();
    let publish = engine.publisher();

    let handler: WorkFn = Arc::new(move |payload| {
        let submit = submit.clone();
        let publish = publish.clone();
        Box::pin(async move {
            if let JobPayload::RepoCrawl(p) = payload {
                publish_target(&publish, &p.target);
                if p.depth < 3 {
                    for side in ["l", "r"] {
                        submit.submit(Job::crawl_repo(
                            format!("{}{}", p.target, side),
                            None,
                            p.depth + 1,
                        ));
                    }
                }
            }
            Ok(WorkStatus::Completed)
        })
    });

    let seeds = vec![Job::crawl_repo("n".to_string(), None, 0)];
    let results = engine.run(registry_with(handler), seeds).await.unwrap();

    let targets = targets_of(&results);
    assert_eq!(targets.len(), 15);
    // Spot-check the deepest layer exists and nothing was duplicated
    assert!(targets.contains(&"nlll".to_string()));
    let mut deduped = targets.clone();
    deduped.dedup();
    assert_eq!(deduped.len(), 15);
}

#[tokio::test]
async fn test_slow_jobs_hold_off_quiescence() {
    // A job sleeping well past the grace window must still get its
    // child executed: in-flight work blocks the idle declaration.
    let engine = Engine::new(EngineConfig {
        pool_size: 2,
        depth_limit: 5,
        poll_interval: Duration::from_millis(10),
        grace_period: Duration::from_millis(40),
        retry: RetryPolicy::default(),
    });
    let submit = engine.submitter();
    let publish = engine.publisher();

    let handler: WorkFn = Arc::new(move |payload| {
        let submit = submit.clone();
        let publish = publish.clone();
        Box::pin(async move {
            if let JobPayload::RepoCrawl(p) = payload {
                if p.depth == 0 {
                    // Longer than the grace window: the queue is empty
                    // the whole time, but the crawl is not done.
                    tokio::time::sleep(Duration::from_millis(150)).await;
                    submit.submit(Job::crawl_repo(format!("{}-late", p.target), None, 1));
                }
                publish_target(&publish, &p.target);
            }
            Ok(WorkStatus::Completed)
        })
    });

    let seeds = vec![Job::crawl_repo("slow".to_string(), None, 0)];
    let results = engine.run(registry_with(handler), seeds).await.unwrap();

    assert_eq!(
        targets_of(&results),
        vec!["slow".to_string(), "slow-late".to_string()]
    );
}

#[tokio::test]
async fn test_seed_list_jobs_mix_with_crawl_jobs() {
    // Kinds dispatch independently: a seed-list job fans out crawl jobs
    // through the same queue.
    let engine = Engine::new(fast_config(2, 5));
    let submit = engine.submitter();
    let publish = engine.publisher();

    let mut registry = WorkRegistry::new();
    registry.register(
        JobKind::SeedList,
        Arc::new(move |payload| {
            let submit = submit.clone();
            Box::pin(async move {
                if let JobPayload::SeedFile(_) = payload {
                    for i in 0..3 {
                        submit.submit(Job::crawl_repo(format!("github.com/acme/app{}", i), None, 0));
                    }
                }
                Ok(WorkStatus::Completed)
            })
        }),
    );
    registry.register(
        JobKind::CrawlRepo,
        Arc::new(move |payload| {
            let publish = publish.clone();
            Box::pin(async move {
                if let JobPayload::RepoCrawl(p) = payload {
                    publish_target(&publish, &p.target);
                }
                Ok(WorkStatus::Completed)
            })
        }),
    );

    let seeds = vec![Job::seed_file("unused-by-handler.txt".to_string())];
    let results = engine.run(registry, seeds).await.unwrap();
    assert_eq!(results.len(), 3);
}
