//! Depvine main entry point
//!
//! This is the command-line interface for the Depvine dependency-risk
//! crawler.

use anyhow::bail;
use chrono::Utc;
use clap::Parser;
use depvine::config::{load_config_with_hash, validate, Config, SeedEntry};
use depvine::output::{generate_markdown_summary, summarize, write_reports};
use depvine::storage::{record_run, SqliteStorage, Storage};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Depvine: a recursive dependency-risk crawler
///
/// Depvine crawls the dependency graph of source-code repositories
/// outward from one or more seeds, scores each repository it reaches,
/// and emits a JSON report of the findings.
#[derive(Parser, Debug)]
#[command(name = "depvine")]
#[command(version = "0.3.0")]
#[command(about = "A recursive dependency-risk crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Repository to seed, e.g. github.com/owner/name (repeatable)
    #[arg(short, long)]
    repo: Vec<String>,

    /// File containing repository URLs separated by newlines (repeatable)
    #[arg(short, long)]
    file: Vec<PathBuf>,

    /// How deep to crawl the dependency graph (overrides config)
    #[arg(short, long)]
    depth: Option<u32>,

    /// Worker pool size (overrides config)
    #[arg(long)]
    pool_size: Option<usize>,

    /// Write the JSON report to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the graph ledger and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config_with_hash(path)?
        }
        None => (Config::default(), depvine::config::hash_str("builtin-defaults")),
    };

    apply_overrides(&mut config, &cli);
    validate(&config)?;

    let seed_files: Vec<String> = cli
        .file
        .iter()
        .map(|p| p.display().to_string())
        .collect();

    if cli.dry_run {
        handle_dry_run(&config, &seed_files);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config, config_hash, seed_files).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("depvine=info,warn"),
            1 => EnvFilter::new("depvine=debug,info"),
            2 => EnvFilter::new("depvine=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Folds CLI flags and environment into the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(depth) = cli.depth {
        config.scheduler.max_depth = depth;
    }
    if let Some(pool_size) = cli.pool_size {
        config.scheduler.pool_size = pool_size;
    }
    if let Some(output) = &cli.output {
        config.output.report_path = Some(output.display().to_string());
    }
    for repo in &cli.repo {
        config.seeds.push(SeedEntry { repo: repo.clone() });
    }
    if config.github.auth_token.is_none() {
        if let Ok(token) = std::env::var("GITHUB_AUTH_TOKEN") {
            if !token.is_empty() {
                config.github.auth_token = Some(token);
            }
        }
    }
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config, seed_files: &[String]) {
    println!("=== Depvine Dry Run ===\n");

    println!("Scheduler Configuration:");
    println!("  Max depth: {}", config.scheduler.max_depth);
    println!("  Pool size: {}", config.scheduler.pool_size);
    println!("  Poll interval: {}ms", config.scheduler.poll_interval_ms);
    println!("  Grace period: {}ms", config.scheduler.grace_period_ms);
    println!(
        "  Max immediate retries: {}",
        config.scheduler.max_immediate_retries
    );
    println!("  Revisit policy: {:?}", config.scheduler.revisit_policy);

    println!("\nGitHub:");
    println!("  API base: {}", config.github.api_base);
    println!("  Raw base: {}", config.github.raw_base);
    println!(
        "  Auth token: {}",
        if config.github.auth_token.is_some() {
            "configured"
        } else {
            "none (heavily rate limited)"
        }
    );

    println!("\nSeed Repositories ({}):", config.seeds.len());
    for entry in &config.seeds {
        println!("  - {}", entry.repo);
    }

    println!("\nSeed Files ({}):", seed_files.len());
    for path in seed_files {
        println!("  - {}", path);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the graph ledger
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let Some(database_path) = &config.output.database_path else {
        bail!("--stats requires output.database-path to be configured");
    };

    println!("Database: {}\n", database_path);

    let storage = SqliteStorage::new(Path::new(database_path))?;
    let stats = storage.stats()?;

    println!("Runs:      {}", stats.runs);
    println!("Repos:     {}", stats.repos);
    println!("Edges:     {}", stats.edges);
    println!("Reports:   {}", stats.reports);
    if let Some(average) = stats.average_score {
        println!("Avg score: {:.1}", average);
    }

    if let Some(run) = storage.latest_run()? {
        println!(
            "\nLatest run {} started {} ({})",
            run.id,
            run.started_at,
            run.status.as_str()
        );
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    config_hash: String,
    seed_files: Vec<String>,
) -> anyhow::Result<()> {
    if config.seeds.is_empty() && seed_files.is_empty() {
        bail!("You need to run this tool against at least one repository (--repo or --file)");
    }
    for path in &seed_files {
        if !Path::new(path).exists() {
            bail!("seed file '{}' does not exist", path);
        }
    }

    tracing::info!(
        "Seeds: {} repositories, {} files; depth limit {}",
        config.seeds.len(),
        seed_files.len(),
        config.scheduler.max_depth
    );

    let output = config.output.clone();
    let started_at = Utc::now();
    let results = depvine::jobs::run_crawl(config, &seed_files).await?;
    let finished_at = Utc::now();

    let report_path = output.report_path.as_ref().map(PathBuf::from);
    write_reports(&results, report_path.as_deref())?;

    let summary = summarize(&results, started_at, finished_at);

    if let Some(summary_path) = &output.summary_path {
        generate_markdown_summary(&summary, Path::new(summary_path))?;
        tracing::info!("Summary written to {}", summary_path);
    }

    if let Some(database_path) = &output.database_path {
        let mut storage = SqliteStorage::new(Path::new(database_path))?;
        let run_id = record_run(&mut storage, &config_hash, &summary.reports)?;
        tracing::info!("Recorded run {} in {}", run_id, database_path);
    }

    tracing::info!(
        "Crawl completed: {} repositories scored in {} seconds",
        summary.reports.len(),
        (finished_at - started_at).num_seconds()
    );

    Ok(())
}
