use serde::Deserialize;

/// Main configuration structure for Depvine
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scheduler: SchedulerConfig,
    pub github: GithubConfig,
    pub registries: RegistryConfig,
    pub output: OutputConfig,
    pub seeds: Vec<SeedEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            github: GithubConfig::default(),
            registries: RegistryConfig::default(),
            output: OutputConfig::default(),
            seeds: Vec::new(),
        }
    }
}

/// How revisits of an already-scheduled target are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevisitPolicy {
    /// First discoverer wins; later edges to the same target are recorded
    /// but the target is not crawled again
    Once,

    /// Every discovery path schedules its own crawl, as many times as
    /// the target is reached
    Always,
}

/// Scheduler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Number of concurrent workers
    #[serde(rename = "pool-size")]
    pub pool_size: usize,

    /// Maximum discovery depth from a seed repository
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Quiescence poll interval (milliseconds)
    #[serde(rename = "poll-interval-ms")]
    pub poll_interval_ms: u64,

    /// How long the system must stay idle before the crawl is declared
    /// complete (milliseconds)
    #[serde(rename = "grace-period-ms")]
    pub grace_period_ms: u64,

    /// Maximum immediate in-place retries per job
    #[serde(rename = "max-immediate-retries")]
    pub max_immediate_retries: u32,

    /// Delay between immediate retries (milliseconds, 0 = none)
    #[serde(rename = "retry-backoff-ms")]
    pub retry_backoff_ms: u64,

    /// Whether a target reached via two discovery paths is crawled twice
    #[serde(rename = "revisit-policy")]
    pub revisit_policy: RevisitPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            pool_size: 5,
            max_depth: 5,
            poll_interval_ms: 250,
            grace_period_ms: 1000,
            max_immediate_retries: 5,
            retry_backoff_ms: 0,
            revisit_policy: RevisitPolicy::Once,
        }
    }
}

/// GitHub API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    /// REST API base URL
    #[serde(rename = "api-base")]
    pub api_base: String,

    /// Raw file host base URL
    #[serde(rename = "raw-base")]
    pub raw_base: String,

    /// Personal access token; unauthenticated requests are heavily
    /// rate limited
    #[serde(rename = "auth-token")]
    pub auth_token: Option<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            raw_base: "https://raw.githubusercontent.com".to_string(),
            auth_token: None,
        }
    }
}

/// Package registry endpoints, overridable for testing
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    #[serde(rename = "npm-base")]
    pub npm_base: String,

    #[serde(rename = "pypi-base")]
    pub pypi_base: String,

    #[serde(rename = "libraries-io-base")]
    pub libraries_io_base: String,

    #[serde(rename = "rubygems-base")]
    pub rubygems_base: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            npm_base: "https://registry.npmjs.org".to_string(),
            pypi_base: "https://pypi.org/project".to_string(),
            libraries_io_base: "https://libraries.io/api/pypi".to_string(),
            rubygems_base: "https://rubygems.org/api/v1/gems".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfig {
    /// Path for the JSON report; stdout when unset
    #[serde(rename = "report-path")]
    pub report_path: Option<String>,

    /// Path for the markdown summary; skipped when unset
    #[serde(rename = "summary-path")]
    pub summary_path: Option<String>,

    /// Path for the SQLite graph ledger; persistence is skipped when unset
    #[serde(rename = "database-path")]
    pub database_path: Option<String>,
}

/// A seed repository entry
#[derive(Debug, Clone, Deserialize)]
pub struct SeedEntry {
    /// Repository reference, e.g. "github.com/owner/name"
    pub repo: String,
}
