use crate::config::types::{Config, GithubConfig, RegistryConfig, SchedulerConfig, SeedEntry};
use crate::repos::RepoRef;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scheduler_config(&config.scheduler)?;
    validate_github_config(&config.github)?;
    validate_registry_config(&config.registries)?;
    validate_seeds(&config.seeds)?;
    Ok(())
}

/// Validates scheduler configuration
fn validate_scheduler_config(config: &SchedulerConfig) -> Result<(), ConfigError> {
    if config.pool_size < 1 || config.pool_size > 100 {
        return Err(ConfigError::Validation(format!(
            "pool_size must be between 1 and 100, got {}",
            config.pool_size
        )));
    }

    if config.max_depth > 50 {
        return Err(ConfigError::Validation(format!(
            "max_depth must be <= 50, got {}",
            config.max_depth
        )));
    }

    if config.poll_interval_ms < 10 {
        return Err(ConfigError::Validation(format!(
            "poll_interval_ms must be >= 10ms, got {}ms",
            config.poll_interval_ms
        )));
    }

    if config.grace_period_ms < config.poll_interval_ms {
        return Err(ConfigError::Validation(format!(
            "grace_period_ms ({}ms) must be >= poll_interval_ms ({}ms)",
            config.grace_period_ms, config.poll_interval_ms
        )));
    }

    if config.max_immediate_retries > 1000 {
        return Err(ConfigError::Validation(format!(
            "max_immediate_retries must be <= 1000, got {}",
            config.max_immediate_retries
        )));
    }

    Ok(())
}

/// Validates GitHub configuration
fn validate_github_config(config: &GithubConfig) -> Result<(), ConfigError> {
    validate_base_url("github.api-base", &config.api_base)?;
    validate_base_url("github.raw-base", &config.raw_base)?;

    if let Some(token) = &config.auth_token {
        if token.trim().is_empty() {
            return Err(ConfigError::Validation(
                "github.auth-token must not be blank when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates registry endpoints
fn validate_registry_config(config: &RegistryConfig) -> Result<(), ConfigError> {
    validate_base_url("registries.npm-base", &config.npm_base)?;
    validate_base_url("registries.pypi-base", &config.pypi_base)?;
    validate_base_url("registries.libraries-io-base", &config.libraries_io_base)?;
    validate_base_url("registries.rubygems-base", &config.rubygems_base)?;
    Ok(())
}

/// Validates seed repository references
fn validate_seeds(seeds: &[SeedEntry]) -> Result<(), ConfigError> {
    for entry in seeds {
        let repo = RepoRef::parse(&entry.repo)
            .map_err(|_| ConfigError::InvalidSeed(entry.repo.clone()))?;
        if !repo.is_github() {
            return Err(ConfigError::Validation(format!(
                "seed '{}' is not on a supported code host",
                entry.repo
            )));
        }
    }
    Ok(())
}

/// Checks a base URL parses and carries an http(s) scheme
fn validate_base_url(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "{} must not end with '/', got '{}'",
            field, value
        )));
    }

    let url = Url::parse(value)
        .map_err(|e| ConfigError::Validation(format!("{} is not a valid URL: {}", field, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "{} must use http or https, got '{}'",
            field, value
        )));
    }

    Ok(())
}
