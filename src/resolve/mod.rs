//! Package-registry resolution
//!
//! Manifest parsers emit package names; this module turns a name into
//! the repository URL its registry points at. npm and RubyGems expose
//! JSON APIs; PyPI is handled by scraping the project page for a
//! repository link, with libraries.io as a second attempt. Packages
//! that cannot be traced to a repository are reported as dependency
//! problems with risk notes rather than errors.

mod npm;
mod pypi;
mod rubygems;

use crate::config::RegistryConfig;
use crate::manifests::{DependencyProblem, Ecosystem};
use reqwest::Client;

/// Outcome of resolving one named package
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Repository URLs the registry pointed at (usually 0 or 1)
    pub repo_urls: Vec<String>,

    /// Problems worth surfacing in the report
    pub problems: Vec<DependencyProblem>,
}

/// Resolves a named package through its ecosystem's registry
///
/// Network failures degrade to an empty resolution; a missing
/// repository reference is a problem record, not an error.
pub async fn resolve_package(
    http: &Client,
    registries: &RegistryConfig,
    ecosystem: Ecosystem,
    name: &str,
) -> Resolution {
    match ecosystem {
        Ecosystem::Npm => npm::resolve(http, &registries.npm_base, name).await,
        Ecosystem::PyPi => {
            pypi::resolve(http, &registries.pypi_base, &registries.libraries_io_base, name).await
        }
        Ecosystem::RubyGems => rubygems::resolve(http, &registries.rubygems_base, name).await,
    }
}
