//! Manifest parsers
//!
//! Each supported manifest format is parsed by a pure, stateless
//! function of file bytes to discovered dependency edges. Parsers never
//! touch the network; turning a package name into a repository URL is
//! the resolve module's job. Any parser can be swapped without
//! affecting the scheduler.

mod gem;
mod go_dep;
mod go_mod;
mod npm;
mod pip;

use serde::{Deserialize, Serialize};

/// Package ecosystem a named dependency belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Npm,
    PyPi,
    RubyGems,
}

impl Ecosystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::Npm => "npm",
            Ecosystem::PyPi => "pypi",
            Ecosystem::RubyGems => "rubygems",
        }
    }
}

/// One discovered dependency edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyRef {
    /// The manifest names a repository directly (URL or module path)
    Repo(String),

    /// The manifest names a package that must be resolved through its
    /// registry before it becomes a repository edge
    Package { ecosystem: Ecosystem, name: String },
}

/// A dependency the crawl could not follow cleanly, with risk notes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyProblem {
    pub name: String,
    pub url: String,
    pub risk_notes: Vec<String>,
}

/// Output of one parser invocation
#[derive(Debug, Clone, Default)]
pub struct ParseOutput {
    pub dependencies: Vec<DependencyRef>,
    pub problems: Vec<DependencyProblem>,
}

/// A manifest parser: file bytes in, discovered edges out
pub type ManifestParser = fn(&[u8]) -> ParseOutput;

/// Supported manifest files and their parsers, tried in order per
/// repository
pub const SUPPORTED: &[(&str, ManifestParser)] = &[
    ("Gopkg.lock", go_dep::parse),
    ("package.json", npm::parse),
    ("Gemfile", gem::parse),
    ("requirements.txt", pip::parse),
    ("go.mod", go_mod::parse),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_filenames_are_distinct() {
        let mut names: Vec<&str> = SUPPORTED.iter().map(|(name, _)| *name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), SUPPORTED.len());
    }

    #[test]
    fn test_parsers_tolerate_garbage_input() {
        for (name, parser) in SUPPORTED {
            let output = parser(b"\xff\xfe not a manifest at all {{{");
            assert!(
                output.dependencies.is_empty(),
                "{} parser invented dependencies from garbage",
                name
            );
        }
    }
}
