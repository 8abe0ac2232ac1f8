//! package.json parsing

use crate::manifests::{DependencyRef, Ecosystem, ParseOutput};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct PackageJson {
    #[serde(default)]
    dependencies: HashMap<String, String>,
}

/// Extracts runtime dependencies from a package.json file
///
/// Every entry becomes a named npm package to resolve through the
/// registry; version specifiers are ignored. Unparseable input yields
/// an empty output rather than an error.
pub fn parse(content: &[u8]) -> ParseOutput {
    let manifest: PackageJson = match serde_json::from_slice(content) {
        Ok(m) => m,
        Err(_) => {
            tracing::warn!("could not parse content of a package.json file");
            return ParseOutput::default();
        }
    };

    let mut names: Vec<String> = manifest.dependencies.into_keys().collect();
    names.sort();

    ParseOutput {
        dependencies: names
            .into_iter()
            .map(|name| DependencyRef::Package {
                ecosystem: Ecosystem::Npm,
                name,
            })
            .collect(),
        problems: Vec::new(),
    }
}
