//! requirements.txt parsing

use crate::manifests::{DependencyRef, Ecosystem, ParseOutput};
use regex::Regex;
use std::sync::OnceLock;

static GIT_REQUIREMENT: OnceLock<Regex> = OnceLock::new();
static NAMED_REQUIREMENT: OnceLock<Regex> = OnceLock::new();

fn git_requirement() -> &'static Regex {
    GIT_REQUIREMENT.get_or_init(|| Regex::new(r"git\+(.*?)(?:\.git)?$").expect("hard-coded regex"))
}

fn named_requirement() -> &'static Regex {
    NAMED_REQUIREMENT.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9][A-Za-z0-9._-]*)").expect("hard-coded regex")
    })
}

/// Extracts dependencies from a requirements.txt file
///
/// `git+...` requirements become direct repository edges; plain
/// requirement lines become named PyPI packages to resolve. Comment
/// lines, pip options, and blank lines are skipped.
pub fn parse(content: &[u8]) -> ParseOutput {
    let text = String::from_utf8_lossy(content);
    let mut output = ParseOutput::default();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
            continue;
        }

        if line.contains("git+") {
            if let Some(caps) = git_requirement().captures(line) {
                output
                    .dependencies
                    .push(DependencyRef::Repo(caps[1].to_string()));
            }
            continue;
        }

        if let Some(caps) = named_requirement().captures(line) {
            output.dependencies.push(DependencyRef::Package {
                ecosystem: Ecosystem::PyPi,
                name: caps[1].to_string(),
            });
        }
    }

    output
}
