//! go.mod parsing

use crate::manifests::{DependencyRef, ParseOutput};
use regex::Regex;
use std::sync::OnceLock;

static REQUIRE_LINE: OnceLock<Regex> = OnceLock::new();

fn require_line() -> &'static Regex {
    // Matches tab-indented require entries like
    // `\tgithub.com/beorn7/perks v1.0.1`
    REQUIRE_LINE
        .get_or_init(|| Regex::new(r"\t([^\s]+/[^\s]+/[^\s]+)").expect("hard-coded regex"))
}

/// Extracts module paths from a go.mod file
///
/// Go module paths double as repository paths, so each entry is a
/// direct repository edge; no registry resolution is needed.
pub fn parse(content: &[u8]) -> ParseOutput {
    let text = String::from_utf8_lossy(content);

    ParseOutput {
        dependencies: require_line()
            .captures_iter(&text)
            .map(|caps| DependencyRef::Repo(caps[1].to_string()))
            .collect(),
        problems: Vec::new(),
    }
}
