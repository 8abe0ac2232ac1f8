//! Gopkg.lock parsing (the pre-modules dep tool)

use crate::manifests::{DependencyRef, ParseOutput};
use regex::Regex;
use std::sync::OnceLock;

static NAME_LINE: OnceLock<Regex> = OnceLock::new();

fn name_line() -> &'static Regex {
    // Matches entries like `name = "github.com/beorn7/perks"`
    NAME_LINE.get_or_init(|| {
        Regex::new(r#"name = "([^"]+/[^"]+/[^"]+)""#).expect("hard-coded regex")
    })
}

/// Extracts project paths from a Gopkg.lock file
pub fn parse(content: &[u8]) -> ParseOutput {
    let text = String::from_utf8_lossy(content);

    ParseOutput {
        dependencies: name_line()
            .captures_iter(&text)
            .map(|caps| DependencyRef::Repo(caps[1].to_string()))
            .collect(),
        problems: Vec::new(),
    }
}
