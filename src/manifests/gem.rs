//! Gemfile parsing

use crate::manifests::{DependencyRef, Ecosystem, ParseOutput};
use regex::Regex;
use std::sync::OnceLock;

static GEM_LINE: OnceLock<Regex> = OnceLock::new();

fn gem_line() -> &'static Regex {
    GEM_LINE.get_or_init(|| Regex::new(r#"gem ['"]([^'"]+)['"]"#).expect("hard-coded regex"))
}

/// Extracts gem names from a Gemfile
///
/// Every `gem 'name'` declaration becomes a named RubyGems package to
/// resolve through the registry.
pub fn parse(content: &[u8]) -> ParseOutput {
    let text = String::from_utf8_lossy(content);

    ParseOutput {
        dependencies: gem_line()
            .captures_iter(&text)
            .map(|caps| DependencyRef::Package {
                ecosystem: Ecosystem::RubyGems,
                name: caps[1].to_string(),
            })
            .collect(),
        problems: Vec::new(),
    }
}
