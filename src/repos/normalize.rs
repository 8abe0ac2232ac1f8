//! Repository URL normalization
//!
//! Dependency edges arrive in many spellings: `git+https://...git` from
//! the npm registry, bare `github.com/owner/name` module paths from
//! go.mod, scp-style `git@github.com:owner/name.git` remotes, full
//! `https://` URLs from RubyGems. Normalization reduces all of them to
//! the canonical `host/owner/name` form.

/// Normalizes a raw repository URL or module path
///
/// Returns the canonical `host/owner/name` form, or None when the input
/// does not name a host plus two path segments.
pub fn normalize_repo_url(raw: &str) -> Option<String> {
    let mut s = raw.trim();
    if s.is_empty() {
        return None;
    }

    s = s.strip_prefix("git+").unwrap_or(s);

    // scp-style remote: git@host:owner/name
    if let Some(rest) = s.strip_prefix("git@") {
        if let Some((host, path)) = rest.split_once(':') {
            return assemble(host, path);
        }
    }

    for scheme in ["https://", "http://", "git://", "ssh://"] {
        if let Some(rest) = s.strip_prefix(scheme) {
            s = rest;
            break;
        }
    }
    s = s.strip_prefix("git@").unwrap_or(s);

    let (host, path) = s.split_once('/')?;
    assemble(host, path)
}

fn assemble(host: &str, path: &str) -> Option<String> {
    let host = host.trim_start_matches("www.").to_lowercase();
    if host.is_empty() || !host.contains('.') {
        return None;
    }

    let mut segments = path.split('/').filter(|seg| !seg.is_empty());
    let owner = segments.next()?;
    let name = segments.next()?;
    let name = name.strip_suffix(".git").unwrap_or(name);
    if owner.is_empty() || name.is_empty() {
        return None;
    }

    Some(format!("{}/{}/{}", host, owner, name))
}
