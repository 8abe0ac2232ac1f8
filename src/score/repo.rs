//! Repository risk heuristic
//!
//! Pure computation over already-fetched metadata; no I/O happens here.
//! Notes are grouped by severity class and folded into a single numeric
//! score via configurable weights.

use crate::github::RepoInfo;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Weights applied when folding notes into a numeric score
#[derive(Debug, Clone)]
pub struct ScoringWeights {
    pub high_risk: i32,
    pub low_risk: i32,
    pub good: i32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            high_risk: 20,
            low_risk: 5,
            good: 2,
        }
    }
}

/// Risk notes for one repository, grouped by severity class
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskNotes {
    pub risk: Vec<String>,
    pub good: Vec<String>,
    pub info: Vec<String>,
}

impl RiskNotes {
    /// Folds the notes into a 0..=100 score, higher meaning healthier
    pub fn total_score(&self, weights: &ScoringWeights) -> i32 {
        let mut score = 100;
        for note in &self.risk {
            if note.starts_with("[HIGH]") {
                score -= weights.high_risk;
            } else {
                score -= weights.low_risk;
            }
        }
        score += self.good.len() as i32 * weights.good;
        score.clamp(0, 100)
    }
}

/// Evaluates one repository's metadata into risk notes
///
/// # Arguments
///
/// * `info` - Repository metadata from the API
/// * `contributor_count` - Contributors sampled from the first listing page
/// * `fork_count` - Forks sampled from the first listing page
/// * `now` - Evaluation time, passed in so tests are deterministic
pub fn evaluate(
    info: &RepoInfo,
    contributor_count: usize,
    fork_count: usize,
    now: DateTime<Utc>,
) -> RiskNotes {
    let mut notes = RiskNotes::default();

    if !info.owner.is_organization() {
        notes
            .info
            .push("Repository is not managed under an organisation".to_string());
    }

    if contributor_count < 3 {
        notes.risk.push(format!(
            "[LOW] Size of collaborator for the repository is {} which is less than 3",
            contributor_count
        ));
    }

    if let Some(pushed_at) = info.pushed_at {
        if now - pushed_at > Duration::days(365) {
            notes
                .risk
                .push("[HIGH] Repository has not been updated for a year".to_string());
        }
    }

    if let Some(created_at) = info.created_at {
        if now - created_at < Duration::days(120) {
            notes.risk.push(
                "[LOW] Repository is young and only been created for less than 120 days"
                    .to_string(),
            );
        }
    }

    let license_key = info
        .license
        .as_ref()
        .and_then(|license| license.key.as_deref())
        .unwrap_or("");
    if license_key.is_empty() {
        notes
            .risk
            .push("[LOW] Repository does not have a license attached to it".to_string());
    }

    if info.fork {
        let parent = info
            .parent
            .as_ref()
            .map(|p| p.full_name.as_str())
            .unwrap_or("an unknown repository");
        notes
            .risk
            .push(format!("[LOW] This repository was forked from {}", parent));
    }

    if fork_count > 10 {
        notes.good.push(format!(
            "[GOOD] Repository has been forked {} times",
            fork_count
        ));
    }

    if info.stargazers_count > 50 {
        notes.good.push(format!(
            "[GOOD] Repository has been starred {} times",
            info.stargazers_count
        ));
    }

    if info.watchers_count > 50 {
        notes.good.push(format!(
            "[GOOD] Repository is being watched by {} people",
            info.watchers_count
        ));
    }

    if info.has_wiki {
        notes.good.push("[GOOD] Repository has a wiki".to_string());
    }

    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{LicenseInfo, OwnerInfo, ParentInfo};

    fn base_info() -> RepoInfo {
        serde_json::from_str(
            r#"{
                "name": "app",
                "full_name": "acme/app",
                "owner": {"login": "acme", "type": "Organization"},
                "html_url": "https://github.com/acme/app",
                "has_wiki": false
            }"#,
        )
        .unwrap()
    }

    fn now() -> DateTime<Utc> {
        "2026-08-01T00:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_healthy_repository_has_no_risk_notes() {
        let mut info = base_info();
        info.pushed_at = Some("2026-07-20T00:00:00Z".parse().unwrap());
        info.created_at = Some("2020-01-01T00:00:00Z".parse().unwrap());
        info.license = Some(LicenseInfo {
            key: Some("mit".to_string()),
        });

        let notes = evaluate(&info, 12, 3, now());
        assert!(notes.risk.is_empty(), "unexpected risks: {:?}", notes.risk);
        assert!(notes.info.is_empty());
    }

    #[test]
    fn test_stale_repository_is_high_risk() {
        let mut info = base_info();
        info.pushed_at = Some("2024-01-01T00:00:00Z".parse().unwrap());
        info.license = Some(LicenseInfo {
            key: Some("mit".to_string()),
        });

        let notes = evaluate(&info, 10, 0, now());
        assert!(notes
            .risk
            .iter()
            .any(|n| n.starts_with("[HIGH]") && n.contains("not been updated")));
    }

    #[test]
    fn test_few_contributors_is_low_risk() {
        let mut info = base_info();
        info.license = Some(LicenseInfo {
            key: Some("mit".to_string()),
        });
        let notes = evaluate(&info, 1, 0, now());
        assert!(notes.risk.iter().any(|n| n.contains("less than 3")));
    }

    #[test]
    fn test_young_unlicensed_personal_fork_collects_notes() {
        let mut info = base_info();
        info.owner = OwnerInfo {
            login: "solo".to_string(),
            kind: "User".to_string(),
        };
        info.created_at = Some("2026-06-01T00:00:00Z".parse().unwrap());
        info.fork = true;
        info.parent = Some(ParentInfo {
            full_name: "acme/original".to_string(),
        });

        let notes = evaluate(&info, 5, 0, now());
        assert_eq!(notes.info.len(), 1);
        assert!(notes.risk.iter().any(|n| n.contains("young")));
        assert!(notes.risk.iter().any(|n| n.contains("license")));
        assert!(notes
            .risk
            .iter()
            .any(|n| n.contains("forked from acme/original")));
    }

    #[test]
    fn test_popular_repository_collects_good_notes() {
        let mut info = base_info();
        info.stargazers_count = 500;
        info.watchers_count = 120;
        info.has_wiki = true;
        info.license = Some(LicenseInfo {
            key: Some("apache-2.0".to_string()),
        });

        let notes = evaluate(&info, 40, 80, now());
        assert_eq!(notes.good.len(), 4);
    }

    #[test]
    fn test_total_score_folds_notes() {
        let weights = ScoringWeights::default();

        let healthy = RiskNotes::default();
        assert_eq!(healthy.total_score(&weights), 100);

        let risky = RiskNotes {
            risk: vec![
                "[HIGH] Repository has not been updated for a year".to_string(),
                "[LOW] Repository does not have a license attached to it".to_string(),
            ],
            good: vec!["[GOOD] Repository has a wiki".to_string()],
            info: vec![],
        };
        assert_eq!(risky.total_score(&weights), 100 - 20 - 5 + 2);
    }

    #[test]
    fn test_total_score_is_clamped() {
        let weights = ScoringWeights::default();
        let terrible = RiskNotes {
            risk: (0..10)
                .map(|i| format!("[HIGH] problem {}", i))
                .collect(),
            good: vec![],
            info: vec![],
        };
        assert_eq!(terrible.total_score(&weights), 0);
    }
}
