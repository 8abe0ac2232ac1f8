//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a crawl:
//! run information, overall statistics, and a per-repository risk
//! breakdown ordered worst-first.

use crate::output::CrawlSummary;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Generates a markdown summary file from a crawl summary
pub fn generate_markdown_summary(summary: &CrawlSummary, output_path: &Path) -> crate::Result<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl summary as markdown
pub fn format_markdown_summary(summary: &CrawlSummary) -> String {
    let mut md = String::new();

    md.push_str("# Depvine Crawl Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", summary.started_at));
    md.push_str(&format!("- **Finished**: {}\n", summary.finished_at));
    md.push_str(&format!(
        "- **Duration**: {} seconds\n\n",
        (summary.finished_at - summary.started_at).num_seconds()
    ));

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!(
        "- **Repositories Scored**: {}\n",
        summary.reports.len()
    ));
    md.push_str(&format!(
        "- **Dependency Edges**: {}\n",
        summary.total_edges()
    ));
    md.push_str(&format!(
        "- **Dependency Problems**: {}\n",
        summary.total_problems()
    ));
    md.push_str(&format!(
        "- **High-Risk Findings**: {}\n",
        summary.high_risk_findings()
    ));
    if let Some(average) = summary.average_score() {
        md.push_str(&format!("- **Average Score**: {:.1}\n", average));
    }
    md.push('\n');

    md.push_str("## Repositories\n\n");
    let mut reports: Vec<_> = summary.reports.iter().collect();
    reports.sort_by_key(|r| r.score);
    for report in reports {
        md.push_str(&format!(
            "### {} (score {})\n\n",
            report.target, report.score
        ));
        md.push_str(&format!("- **Depth**: {}\n", report.depth));
        md.push_str(&format!(
            "- **Dependencies**: {}\n",
            report.dependencies.len()
        ));

        for note in &report.risk_notes.risk {
            md.push_str(&format!("- RISK: {}\n", note));
        }
        for note in &report.risk_notes.good {
            md.push_str(&format!("- GOOD: {}\n", note));
        }
        for note in &report.risk_notes.info {
            md.push_str(&format!("- INFO: {}\n", note));
        }
        for problem in &report.dependency_problems {
            for note in &problem.risk_notes {
                md.push_str(&format!("- DEP {}: {}\n", problem.name, note));
            }
        }
        md.push('\n');
    }

    md
}
