//! JSON report output
//!
//! The accumulated results are emitted as one pretty-printed JSON array
//! of report payloads, either to a file or to stdout.

use crate::scheduler::JobResult;
use crate::DepvineError;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Serializes the result payloads as a pretty JSON array
pub fn format_reports(results: &[JobResult]) -> crate::Result<String> {
    let payloads: Vec<&serde_json::Value> = results.iter().map(|r| &r.payload).collect();
    Ok(serde_json::to_string_pretty(&payloads)?)
}

/// Writes the JSON report to a file, or stdout when no path is given
pub fn write_reports(results: &[JobResult], path: Option<&Path>) -> crate::Result<()> {
    let body = format_reports(results)?;

    match path {
        Some(path) => {
            let mut file = File::create(path).map_err(|e| {
                DepvineError::Output(format!("could not create {}: {}", path.display(), e))
            })?;
            file.write_all(body.as_bytes())?;
            file.write_all(b"\n")?;
            tracing::info!("wrote {} reports to {}", results.len(), path.display());
        }
        None => {
            println!("{}", body);
        }
    }

    Ok(())
}
