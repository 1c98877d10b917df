//! Run report save/load (JSON).

use std::path::Path;

use tracing::instrument;

use crate::report::RunReport;

/// Default filename for a report under a run directory.
pub const RUN_REPORT_FILENAME: &str = "run_report.json";

/// Writes `report` to `path` as pretty JSON, creating parent directories.
#[instrument(level = "trace", skip(path, report))]
pub fn write_run_report(path: &Path, report: &RunReport) -> Result<(), std::io::Error> {
  let json = serde_json::to_string_pretty(report)
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(path, json)
}

/// Loads a report from `path`. Returns error if file is missing or invalid JSON.
#[instrument(level = "trace", skip(path))]
pub fn load_run_report(path: &Path) -> Result<RunReport, std::io::Error> {
  let bytes = std::fs::read(path)?;
  serde_json::from_slice(&bytes)
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}
