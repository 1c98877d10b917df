//! Record of one executed tool call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ValidationStatus;

/// Outcome of a single executed call. Appended to the run state, never overwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
  pub tool_name: String,
  pub args: String,
  /// Result slot text as it appears in the concatenated results.
  pub outcome_text: String,
  pub status: ValidationStatus,
  /// Wall-clock latency in seconds.
  pub duration_secs: f64,
  pub timestamp: DateTime<Utc>,
}
