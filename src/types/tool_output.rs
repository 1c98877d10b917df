//! Structured result returned by every tool handler.

use serde::{Deserialize, Serialize};

use super::ValidationStatus;

/// Phrases that mark a handler result as missing a required parameter.
pub const PARAM_MISSING_MARKERS: [&str; 5] = [
  "질문을 이해할 수 없습니다",
  "날짜 정보를 찾을 수 없습니다",
  "조건을 찾을 수 없습니다",
  "임계값을 찾을 수 없습니다",
  "파라미터를 추출할 수 없습니다",
];

/// Returns true if `text` contains any known parameter-missing marker.
pub fn contains_param_missing_marker(text: &str) -> bool {
  PARAM_MISSING_MARKERS.iter().any(|m| text.contains(m))
}

/// Status a handler reports alongside its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
  Ok,
  ParamMissing,
}

/// Text plus explicit status produced by a tool handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
  pub text: String,
  pub status: ToolStatus,
}

impl ToolOutput {
  pub fn ok(text: impl Into<String>) -> Self {
    Self {
      text: text.into(),
      status: ToolStatus::Ok,
    }
  }

  pub fn param_missing(text: impl Into<String>) -> Self {
    Self {
      text: text.into(),
      status: ToolStatus::ParamMissing,
    }
  }

  /// Validation status for this output. The explicit status wins; text from handlers
  /// reporting `Ok` is still scanned for marker phrases.
  pub fn validation_status(&self) -> ValidationStatus {
    match self.status {
      ToolStatus::ParamMissing => ValidationStatus::ParamMissing,
      ToolStatus::Ok if contains_param_missing_marker(&self.text) => ValidationStatus::ParamMissing,
      ToolStatus::Ok => ValidationStatus::Success,
    }
  }
}
