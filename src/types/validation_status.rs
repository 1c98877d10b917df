//! Validation status of the tool batch executed in a stage.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of a stage's tool batch; drives whether clarification is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
  #[default]
  Pending,
  Success,
  ParamMissing,
  ToolError,
}

impl ValidationStatus {
  /// Folds one call's status into a batch status. `Success` never overwrites an earlier failure.
  pub fn merge(self, next: ValidationStatus) -> ValidationStatus {
    match next {
      ValidationStatus::Success | ValidationStatus::Pending => self,
      other => other,
    }
  }
}

impl fmt::Display for ValidationStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ValidationStatus::Pending => write!(f, "pending"),
      ValidationStatus::Success => write!(f, "success"),
      ValidationStatus::ParamMissing => write!(f, "param_missing"),
      ValidationStatus::ToolError => write!(f, "tool_error"),
    }
  }
}
