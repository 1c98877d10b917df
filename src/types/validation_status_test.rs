//! Tests for `ValidationStatus`.

use super::ValidationStatus;

#[test]
fn display_pending() {
  assert_eq!(ValidationStatus::Pending.to_string(), "pending");
}

#[test]
fn display_success() {
  assert_eq!(ValidationStatus::Success.to_string(), "success");
}

#[test]
fn display_param_missing() {
  assert_eq!(ValidationStatus::ParamMissing.to_string(), "param_missing");
}

#[test]
fn display_tool_error() {
  assert_eq!(ValidationStatus::ToolError.to_string(), "tool_error");
}

#[test]
fn default_is_pending() {
  assert_eq!(ValidationStatus::default(), ValidationStatus::Pending);
}

#[test]
fn merge_keeps_last_failure() {
  let s = ValidationStatus::Success
    .merge(ValidationStatus::ParamMissing)
    .merge(ValidationStatus::Success)
    .merge(ValidationStatus::ToolError);
  assert_eq!(s, ValidationStatus::ToolError);
}

#[test]
fn merge_success_does_not_clear_failure() {
  let s = ValidationStatus::Success
    .merge(ValidationStatus::ParamMissing)
    .merge(ValidationStatus::Success);
  assert_eq!(s, ValidationStatus::ParamMissing);
}

#[test]
fn serializes_snake_case() {
  let json = serde_json::to_string(&ValidationStatus::ParamMissing).unwrap();
  assert_eq!(json, "\"param_missing\"");
}
