//! Tests for `ToolOutput` and marker classification.

use super::{
  PARAM_MISSING_MARKERS, ToolOutput, ToolStatus, ValidationStatus, contains_param_missing_marker,
};

#[test]
fn ok_output_is_success() {
  let o = ToolOutput::ok("삼성전자의 2025-11-06 가격 정보");
  assert_eq!(o.status, ToolStatus::Ok);
  assert_eq!(o.validation_status(), ValidationStatus::Success);
}

#[test]
fn explicit_param_missing_wins() {
  let o = ToolOutput::param_missing("date please");
  assert_eq!(o.validation_status(), ValidationStatus::ParamMissing);
}

#[test]
fn ok_output_with_marker_is_param_missing() {
  let o = ToolOutput::ok("요청하신 날짜 정보를 찾을 수 없습니다.");
  assert_eq!(o.validation_status(), ValidationStatus::ParamMissing);
}

#[test]
fn every_marker_is_detected() {
  for m in PARAM_MISSING_MARKERS {
    assert!(contains_param_missing_marker(&format!("앞 {} 뒤", m)), "{m}");
  }
}

#[test]
fn unrelated_not_found_text_is_not_a_marker() {
  assert!(!contains_param_missing_marker(
    "005930 종목의 2025-11-06 가격 정보를 찾을 수 없습니다."
  ));
}
