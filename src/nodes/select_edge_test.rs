//! Tests for `select_edge`.

use chrono::Utc;

use super::select_edge::{MAX_CLARIFICATION_RETRIES, select_edge};
use crate::types::{ExecutionResult, RunState, Stage, ToolCall, ValidationStatus};

fn state_with(calls: &[(&str, &str)]) -> RunState {
  let mut state = RunState::new("2025-11-06 거래량 상위 5개");
  state.set_proposed_calls(calls.iter().map(|(n, a)| ToolCall::new(*n, *a)).collect());
  state
}

fn complete(state: &mut RunState, sql: bool) {
  for call in state.take_pending(sql) {
    let result = ExecutionResult {
      tool_name: call.name.clone(),
      args: call.args.clone(),
      outcome_text: format!("{} 결과: ok", call.name),
      status: ValidationStatus::Success,
      duration_secs: 0.0,
      timestamp: Utc::now(),
    };
    state.record_result(call, result);
  }
}

#[test]
fn linear_prefix() {
  let state = state_with(&[]);
  assert_eq!(select_edge(Stage::Propose, &state), Some(Stage::Parse));
  assert_eq!(select_edge(Stage::Parse, &state), Some(Stage::Dispatch));
  assert_eq!(select_edge(Stage::Filter, &state), Some(Stage::Generate));
}

#[test]
fn dispatch_without_calls_generates() {
  let state = state_with(&[]);
  assert_eq!(select_edge(Stage::Dispatch, &state), Some(Stage::Generate));
}

#[test]
fn dispatch_runs_ordinary_calls_before_sql() {
  let mixed = state_with(&[("text2sql", "시장 평균"), ("get_stock_price", "삼성전자")]);
  assert_eq!(select_edge(Stage::Dispatch, &mixed), Some(Stage::ExecuteStructured));

  let sql_only = state_with(&[("text2sql", "시장 평균")]);
  assert_eq!(select_edge(Stage::Dispatch, &sql_only), Some(Stage::ExecuteSql));

  let ordinary = state_with(&[("search_volume", "거래량 상위")]);
  assert_eq!(select_edge(Stage::Dispatch, &ordinary), Some(Stage::ExecuteStructured));
}

#[test]
fn execute_stages_go_to_decision() {
  let state = state_with(&[]);
  assert_eq!(select_edge(Stage::ExecuteStructured, &state), Some(Stage::DecidePostExecute));
  assert_eq!(select_edge(Stage::ExecuteSql, &state), Some(Stage::DecidePostExecute));
}

#[test]
fn remaining_sql_runs_after_structured_batch() {
  let mut state = state_with(&[("get_stock_price", "삼성전자"), ("text2sql", "시장 평균")]);
  complete(&mut state, false);
  state.validation_status = ValidationStatus::Success;
  assert_eq!(select_edge(Stage::DecidePostExecute, &state), Some(Stage::ExecuteSql));

  complete(&mut state, true);
  assert_eq!(select_edge(Stage::DecidePostExecute, &state), Some(Stage::FilterDecide));
}

#[test]
fn tool_error_does_not_change_routing() {
  let mut state = state_with(&[("get_stock_price", "삼성전자")]);
  complete(&mut state, false);
  state.validation_status = ValidationStatus::ToolError;
  assert_eq!(select_edge(Stage::DecidePostExecute, &state), Some(Stage::FilterDecide));
}

#[test]
fn param_missing_clarifies_only_below_retry_limit() {
  for retry in 0..MAX_CLARIFICATION_RETRIES {
    let mut state = state_with(&[("get_rsi_signals", "RSI 과매수"), ("text2sql", "평균")]);
    state.retry_count = retry;
    complete(&mut state, false);
    state.validation_status = ValidationStatus::ParamMissing;
    assert_eq!(
      select_edge(Stage::DecidePostExecute, &state),
      Some(Stage::Clarify),
      "retry_count {retry}"
    );
  }

  let mut state =
    state_with(&[("get_rsi_signals", "RSI 과매수"), ("text2sql", "평균")]).with_retry_count(2);
  complete(&mut state, false);
  state.validation_status = ValidationStatus::ParamMissing;
  assert_eq!(select_edge(Stage::DecidePostExecute, &state), Some(Stage::ExecuteSql));
  complete(&mut state, true);
  assert_eq!(select_edge(Stage::DecidePostExecute, &state), Some(Stage::FilterDecide));
}

#[test]
fn filter_decision_uses_executed_tools() {
  let mut listing = state_with(&[("get_stock_price", "삼성전자"), ("search_volume", "상위")]);
  complete(&mut listing, false);
  assert_eq!(select_edge(Stage::FilterDecide, &listing), Some(Stage::Filter));

  let mut single = state_with(&[("get_stock_price", "삼성전자"), ("get_market_index", "KOSPI")]);
  complete(&mut single, false);
  assert_eq!(select_edge(Stage::FilterDecide, &single), Some(Stage::Generate));

  let mut sql = state_with(&[("text2sql", "평균")]);
  complete(&mut sql, true);
  assert_eq!(select_edge(Stage::FilterDecide, &sql), Some(Stage::Filter));

  let mut unknown = state_with(&[("get_weather", "서울")]);
  complete(&mut unknown, false);
  assert_eq!(select_edge(Stage::FilterDecide, &unknown), Some(Stage::Generate));
}

#[test]
fn terminal_stages_end_the_run() {
  let state = state_with(&[]);
  assert_eq!(select_edge(Stage::Clarify, &state), None);
  assert_eq!(select_edge(Stage::Generate, &state), None);
}
