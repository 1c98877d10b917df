//! Tests for `RunState`.

use chrono::Utc;

use super::{ExecutionResult, Message, RunState, Stage, ToolCall, ValidationStatus};

fn result(name: &str, text: &str) -> ExecutionResult {
  ExecutionResult {
    tool_name: name.to_string(),
    args: String::new(),
    outcome_text: text.to_string(),
    status: ValidationStatus::Success,
    duration_secs: 0.0,
    timestamp: Utc::now(),
  }
}

#[test]
fn new_state_is_pending_and_empty() {
  let s = RunState::new("삼성전자 주가");
  assert_eq!(s.query(), "삼성전자 주가");
  assert_eq!(s.validation_status, ValidationStatus::Pending);
  assert_eq!(s.retry_count, 0);
  assert!(!s.clarification_needed);
  assert!(s.final_answer.is_none());
  assert!(s.conversation.is_empty());
}

#[test]
fn with_retry_count_seeds_counter() {
  assert_eq!(RunState::new("q").with_retry_count(2).retry_count, 2);
}

#[test]
fn last_assistant_reply_skips_user_messages() {
  let mut s = RunState::new("q");
  s.conversation.push(Message::user("q"));
  s.conversation.push(Message::assistant("first"));
  s.conversation.push(Message::assistant("second"));
  s.conversation.push(Message::user("again"));
  assert_eq!(s.last_assistant_reply(), Some("second"));
}

#[test]
fn take_pending_partitions_by_path_preserving_order() {
  let mut s = RunState::new("q");
  s.set_proposed_calls(vec![
    ToolCall::new("text2sql", "avg"),
    ToolCall::new("get_stock_price", "a"),
    ToolCall::new("search_volume", "b"),
  ]);
  assert!(s.has_pending_sql());
  assert!(s.has_pending_ordinary());
  let ordinary = s.take_pending(false);
  assert_eq!(
    ordinary.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
    vec!["get_stock_price", "search_volume"]
  );
  assert!(s.has_pending_sql());
  assert!(!s.has_pending_ordinary());
  let sql = s.take_pending(true);
  assert_eq!(sql.len(), 1);
  assert!(s.pending.is_empty());
}

#[test]
fn record_result_advances_cursor_and_concatenates_in_order() {
  let mut s = RunState::new("q");
  s.record_result(ToolCall::new("a", ""), result("a", "a 결과: 1"));
  s.record_result(ToolCall::new("b", ""), result("b", "b 결과: 2"));
  assert_eq!(s.cursor, 2);
  assert_eq!(s.concatenated_results(), "a 결과: 1\n\nb 결과: 2");
  assert_eq!(s.executed_tool_names().collect::<Vec<_>>(), vec!["a", "b"]);
}

#[test]
fn trace_appends_trace_and_snapshot() {
  let mut s = RunState::new("q");
  s.trace(Stage::Propose, "start");
  s.trace(Stage::Parse, "done");
  assert_eq!(s.node_traces.len(), 2);
  assert_eq!(s.node_traces[1].step, 2);
  assert_eq!(s.node_traces[1].node_name, "parse");
  assert_eq!(s.state_snapshots.len(), 2);
  assert_eq!(s.state_snapshots[0].query, "q");
}

#[test]
fn trace_and_log_are_noops_without_detailed_logging() {
  let mut s = RunState::new("q");
  s.detailed_logging = false;
  s.trace(Stage::Propose, "start");
  s.log("msg", serde_json::Value::Null);
  assert!(s.node_traces.is_empty());
  assert!(s.state_snapshots.is_empty());
  assert!(s.execution_log.is_empty());
}
