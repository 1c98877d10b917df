//! Parse stage: turns the latest model reply into tool calls.

use serde_json::json;
use tracing::{info, instrument};

use crate::call_parser::parse_tool_calls;
use crate::types::{RunState, Stage};

#[instrument(level = "trace", skip(state))]
pub(crate) fn parse(state: &mut RunState) {
  state.trace(Stage::Parse, "도구 호출 파싱 노드 시작");
  let reply = state.last_assistant_reply().unwrap_or_default().to_string();
  let calls = parse_tool_calls(&reply);
  info!(count = calls.len(), "parsed tool calls");
  state.log(
    format!("도구 호출 파싱 완료: {}개 발견", calls.len()),
    json!({
      "tool_calls": &calls,
      "ai_response_length": reply.chars().count(),
    }),
  );
  state.set_proposed_calls(calls);
  state.trace(Stage::Parse, "도구 호출 파싱 노드 완료");
}
