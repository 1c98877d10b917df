//! ExecuteStructured stage: runs the ordinary (non-SQL) calls through the tool box.

use std::time::Instant;

use chrono::Utc;
use serde_json::json;
use tracing::{info, instrument, warn};

use super::StageServices;
use crate::tools::ToolId;
use crate::types::{ExecutionResult, RunState, Stage, ToolCall, ValidationStatus};

/// Runs one call and returns its slot text and status. Faults stay inside the slot.
async fn run_call(services: &StageServices<'_>, call: &ToolCall) -> (String, ValidationStatus) {
  let Some(tool) = ToolId::from_name(&call.name) else {
    warn!(tool = %call.name, "unknown tool");
    return (
      format!("알 수 없는 도구: {}", call.name),
      ValidationStatus::ToolError,
    );
  };
  match services.tools.invoke(tool, &call.args).await {
    Ok(output) => (
      format!("{} 결과: {}", call.name, output.text),
      output.validation_status(),
    ),
    Err(e) => {
      warn!(tool = %call.name, error = %e, "tool failed");
      (
        format!("{} 오류: {e}", call.name),
        ValidationStatus::ToolError,
      )
    }
  }
}

/// Executes pending ordinary calls in parse order. The batch status keeps the latest failure.
#[instrument(level = "trace", skip(services, state))]
pub(crate) async fn execute_structured(services: &StageServices<'_>, state: &mut RunState) {
  state.trace(Stage::ExecuteStructured, "일반 도구들 실행 노드 시작");
  let calls = state.take_pending(false);
  info!(count = calls.len(), "executing tools");

  let mut batch = ValidationStatus::Success;
  let mut texts = Vec::with_capacity(calls.len());
  for call in calls {
    let started = Instant::now();
    let (text, status) = run_call(services, &call).await;
    let duration_secs = started.elapsed().as_secs_f64();
    batch = batch.merge(status);
    state.log(
      format!("{} 실행 완료", call.name),
      json!({
        "tool_args": &call.args,
        "execution_time": duration_secs,
        "result_length": text.chars().count(),
        "status": status,
      }),
    );
    texts.push(text.clone());
    let result = ExecutionResult {
      tool_name: call.name.clone(),
      args: call.args.clone(),
      outcome_text: text,
      status,
      duration_secs,
      timestamp: Utc::now(),
    };
    state.record_result(call, result);
  }

  state.push_assistant(texts.join("\n\n"));
  state.validation_status = batch;
  state.trace(Stage::ExecuteStructured, "일반 도구들 실행 노드 완료");
}
