//! ExecuteSql stage: answers every text2sql call with generated SQL.

use std::time::Instant;

use chrono::Utc;
use serde_json::json;
use tracing::{info, instrument};

use super::StageServices;
use crate::sql_synthesis::DEFAULT_CATEGORY;
use crate::types::{ExecutionResult, RunState, Stage, ValidationStatus};

#[instrument(level = "trace", skip(services, state))]
pub(crate) async fn execute_sql(services: &StageServices<'_>, state: &mut RunState) {
  state.trace(Stage::ExecuteSql, "TEXT2SQL 노드 시작");
  let calls = state.take_pending(true);
  info!(count = calls.len(), "executing text2sql calls");

  let mut texts = Vec::with_capacity(calls.len());
  for call in calls {
    let question = if call.args.trim().is_empty() {
      state.query().to_string()
    } else {
      call.args.clone()
    };
    let started = Instant::now();
    let answer = services.sql.synthesize(&question, &[], DEFAULT_CATEGORY).await;
    let duration_secs = started.elapsed().as_secs_f64();
    let text = format!("text2sql 결과: {answer}");
    state.log(
      "TEXT2SQL 실행 완료",
      json!({
        "question": &question,
        "execution_time": duration_secs,
        "result_length": text.chars().count(),
      }),
    );
    texts.push(text.clone());
    let result = ExecutionResult {
      tool_name: call.name.clone(),
      args: call.args.clone(),
      outcome_text: text,
      status: ValidationStatus::Success,
      duration_secs,
      timestamp: Utc::now(),
    };
    state.record_result(call, result);
  }

  state.push_assistant(texts.join("\n\n"));
  state.validation_status = ValidationStatus::Success;
  state.trace(Stage::ExecuteSql, "TEXT2SQL 노드 완료");
}
