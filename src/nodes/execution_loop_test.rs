//! Tests for `run_execution_loop_once` with in-memory collaborators.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{StageServices, clarification_prompt, run_execution_loop_once};
use crate::error::{AgentError, LlmError, ToolFault};
use crate::llm::ScriptedModel;
use crate::sql_synthesis::SqlAnswerer;
use crate::tools::{ToolBox, ToolId};
use crate::types::{RunState, Stage, ToolOutput, ValidationStatus};

const GENERATION_NEEDLE: &str = "사용자 질문에 대한 도구 실행 결과를 그대로 전달하세요";

struct FakeTools;

#[async_trait]
impl ToolBox for FakeTools {
  async fn invoke(&self, tool: ToolId, args: &str) -> Result<ToolOutput, ToolFault> {
    match tool {
      ToolId::GetMarketStats => Err(ToolFault::Io(std::io::Error::other("disk gone"))),
      ToolId::GetRsiSignals => Ok(ToolOutput::param_missing(format!(
        "날짜 정보를 찾을 수 없습니다: {args}"
      ))),
      ToolId::GetBollingerSignals => Ok(ToolOutput::ok("조건을 찾을 수 없습니다: 밴드")),
      _ => Ok(ToolOutput::ok(format!("[{args}]"))),
    }
  }
}

#[derive(Default)]
struct FakeSql {
  questions: Mutex<Vec<String>>,
}

#[async_trait]
impl SqlAnswerer for FakeSql {
  async fn synthesize(&self, question: &str, topic_hints: &[&str], category: &str) -> String {
    self.questions.lock().unwrap().push(question.to_string());
    format!("sql({question}|{}|{category})", topic_hints.len())
  }
}

fn model(proposal: &str) -> ScriptedModel {
  ScriptedModel::new("main")
    .with_rule(GENERATION_NEEDLE, "최종 답변")
    .with_replies([proposal])
}

fn services<'a>(model: &'a ScriptedModel, sql: &'a FakeSql) -> StageServices<'a> {
  StageServices {
    model,
    tools: &FakeTools,
    sql,
    today: NaiveDate::from_ymd_opt(2025, 11, 7).unwrap(),
  }
}

fn tool_names(state: &RunState) -> Vec<&str> {
  state.execution_results.iter().map(|r| r.tool_name.as_str()).collect()
}

#[tokio::test]
async fn ordinary_calls_run_before_sql_and_results_keep_that_order() {
  let model = model(
    "TOOL_CALL: {\"name\": \"text2sql\", \"args\": \"시장 평균 등락률\"}\n\
     TOOL_CALL: {\"name\": \"get_stock_price\", \"args\": \"삼성전자 등락률\"}",
  );
  let sql = FakeSql::default();
  let mut state = RunState::new("삼성전자와 시장 평균 비교");

  let summary = run_execution_loop_once(&services(&model, &sql), &mut state)
    .await
    .unwrap();

  assert_eq!(
    summary.visited,
    vec![
      Stage::Propose,
      Stage::Parse,
      Stage::Dispatch,
      Stage::ExecuteStructured,
      Stage::DecidePostExecute,
      Stage::ExecuteSql,
      Stage::DecidePostExecute,
      Stage::FilterDecide,
      Stage::Filter,
      Stage::Generate,
    ]
  );
  assert_eq!(summary.terminal, Stage::Generate);
  assert_eq!(tool_names(&state), vec!["get_stock_price", "text2sql"]);
  assert_eq!(
    state.concatenated_results(),
    "get_stock_price 결과: [삼성전자 등락률]\n\ntext2sql 결과: sql(시장 평균 등락률|0|복합조건)"
  );
  assert_eq!(state.final_answer.as_deref(), Some("최종 답변"));
  assert!(!state.clarification_needed);

  let prompts = model.prompts();
  assert_eq!(prompts.len(), 2);
  let generation = &prompts[1];
  let structured_at = generation.find("get_stock_price 결과").unwrap();
  let sql_at = generation.find("text2sql 결과").unwrap();
  assert!(structured_at < sql_at);
}

#[tokio::test]
async fn faults_stay_inside_their_slot() {
  let model = model(
    "TOOL_CALL: {\"name\": \"get_market_stats\", \"args\": \"2025-11-06 시장 통계\"}\n\
     TOOL_CALL: {\"name\": \"get_stock_price\", \"args\": \"삼성전자\"}\n\
     TOOL_CALL: {\"name\": \"get_weather\", \"args\": \"서울\"}",
  );
  let sql = FakeSql::default();
  let mut state = RunState::new("시장 통계와 삼성전자");

  let summary = run_execution_loop_once(&services(&model, &sql), &mut state)
    .await
    .unwrap();

  let texts: Vec<&str> = state
    .execution_results
    .iter()
    .map(|r| r.outcome_text.as_str())
    .collect();
  assert_eq!(
    texts,
    vec![
      "get_market_stats 오류: disk gone",
      "get_stock_price 결과: [삼성전자]",
      "알 수 없는 도구: get_weather",
    ]
  );
  assert_eq!(state.execution_results[1].status, ValidationStatus::Success);
  assert_eq!(state.validation_status, ValidationStatus::ToolError);
  assert_eq!(summary.terminal, Stage::Generate);
  assert!(!summary.visited.contains(&Stage::Filter));
  assert_eq!(state.final_answer.as_deref(), Some("최종 답변"));
}

#[tokio::test]
async fn missing_parameter_clarifies_without_touching_retry_count() {
  for retry in [0, 1] {
    let model = model(
      "TOOL_CALL: {\"name\": \"get_rsi_signals\", \"args\": \"RSI 과매수 종목\"}\n\
       TOOL_CALL: {\"name\": \"text2sql\", \"args\": \"평균 RSI\"}",
    );
    let sql = FakeSql::default();
    let mut state = RunState::new("RSI 과매수 종목").with_retry_count(retry);

    let summary = run_execution_loop_once(&services(&model, &sql), &mut state)
      .await
      .unwrap();

    assert_eq!(summary.terminal, Stage::Clarify);
    assert!(state.clarification_needed);
    assert_eq!(state.retry_count, retry);
    assert_eq!(
      state.final_answer.as_deref(),
      Some(clarification_prompt("RSI 과매수 종목").as_str())
    );
    assert!(sql.questions.lock().unwrap().is_empty());
    assert!(state.has_pending_sql());
    assert_eq!(model.prompts().len(), 1);
  }
}

#[tokio::test]
async fn exhausted_retries_generate_instead() {
  let model = model("TOOL_CALL: {\"name\": \"get_rsi_signals\", \"args\": \"RSI 과매수 종목\"}");
  let sql = FakeSql::default();
  let mut state = RunState::new("RSI 과매수 종목").with_retry_count(2);

  let summary = run_execution_loop_once(&services(&model, &sql), &mut state)
    .await
    .unwrap();

  assert_eq!(summary.terminal, Stage::Generate);
  assert!(!state.clarification_needed);
  assert_eq!(state.validation_status, ValidationStatus::ParamMissing);
  assert_eq!(state.final_answer.as_deref(), Some("최종 답변"));
}

#[tokio::test]
async fn marker_text_from_ok_handler_still_clarifies() {
  let model = model("TOOL_CALL: {\"name\": \"get_bollinger_signals\", \"args\": \"밴드 터치\"}");
  let sql = FakeSql::default();
  let mut state = RunState::new("볼린저 밴드");

  let summary = run_execution_loop_once(&services(&model, &sql), &mut state)
    .await
    .unwrap();

  assert_eq!(summary.terminal, Stage::Clarify);
  assert_eq!(state.execution_results[0].status, ValidationStatus::ParamMissing);
}

#[tokio::test]
async fn no_calls_generate_from_the_query() {
  let model = model("죄송하지만 도구가 필요하지 않은 질문입니다.");
  let sql = FakeSql::default();
  let mut state = RunState::new("안녕하세요");

  let summary = run_execution_loop_once(&services(&model, &sql), &mut state)
    .await
    .unwrap();

  assert_eq!(
    summary.visited,
    vec![Stage::Propose, Stage::Parse, Stage::Dispatch, Stage::Generate]
  );
  assert!(state.execution_results.is_empty());
  assert!(model.prompts()[1].contains("도구 실행 결과:\n안녕하세요"));
}

#[tokio::test]
async fn empty_sql_args_fall_back_to_query() {
  let model = model("TOOL_CALL: {\"name\": \"text2sql\", \"args\": \"\"}");
  let sql = FakeSql::default();
  let mut state = RunState::new("2025-11-06 전체 거래대금 합계");

  run_execution_loop_once(&services(&model, &sql), &mut state)
    .await
    .unwrap();

  assert_eq!(
    *sql.questions.lock().unwrap(),
    vec!["2025-11-06 전체 거래대금 합계".to_string()]
  );
  assert_eq!(state.validation_status, ValidationStatus::Success);
  assert!(state.filtered_result.is_some());
}

#[tokio::test]
async fn model_failure_aborts_the_run() {
  let model = ScriptedModel::new("silent");
  let sql = FakeSql::default();
  let mut state = RunState::new("삼성전자 주가");

  let err = run_execution_loop_once(&services(&model, &sql), &mut state)
    .await
    .unwrap_err();

  assert!(matches!(err, AgentError::Model(LlmError::Exhausted)));
  assert!(state.final_answer.is_none());
}

#[tokio::test]
async fn stages_are_traced_and_logged() {
  let model = model("TOOL_CALL: {\"name\": \"get_stock_price\", \"args\": \"삼성전자\"}");
  let sql = FakeSql::default();
  let mut state = RunState::new("삼성전자 주가");

  run_execution_loop_once(&services(&model, &sql), &mut state)
    .await
    .unwrap();

  let names: Vec<&str> = state.node_traces.iter().map(|t| t.node_name.as_str()).collect();
  assert_eq!(names.first(), Some(&"propose"));
  assert_eq!(names.last(), Some(&"generate"));
  assert_eq!(state.iterations, 1);
  assert!(state.execution_log.iter().any(|e| e.message == "LLM 응답 수신"));
  assert_eq!(state.node_traces.len(), state.state_snapshots.len());
}

#[tokio::test]
async fn quiet_runs_record_no_traces() {
  let model = model("TOOL_CALL: {\"name\": \"get_stock_price\", \"args\": \"삼성전자\"}");
  let sql = FakeSql::default();
  let mut state = RunState::new("삼성전자 주가");
  state.detailed_logging = false;

  run_execution_loop_once(&services(&model, &sql), &mut state)
    .await
    .unwrap();

  assert!(state.node_traces.is_empty());
  assert!(state.execution_log.is_empty());
  assert_eq!(state.final_answer.as_deref(), Some("최종 답변"));
}
