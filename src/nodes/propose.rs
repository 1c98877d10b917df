//! Propose stage: asks the main model which tools to call.

use chrono::{Datelike, NaiveDate};
use serde_json::json;
use tracing::{info, instrument};

use super::StageServices;
use crate::error::AgentError;
use crate::tools::ToolId;
use crate::types::{Message, RunState, Stage};

const WEEKDAYS: [&str; 7] = [
  "월요일", "화요일", "수요일", "목요일", "금요일", "토요일", "일요일",
];

const NAVER_HINT: &str = "\n- 네이버의 종목명은 NAVER입니다.";

/// Reply previews in the execution log are cut to this many characters.
const PREVIEW_CHARS: usize = 200;

/// Builds the tool-selection prompt for `query`, listing `tools` in order.
pub fn build_propose_prompt(query: &str, tools: &[ToolId], today: NaiveDate) -> String {
  let tools_text = tools
    .iter()
    .map(|t| format!("- {}: {}", t.name(), t.description()))
    .collect::<Vec<_>>()
    .join("\n");
  let today_str = today.format("%Y-%m-%d");
  let weekday = WEEKDAYS[today.weekday().num_days_from_monday() as usize];

  let mut prompt = format!(
    r#"당신은 주식 정보 검색 전문가입니다. 사용자의 질문을 신중히 분석한 후 적절한 도구를 사용하세요.
참고: 오늘 날짜는 {today_str} ({weekday})입니다. 사용자는 이 날짜를 기준으로 질문할 수도 있고, 다른 날짜를 명시할 수도 있습니다. 질문에 명시된 날짜가 있다면 그 날짜를 우선으로 사용하세요.

**질문 분석 및 도구 선택 전략**:
1. **단순 조회**: 1개 도구 사용
2. **비교 질문**: 여러 도구 동시 사용 (권장) - A vs B, 종목 vs 시장평균 등
3. **복잡한 집계**: TEXT2SQL 사용

**비교 질문 처리 예시 (여러 도구 동시 호출)**:
- 종목 vs 시장평균 → TOOL_CALL: {{"name": "get_stock_price", "args": "종목의 등락률"}} + TOOL_CALL: {{"name": "text2sql", "args": "시장 평균 등락률"}}
- A vs B 비교 → TOOL_CALL: {{"name": "get_stock_price", "args": "A 조회"}} + TOOL_CALL: {{"name": "get_stock_price", "args": "B 조회"}}

사용 가능한 도구들:
{tools_text}

사용자 질문: {query}

**도구 호출 형식:**
- 단일 도구: TOOL_CALL: {{"name": "도구명", "args": "질문"}}
- 여러 도구: 각각 별도 줄에 TOOL_CALL 작성

**여러 도구 호출 예시:**
TOOL_CALL: {{"name": "get_stock_price", "args": "삼성전자 2025-11-06 주가"}}
TOOL_CALL: {{"name": "get_stock_price", "args": "SK하이닉스 2025-11-06 주가"}}

**상세 사용 예시**:
- 삼성전자 주가 → TOOL_CALL: {{"name": "get_stock_price", "args": "삼성전자의 2025-11-06 주가는?"}}
- 상승률 순위 → TOOL_CALL: {{"name": "search_price_change", "args": "2025-11-06에 상승률 상위 10개 종목은?"}}
- 하락률 순위 → TOOL_CALL: {{"name": "search_price_change", "args": "2025-09-05에서 KOSDAQ에서 하락률 높은 종목 5개는?"}}
- 회사 검색 → TOOL_CALL: {{"name": "search_company", "args": "SK하이닉스"}}
- RSI 과매수 → TOOL_CALL: {{"name": "get_rsi_signals", "args": "2025-11-06에 RSI가 70 이상인 과매수 종목을 알려줘"}}
- 이동평균 돌파 → TOOL_CALL: {{"name": "get_ma_breakout", "args": "2025-11-06에 종가가 20일 이동평균보다 10% 이상 높은 종목을 알려줘"}}
- 데드크로스 → TOOL_CALL: {{"name": "get_cross_signals", "args": "2025-01-01부터 2025-12-31까지 데드크로스가 발생한 종목을 알려줘"}}
- 거래량 순위 → TOOL_CALL: {{"name": "search_volume", "args": "2025-11-06에 KOSPI 거래량 상위 10개 종목은?"}}
- 거래량 임계값 → TOOL_CALL: {{"name": "search_volume", "args": "2025-11-06에 거래량이 100만주 이상인 종목을 보여줘"}}
- 종목 거래량순위 → TOOL_CALL: {{"name": "search_volume", "args": "삼성전자가 2025-11-06에 거래량 몇 등인지?"}}
- 가격 순위 → TOOL_CALL: {{"name": "search_price", "args": "2025-11-06에 KOSPI에서 가장 비싼 종목 10개는?"}}
- 가격 범위 → TOOL_CALL: {{"name": "search_price", "args": "2025-11-06에 종가가 1만원 이상 5만원 이하인 종목을 보여줘"}}
- 거래량 급증 → TOOL_CALL: {{"name": "get_volume_surge", "args": "2025-11-06에 거래량이 20일 평균 대비 500% 이상 급증한 종목을 알려줘"}}
- KOSDAQ 지수 → TOOL_CALL: {{"name": "get_market_index", "args": "2025-11-06 KOSDAQ 지수는?"}}

**복합조건 질문**:
- 등락률+거래량 → TOOL_CALL: {{"name": "search_compound", "args": "2025-11-06에 등락률이 +3% 이상이면서 거래량이 100만주 이상인 종목은?"}}
- 가격+등락률 → TOOL_CALL: {{"name": "search_compound", "args": "2025-11-06에 종가가 1만원 이상 5만원 이하이면서 등락률이 +2% 이상인 종목은?"}}
- 거래량+가격+RSI → TOOL_CALL: {{"name": "search_compound", "args": "2025-11-06에 거래량이 500만주 이상이면서 종가가 2만원 이하이고 RSI가 70 이상인 종목은?"}}

**TEXT2SQL (복잡한 계산/집계)**:
- 전체 시장 대비 비율 → TOOL_CALL: {{"name": "text2sql", "args": "2025-05-23에 셀트리온 거래량이 전체 시장 거래량의 몇 %인가"}}
- 전날 대비 증감 → TOOL_CALL: {{"name": "text2sql", "args": "2025-01-09에 거래량이 전날대비 300% 이상 증가한 종목을 모두 보여줘"}}

**비교 질문은 여러 도구를 동시에 호출하세요**. 질문에 답할 수 있는 적절한 도구를 선택하거나 TEXT2SQL이 필요한지 판단하여 호출하세요."#
  );
  if prompt.contains("네이버") {
    prompt.push_str(NAVER_HINT);
  }
  prompt
}

fn preview(text: &str) -> String {
  if text.chars().count() > PREVIEW_CHARS {
    format!("{}...", text.chars().take(PREVIEW_CHARS).collect::<String>())
  } else {
    text.to_string()
  }
}

/// Appends the query and the model's reply to the conversation and counts the iteration.
#[instrument(level = "trace", skip(services, state))]
pub(crate) async fn propose(
  services: &StageServices<'_>,
  state: &mut RunState,
) -> Result<(), AgentError> {
  state.trace(Stage::Propose, "LLM 에이전트 노드 시작");
  state.log(
    "LLM 에이전트 노드 실행 시작",
    json!({
      "query": state.query(),
      "messages_count": state.conversation.len(),
      "iterations": state.iterations,
    }),
  );

  let prompt = build_propose_prompt(state.query(), services.tools.tools(), services.today);
  state.log("LLM 호출 시작", json!({ "prompt_length": prompt.chars().count() }));
  let reply = services.model.complete(&prompt).await?;
  info!(model = services.model.model_name(), reply_len = reply.len(), "model proposed calls");
  state.log(
    "LLM 응답 수신",
    json!({
      "response_length": reply.chars().count(),
      "response_preview": preview(&reply),
    }),
  );

  let query = state.query().to_string();
  state.conversation.push(Message::user(query));
  state.push_assistant(reply);
  state.iterations += 1;
  state.trace(Stage::Propose, "LLM 에이전트 노드 완료");
  Ok(())
}
