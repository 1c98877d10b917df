//! Clarify stage: ends the run with a request for a more specific question.

use tracing::{info, instrument};

use crate::types::{RunState, Stage};

/// Clarification text returned to the user for `query`.
pub fn clarification_prompt(query: &str) -> String {
  format!(
    "질문을 더 구체적으로 해주세요. \n\n원본 질문: {query}\n\n\
     다음과 같은 정보가 필요합니다:\n\
     - 정확한 날짜 (예: 2025-11-06)\n\
     - 구체적인 조건 (예: RSI 70 이상, 거래량 100만주 이상)\n\
     - 시장 구분이 필요한 경우 KOSPI 또는 KOSDAQ 명시\n\n\
     예시:\n\
     - \"2025-11-06 RSI 70 이상 과매수 종목은?\"\n\
     - \"2025-11-06 KOSPI 시장에서 가격이 1만원 이상 5만원 이하인 종목은?\"\n\
     - \"2025-01-01부터 2025-12-31까지 골든크로스 발생 종목은?"
  )
}

/// Leaves `retry_count` untouched; callers that re-enter seed it themselves.
#[instrument(level = "trace", skip(state))]
pub(crate) fn clarify(state: &mut RunState) {
  info!("requesting clarification");
  let text = clarification_prompt(state.query());
  state.push_assistant(text.clone());
  state.final_answer = Some(text);
  state.clarification_needed = true;
  state.trace(Stage::Clarify, "명확화 요청");
}
