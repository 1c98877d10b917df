//! Prompt for the final pass-through answer.

/// Query with the "show everything" phrase dropped, used as the answer heading.
pub fn answer_heading(query: &str) -> String {
  query.replace("모두 보여줘", "")
}

/// Asks the model to relay `results` for `query` without dropping entities.
pub fn build_generation_prompt(query: &str, results: &str) -> String {
  let heading = answer_heading(query);
  format!(
    "사용자 질문에 대한 도구 실행 결과를 그대로 전달하세요.

사용자 질문: {query}

도구 실행 결과:
{results}

**필수 규칙**:
- 도구 결과를 그대로 복사해서 전달
- 절대로 종목 개수를 줄이지 말 것
- \"총 38개 중 30개 표시\"라고 나와있으면 → 30개 모두 나열
- 임의로 5개, 10개로 제한하지 말 것
- 날짜 정보가 있으면 포함

답변 형식:
{heading}에 대한 결과는 다음과 같습니다:

[도구 결과에 나온 모든 종목을 그대로 나열]

답변:"
  )
}
