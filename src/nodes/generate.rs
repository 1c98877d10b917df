//! Generate stage: the model relays the results as the final answer.

use tracing::{info, instrument};

use super::StageServices;
use crate::error::AgentError;
use crate::synthesizer::build_generation_prompt;
use crate::types::{RunState, Stage};

/// Results handed to the model: filtered text, else everything executed, else the query.
fn generation_input(state: &RunState) -> String {
  if let Some(filtered) = &state.filtered_result {
    return filtered.clone();
  }
  let results = state.concatenated_results();
  if results.is_empty() {
    state.query().to_string()
  } else {
    results
  }
}

#[instrument(level = "trace", skip(services, state))]
pub(crate) async fn generate(
  services: &StageServices<'_>,
  state: &mut RunState,
) -> Result<(), AgentError> {
  let prompt = build_generation_prompt(state.query(), &generation_input(state));
  let answer = services.model.complete(&prompt).await?;
  info!(answer_len = answer.chars().count(), "final answer generated");
  state.push_assistant(answer.clone());
  state.final_answer = Some(answer);
  state.trace(Stage::Generate, "최종 응답 생성");
  Ok(())
}
