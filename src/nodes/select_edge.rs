//! Transition function of the orchestration graph.

use crate::tools::ToolId;
use crate::types::{RunState, Stage, ValidationStatus};

/// Clarification is offered only while `retry_count` is below this.
pub const MAX_CLARIFICATION_RETRIES: u32 = 2;

/// Next stage after `stage` has executed against `state`, or `None` when the run is done.
///
/// Ordinary calls always run before SQL calls; a missing parameter diverts to clarification
/// before any remaining SQL runs.
pub fn select_edge(stage: Stage, state: &RunState) -> Option<Stage> {
  let next = match stage {
    Stage::Propose => Stage::Parse,
    Stage::Parse => Stage::Dispatch,
    Stage::Dispatch => {
      if state.has_pending_ordinary() {
        Stage::ExecuteStructured
      } else if state.has_pending_sql() {
        Stage::ExecuteSql
      } else {
        Stage::Generate
      }
    }
    Stage::ExecuteStructured | Stage::ExecuteSql => Stage::DecidePostExecute,
    Stage::DecidePostExecute => {
      if state.validation_status == ValidationStatus::ParamMissing
        && state.retry_count < MAX_CLARIFICATION_RETRIES
      {
        Stage::Clarify
      } else if state.has_pending_sql() {
        Stage::ExecuteSql
      } else {
        Stage::FilterDecide
      }
    }
    Stage::FilterDecide => {
      let needs_filtering = state
        .executed_tool_names()
        .filter_map(ToolId::from_name)
        .any(ToolId::needs_filtering);
      if needs_filtering {
        Stage::Filter
      } else {
        Stage::Generate
      }
    }
    Stage::Filter => Stage::Generate,
    Stage::Clarify | Stage::Generate => return None,
  };
  Some(next)
}
