//! Stages of the orchestration graph.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One stage of the orchestration graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
  Propose,
  Parse,
  Dispatch,
  ExecuteStructured,
  ExecuteSql,
  DecidePostExecute,
  Clarify,
  FilterDecide,
  Filter,
  Generate,
}

impl Stage {
  /// Entry stage of every run.
  pub const START: Stage = Stage::Propose;

  pub fn name(self) -> &'static str {
    match self {
      Stage::Propose => "propose",
      Stage::Parse => "parse",
      Stage::Dispatch => "dispatch",
      Stage::ExecuteStructured => "execute_structured",
      Stage::ExecuteSql => "execute_sql",
      Stage::DecidePostExecute => "decide_post_execute",
      Stage::Clarify => "clarify",
      Stage::FilterDecide => "filter_decide",
      Stage::Filter => "filter",
      Stage::Generate => "generate",
    }
  }

  /// Terminal stages end the run after executing.
  pub fn is_terminal(self) -> bool {
    matches!(self, Stage::Clarify | Stage::Generate)
  }
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}
