//! Orchestration stages and the loop that walks them.
//!
//! Each stage mutates the [`RunState`](crate::types::RunState) in place; [`select_edge`]
//! picks the successor from the stage just executed and the state it left behind.

mod clarify;
mod execute_sql;
mod execute_structured;
mod execution_loop;
#[cfg(test)]
mod execution_loop_test;
mod filter;
mod generate;
mod parse;
mod propose;
mod select_edge;
#[cfg(test)]
mod select_edge_test;

use chrono::NaiveDate;

use crate::llm::LanguageModel;
use crate::sql_synthesis::SqlAnswerer;
use crate::tools::ToolBox;

pub use clarify::clarification_prompt;
pub use execution_loop::{MAX_STAGE_STEPS, RunSummary, run_execution_loop_once};
pub use propose::build_propose_prompt;
pub use select_edge::{MAX_CLARIFICATION_RETRIES, select_edge};

/// Collaborators a run borrows from its agent.
#[derive(Clone, Copy)]
pub struct StageServices<'a> {
  /// Model used to propose calls and to write the final answer.
  pub model: &'a dyn LanguageModel,
  pub tools: &'a dyn ToolBox,
  pub sql: &'a dyn SqlAnswerer,
  /// Reference date given to the model in the propose prompt.
  pub today: NaiveDate,
}
