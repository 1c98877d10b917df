//! Stage loop: runs stages until a terminal one has executed.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::StageServices;
use super::clarify::clarify;
use super::execute_sql::execute_sql;
use super::execute_structured::execute_structured;
use super::filter::filter;
use super::generate::generate;
use super::parse::parse;
use super::propose::propose;
use super::select_edge::select_edge;
use crate::error::AgentError;
use crate::types::{RunState, Stage};

/// Upper bound on stage executions per run. The longest legal path is ten stages.
pub const MAX_STAGE_STEPS: usize = 32;

/// How a completed run traversed the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
  /// Terminal stage that ended the run.
  pub terminal: Stage,
  /// Every executed stage, in order, including routing stages.
  pub visited: Vec<Stage>,
}

async fn execute_stage(
  stage: Stage,
  services: &StageServices<'_>,
  state: &mut RunState,
) -> Result<(), AgentError> {
  match stage {
    Stage::Propose => propose(services, state).await?,
    Stage::Parse => parse(state),
    Stage::ExecuteStructured => execute_structured(services, state).await,
    Stage::ExecuteSql => execute_sql(services, state).await,
    Stage::Clarify => clarify(state),
    Stage::Filter => filter(state),
    Stage::Generate => generate(services, state).await?,
    Stage::Dispatch | Stage::DecidePostExecute | Stage::FilterDecide => {}
  }
  Ok(())
}

/// Runs `state` from [`Stage::START`] to a terminal stage.
#[instrument(level = "trace", skip(services, state))]
pub async fn run_execution_loop_once(
  services: &StageServices<'_>,
  state: &mut RunState,
) -> Result<RunSummary, AgentError> {
  let mut stage = Stage::START;
  let mut visited = Vec::new();

  loop {
    if visited.len() >= MAX_STAGE_STEPS {
      return Err(AgentError::StageLimit(MAX_STAGE_STEPS));
    }
    info!(stage = %stage, step = visited.len() + 1, "executing stage");
    execute_stage(stage, services, state).await?;
    visited.push(stage);

    match select_edge(stage, state) {
      Some(next) => stage = next,
      None => {
        debug_assert!(stage.is_terminal(), "run ended at non-terminal stage {stage}");
        info!(visited = ?visited, "execution loop complete");
        return Ok(RunSummary {
          terminal: stage,
          visited,
        });
      }
    }
  }
}
