//! Detailed record of one `search` call, returned when the caller asks for it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::nodes::RunSummary;
use crate::types::{
  ExecutionResult, LogEntry, NodeTrace, RunState, Stage, StateSnapshot, ValidationStatus,
};

/// Report format version.
pub const RUN_REPORT_VERSION: u32 = 1;

/// Counters taken from the run state once the run has ended.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinalState {
  pub iterations: u32,
  pub validation_status: ValidationStatus,
  pub clarification_needed: bool,
  pub retry_count: u32,
  pub tool_calls_count: usize,
  /// Set when the run aborted before reaching a terminal stage.
  #[serde(default)]
  pub error: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
  pub version: u32,
  pub run_id: Uuid,
  pub query: String,
  pub started_at: DateTime<Utc>,
  pub finished_at: DateTime<Utc>,
  /// The answer text handed back to the caller.
  pub final_result: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  pub execution_log: Vec<LogEntry>,
  pub tool_results: Vec<ExecutionResult>,
  pub node_traces: Vec<NodeTrace>,
  pub state_history: Vec<StateSnapshot>,
  /// Stages in execution order. Empty for aborted runs.
  #[serde(default)]
  pub visited: Vec<Stage>,
  pub final_state: FinalState,
}

impl RunReport {
  /// Report for a run that reached a terminal stage.
  pub fn from_run(
    run_id: Uuid,
    started_at: DateTime<Utc>,
    final_result: String,
    state: RunState,
    summary: RunSummary,
  ) -> Self {
    let final_state = FinalState {
      iterations: state.iterations,
      validation_status: state.validation_status,
      clarification_needed: state.clarification_needed,
      retry_count: state.retry_count,
      tool_calls_count: state.proposed_calls.len(),
      error: false,
    };
    Self {
      version: RUN_REPORT_VERSION,
      run_id,
      query: state.query().to_string(),
      started_at,
      finished_at: Utc::now(),
      final_result,
      error: None,
      execution_log: state.execution_log,
      tool_results: state.execution_results,
      node_traces: state.node_traces,
      state_history: state.state_snapshots,
      visited: summary.visited,
      final_state,
    }
  }

  /// Report for a run that aborted; `final_result` carries the rendered error.
  pub fn from_error(
    run_id: Uuid,
    query: &str,
    started_at: DateTime<Utc>,
    final_result: String,
    error: String,
  ) -> Self {
    Self {
      version: RUN_REPORT_VERSION,
      run_id,
      query: query.to_string(),
      started_at,
      finished_at: Utc::now(),
      final_result,
      error: Some(error),
      execution_log: Vec::new(),
      tool_results: Vec::new(),
      node_traces: Vec::new(),
      state_history: Vec::new(),
      visited: Vec::new(),
      final_state: FinalState {
        error: true,
        ..FinalState::default()
      },
    }
  }

  pub fn is_error(&self) -> bool {
    self.error.is_some()
  }
}
