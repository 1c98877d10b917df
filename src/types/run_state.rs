//! Per-query run state threaded through every orchestration stage.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{
  ExecutionResult, LogEntry, Message, NodeTrace, Role, Stage, StateSnapshot, ToolCall,
  ValidationStatus,
};

/// Mutable record for one user query. Created fresh per query and discarded after the answer
/// is extracted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
  query: String,
  pub conversation: Vec<Message>,
  /// Calls produced by the parse stage, unique by (name, args).
  pub proposed_calls: Vec<ToolCall>,
  /// Calls not yet executed, in parse order.
  pub pending: Vec<ToolCall>,
  /// Calls with a recorded outcome, in execution order.
  pub completed: Vec<ToolCall>,
  /// Number of calls executed so far.
  pub cursor: usize,
  pub execution_results: Vec<ExecutionResult>,
  pub validation_status: ValidationStatus,
  pub retry_count: u32,
  pub clarification_needed: bool,
  pub final_answer: Option<String>,
  /// Output of the filter stage, when it ran.
  pub filtered_result: Option<String>,
  pub iterations: u32,
  pub node_traces: Vec<NodeTrace>,
  pub state_snapshots: Vec<StateSnapshot>,
  pub execution_log: Vec<LogEntry>,
  /// When false, `trace` and `log` are no-ops.
  #[serde(skip, default = "enabled")]
  pub detailed_logging: bool,
}

fn enabled() -> bool {
  true
}

impl RunState {
  pub fn new(query: impl Into<String>) -> Self {
    Self {
      query: query.into(),
      conversation: Vec::new(),
      proposed_calls: Vec::new(),
      pending: Vec::new(),
      completed: Vec::new(),
      cursor: 0,
      execution_results: Vec::new(),
      validation_status: ValidationStatus::Pending,
      retry_count: 0,
      clarification_needed: false,
      final_answer: None,
      filtered_result: None,
      iterations: 0,
      node_traces: Vec::new(),
      state_snapshots: Vec::new(),
      execution_log: Vec::new(),
      detailed_logging: true,
    }
  }

  /// Seeds the retry counter, for callers that re-enter after a clarification.
  pub fn with_retry_count(mut self, retry_count: u32) -> Self {
    self.retry_count = retry_count;
    self
  }

  pub fn query(&self) -> &str {
    &self.query
  }

  /// Content of the most recent assistant message.
  pub fn last_assistant_reply(&self) -> Option<&str> {
    self
      .conversation
      .iter()
      .rev()
      .find(|m| m.role == Role::Assistant)
      .map(|m| m.content.as_str())
  }

  /// Installs parsed calls and resets the execution partition.
  pub fn set_proposed_calls(&mut self, calls: Vec<ToolCall>) {
    self.pending = calls.clone();
    self.proposed_calls = calls;
    self.completed.clear();
    self.cursor = 0;
  }

  /// Removes and returns the pending calls belonging to one path, preserving order.
  pub fn take_pending(&mut self, sql: bool) -> Vec<ToolCall> {
    let (taken, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
      .into_iter()
      .partition(|c| c.is_sql() == sql);
    self.pending = rest;
    taken
  }

  pub fn has_pending_sql(&self) -> bool {
    self.pending.iter().any(ToolCall::is_sql)
  }

  pub fn has_pending_ordinary(&self) -> bool {
    self.pending.iter().any(|c| !c.is_sql())
  }

  /// Appends one executed call and its result.
  pub fn record_result(&mut self, call: ToolCall, result: ExecutionResult) {
    self.completed.push(call);
    self.cursor += 1;
    self.execution_results.push(result);
  }

  /// All result slots joined in execution order.
  pub fn concatenated_results(&self) -> String {
    self
      .execution_results
      .iter()
      .map(|r| r.outcome_text.as_str())
      .collect::<Vec<_>>()
      .join("\n\n")
  }

  /// Names of the tools that were executed, in order.
  pub fn executed_tool_names(&self) -> impl Iterator<Item = &str> {
    self.completed.iter().map(|c| c.name.as_str())
  }

  /// Appends an assistant message.
  pub fn push_assistant(&mut self, content: impl Into<String>) {
    self.conversation.push(Message::assistant(content));
  }

  /// Records a stage trace and a state snapshot.
  #[instrument(level = "trace", skip(self, description))]
  pub fn trace(&mut self, stage: Stage, description: impl Into<String>) {
    if !self.detailed_logging {
      return;
    }
    let timestamp = Utc::now().to_rfc3339();
    self.node_traces.push(NodeTrace {
      step: self.node_traces.len() as u32 + 1,
      timestamp: timestamp.clone(),
      node_name: stage.name().to_string(),
      description: description.into(),
      iterations: self.iterations,
      validation_status: self.validation_status,
      tool_calls_count: self.proposed_calls.len(),
    });
    let result_length = self
      .final_answer
      .as_deref()
      .or(self.filtered_result.as_deref())
      .map(|s| s.chars().count())
      .unwrap_or_else(|| self.concatenated_results().chars().count());
    self.state_snapshots.push(StateSnapshot {
      timestamp,
      node_name: stage.name().to_string(),
      query: self.query.clone(),
      result_length,
      iterations: self.iterations,
      validation_status: self.validation_status,
      clarification_needed: self.clarification_needed,
      retry_count: self.retry_count,
      messages_count: self.conversation.len(),
    });
  }

  /// Appends an execution log entry.
  pub fn log(&mut self, message: impl Into<String>, extra_data: serde_json::Value) {
    if self.detailed_logging {
      self.execution_log.push(LogEntry::info(message, extra_data));
    }
  }
}
