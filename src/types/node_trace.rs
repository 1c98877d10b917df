//! Observability records for a run: stage traces, state snapshots, and log entries.
//!
//! These are append-only and never consulted by routing.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::ValidationStatus;

/// One stage execution as seen by the trace log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeTrace {
  /// 1-based step index within the run.
  pub step: u32,
  /// RFC 3339 timestamp.
  pub timestamp: String,
  pub node_name: String,
  pub description: String,
  pub iterations: u32,
  pub validation_status: ValidationStatus,
  pub tool_calls_count: usize,
}

/// Counters captured from the run state when a stage is traced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
  pub timestamp: String,
  pub node_name: String,
  pub query: String,
  pub result_length: usize,
  pub iterations: u32,
  pub validation_status: ValidationStatus,
  pub clarification_needed: bool,
  pub retry_count: u32,
  pub messages_count: usize,
}

/// Free-form execution log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
  pub timestamp: String,
  pub level: String,
  pub message: String,
  #[serde(default)]
  pub extra_data: serde_json::Value,
}

impl LogEntry {
  pub fn info(message: impl Into<String>, extra_data: serde_json::Value) -> Self {
    Self {
      timestamp: Utc::now().to_rfc3339(),
      level: "INFO".to_string(),
      message: message.into(),
      extra_data,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::{LogEntry, NodeTrace, StateSnapshot};
  use crate::types::ValidationStatus;

  #[test]
  fn node_trace_serializes_to_json() {
    let trace = NodeTrace {
      step: 1,
      timestamp: "2026-02-14T10:00:00Z".to_string(),
      node_name: "parse".to_string(),
      description: "parsed 2 calls".to_string(),
      iterations: 1,
      validation_status: ValidationStatus::Pending,
      tool_calls_count: 2,
    };
    let json = serde_json::to_string(&trace).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["step"], 1);
    assert_eq!(parsed["node_name"], "parse");
    assert_eq!(parsed["validation_status"], "pending");
    assert_eq!(parsed["tool_calls_count"], 2);
  }

  #[test]
  fn state_snapshot_roundtrips() {
    let snap = StateSnapshot {
      timestamp: "2026-02-14T10:00:00Z".to_string(),
      node_name: "generate".to_string(),
      query: "2025-11-06 상승률 1위는?".to_string(),
      result_length: 42,
      iterations: 1,
      validation_status: ValidationStatus::Success,
      clarification_needed: false,
      retry_count: 0,
      messages_count: 3,
    };
    let json = serde_json::to_string(&snap).unwrap();
    let back: StateSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snap);
  }

  #[test]
  fn log_entry_info_level() {
    let e = LogEntry::info("started", serde_json::json!({"query": "q"}));
    assert_eq!(e.level, "INFO");
    assert_eq!(e.extra_data["query"], "q");
    assert!(!e.timestamp.is_empty());
  }
}
