//! Error types for model calls, tool handlers, SQL synthesis, and the agent run.

use thiserror::Error;

/// Failure talking to a language model.
#[derive(Debug, Error)]
pub enum LlmError {
  #[error("model request failed: {0}")]
  Http(#[from] reqwest::Error),
  #[error("model endpoint returned {status}: {body}")]
  Status { status: u16, body: String },
  #[error("malformed model response: {0}")]
  MalformedResponse(String),
  #[error("scripted model has no reply left")]
  Exhausted,
}

/// Fault raised inside a tool handler. The execute stage turns it into result text.
#[derive(Debug, Error)]
pub enum ToolFault {
  #[error("{0}")]
  Database(#[from] sqlx::Error),
  #[error("{0}")]
  Directory(#[from] csv::Error),
  #[error("{0}")]
  Io(#[from] std::io::Error),
}

/// Failure on the generated-SQL path. Rendered inline as answer text, never propagated.
#[derive(Debug, Error)]
pub enum SqlError {
  #[error("{0}")]
  Model(#[from] LlmError),
  #[error("생성된 응답에서 SQL 쿼리를 찾을 수 없습니다")]
  NoStatement,
  #[error("SQL 구문 분석 실패: {0}")]
  Parse(String),
  #[error("허용되지 않는 SQL: {0}")]
  Rejected(String),
  #[error("{0}")]
  Database(#[from] sqlx::Error),
}

/// Failure that aborts an agent run.
#[derive(Debug, Error)]
pub enum AgentError {
  #[error("configuration error: {0}")]
  Config(String),
  #[error(transparent)]
  Model(#[from] LlmError),
  #[error("stage limit of {0} exceeded")]
  StageLimit(usize),
  #[error(transparent)]
  Io(#[from] std::io::Error),
}
