//! A structured tool invocation parsed from model output.

use serde::{Deserialize, Serialize};

/// Reserved tool name routed to the SQL synthesis path instead of a handler.
pub const SQL_TOOL_NAME: &str = "text2sql";

/// A `{name, args}` pair. `args` is a natural-language fragment the tool re-interprets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolCall {
  pub name: String,
  pub args: String,
}

impl ToolCall {
  pub fn new(name: impl Into<String>, args: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      args: args.into(),
    }
  }

  /// True when this call belongs to the generated-SQL path.
  pub fn is_sql(&self) -> bool {
    self.name == SQL_TOOL_NAME
  }
}
