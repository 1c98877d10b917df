//! # stock-search-agent
//!
//! Answers natural-language questions about Korean equities from local SQLite market data.
//!
//! ## Architecture
//!
//! A query runs through a fixed graph of stages (see `nodes`):
//!
//! propose → parse → dispatch → execute structured / execute SQL → clarify | filter → generate
//!
//! The main model proposes tool calls as text, the call parser recovers them, tools read the
//! databases through parameters the simple model extracts, and generated SQL covers what no
//! tool does. Everything the run did is kept on the [`RunState`] and can be returned as a
//! [`RunReport`].

pub mod agent;
pub mod call_parser;
pub mod config;
pub mod error;
pub mod format;
pub mod llm;
pub mod market;
pub mod nodes;
pub mod param_extractor;
pub mod report;
pub mod report_io;
pub mod result_filter;
#[cfg(test)]
mod result_filter_test;
pub mod sql_synthesis;
pub mod synthesizer;
#[cfg(test)]
mod test_support;
pub mod tools;
pub mod types;

pub use agent::{CompletedRun, SearchResponse, StockSearchAgent};
pub use call_parser::parse_tool_calls;
pub use config::AgentConfig;
pub use error::{AgentError, LlmError, SqlError, ToolFault};
pub use llm::{ClovaModel, LanguageModel, ScriptedModel};
pub use nodes::{RunSummary, run_execution_loop_once};
pub use report::RunReport;
pub use report_io::{load_run_report, write_run_report};
pub use result_filter::filter_results;
pub use sql_synthesis::{SqlAnswerer, SqlPolicy, SqlSynthesizer};
pub use tools::{StockTools, ToolBox, ToolId};
pub use types::{RunState, Stage, ToolCall, ToolOutput, ValidationStatus};
