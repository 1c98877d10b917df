//! Run-level types threaded through the orchestration stages.

mod execution_result;
mod message;
mod node_trace;
mod run_state;
#[cfg(test)]
mod run_state_test;
mod stage;
#[cfg(test)]
mod stage_test;
mod tool_call;
#[cfg(test)]
mod tool_call_test;
mod tool_output;
#[cfg(test)]
mod tool_output_test;
mod validation_status;
#[cfg(test)]
mod validation_status_test;

pub use execution_result::ExecutionResult;
pub use message::{Message, Role};
pub use node_trace::{LogEntry, NodeTrace, StateSnapshot};
pub use run_state::RunState;
pub use stage::Stage;
pub use tool_call::{SQL_TOOL_NAME, ToolCall};
pub use tool_output::{
  PARAM_MISSING_MARKERS, ToolOutput, ToolStatus, contains_param_missing_marker,
};
pub use validation_status::ValidationStatus;
