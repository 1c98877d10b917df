//! Tool registry and the stock data handlers behind it.

mod handlers;
mod stock_tools;
mod tool_id;

use async_trait::async_trait;

use crate::error::ToolFault;
use crate::types::ToolOutput;

pub use stock_tools::StockTools;
pub use tool_id::ToolId;

/// Executes registered tools. "Not found" conditions come back as descriptive output;
/// only genuine faults (database, IO) are errors.
#[async_trait]
pub trait ToolBox: Send + Sync {
  async fn invoke(&self, tool: ToolId, args: &str) -> Result<ToolOutput, ToolFault>;

  /// Tools advertised to the model, in prompt order.
  fn tools(&self) -> &[ToolId] {
    &ToolId::ALL
  }
}
