//! Language model seam: the agent talks to models only through [`LanguageModel`].

mod clova;
mod scripted;
#[cfg(test)]
mod scripted_test;

use async_trait::async_trait;

use crate::error::LlmError;

pub use clova::{ClovaModel, DEFAULT_CLOVA_ENDPOINT};
pub use scripted::ScriptedModel;

/// A chat model that answers a single user prompt with text.
#[async_trait]
pub trait LanguageModel: Send + Sync {
  async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

  /// Model identifier, used in logs and reports.
  fn model_name(&self) -> &str;
}
