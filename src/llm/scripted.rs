//! Deterministic model for tests and offline runs.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::LanguageModel;
use crate::error::LlmError;

#[derive(Debug, Default)]
struct Script {
  queue: VecDeque<String>,
  rules: Vec<(String, String)>,
  fallback: Option<String>,
  prompts: Vec<String>,
}

/// Replies from a script. Resolution order per prompt: the first rule whose needle occurs in
/// the prompt, then the next queued reply, then the fallback. With none of these the call
/// fails with [`LlmError::Exhausted`]. Every prompt is recorded.
#[derive(Debug, Default)]
pub struct ScriptedModel {
  name: String,
  script: Mutex<Script>,
}

impl ScriptedModel {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      script: Mutex::default(),
    }
  }

  /// Queues replies returned in order.
  pub fn with_replies<I, S>(self, replies: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.lock().queue.extend(replies.into_iter().map(Into::into));
    self
  }

  /// Answers `reply` to every prompt containing `needle`.
  pub fn with_rule(self, needle: impl Into<String>, reply: impl Into<String>) -> Self {
    self.lock().rules.push((needle.into(), reply.into()));
    self
  }

  pub fn with_fallback(self, reply: impl Into<String>) -> Self {
    self.lock().fallback = Some(reply.into());
    self
  }

  /// Prompts received so far, in call order.
  pub fn prompts(&self) -> Vec<String> {
    self.lock().prompts.clone()
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
    self.script.lock().unwrap_or_else(|e| e.into_inner())
  }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
  async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
    let mut script = self.lock();
    script.prompts.push(prompt.to_string());
    if let Some((_, reply)) = script.rules.iter().find(|(needle, _)| prompt.contains(needle.as_str())) {
      return Ok(reply.clone());
    }
    if let Some(reply) = script.queue.pop_front() {
      return Ok(reply);
    }
    script.fallback.clone().ok_or(LlmError::Exhausted)
  }

  fn model_name(&self) -> &str {
    &self.name
  }
}
