//! CLOVA Studio chat-completions client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::LanguageModel;
use crate::error::LlmError;

pub const DEFAULT_CLOVA_ENDPOINT: &str = "https://clovastudio.stream.ntruss.com";

const MAX_TOKENS: u32 = 4096;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest<'a> {
  messages: [ChatMessage<'a>; 1],
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_tokens: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_completion_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
  role: &'static str,
  content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
  result: Option<ChatResult>,
}

#[derive(Debug, Deserialize)]
struct ChatResult {
  message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
  content: String,
}

/// Client for one CLOVA Studio model.
#[derive(Debug, Clone)]
pub struct ClovaModel {
  client: Client,
  endpoint: String,
  api_key: String,
  model: String,
  temperature: f32,
}

impl ClovaModel {
  pub fn new(
    endpoint: impl Into<String>,
    api_key: impl Into<String>,
    model: impl Into<String>,
    temperature: f32,
    timeout: Duration,
  ) -> Result<Self, LlmError> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self {
      client,
      endpoint: endpoint.into().trim_end_matches('/').to_string(),
      api_key: api_key.into(),
      model: model.into(),
      temperature,
    })
  }

  fn url(&self) -> String {
    format!("{}/v3/chat-completions/{}", self.endpoint, self.model)
  }

  /// Reasoning models (HCX-007) take `maxCompletionTokens` instead of `maxTokens`.
  fn request<'a>(&self, prompt: &'a str) -> ChatRequest<'a> {
    let reasoning = self.model.starts_with("HCX-007");
    ChatRequest {
      messages: [ChatMessage {
        role: "user",
        content: prompt,
      }],
      temperature: self.temperature,
      max_tokens: (!reasoning).then_some(MAX_TOKENS),
      max_completion_tokens: reasoning.then_some(MAX_TOKENS),
    }
  }
}

#[async_trait]
impl LanguageModel for ClovaModel {
  #[instrument(level = "trace", skip(self, prompt), fields(model = %self.model))]
  async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
    debug!(prompt_len = prompt.chars().count(), "calling model");
    let response = self
      .client
      .post(self.url())
      .bearer_auth(&self.api_key)
      .json(&self.request(prompt))
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(LlmError::Status {
        status: status.as_u16(),
        body,
      });
    }

    let parsed: ChatResponse = response.json().await?;
    parsed
      .result
      .map(|r| r.message.content)
      .ok_or_else(|| LlmError::MalformedResponse("missing result.message.content".to_string()))
  }

  fn model_name(&self) -> &str {
    &self.model
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use super::ClovaModel;

  fn model(name: &str) -> ClovaModel {
    ClovaModel::new("https://example.test/", "key", name, 0.1, Duration::from_secs(5)).unwrap()
  }

  #[test]
  fn url_includes_model_and_trims_slash() {
    assert_eq!(
      model("HCX-005").url(),
      "https://example.test/v3/chat-completions/HCX-005"
    );
  }

  #[test]
  fn reasoning_model_uses_completion_tokens() {
    let body = serde_json::to_value(model("HCX-007").request("hi")).unwrap();
    assert!(body.get("maxCompletionTokens").is_some());
    assert!(body.get("maxTokens").is_none());
    assert_eq!(body["messages"][0]["role"], "user");
    assert_eq!(body["messages"][0]["content"], "hi");

    let body = serde_json::to_value(model("HCX-005").request("hi")).unwrap();
    assert!(body.get("maxTokens").is_some());
    assert!(body.get("maxCompletionTokens").is_none());
  }

  #[test]
  fn response_content_is_read_from_result_message() {
    let raw = r#"{"status":{"code":"20000"},"result":{"message":{"role":"assistant","content":"답변"}}}"#;
    let parsed: super::ChatResponse = serde_json::from_str(raw).unwrap();
    assert_eq!(parsed.result.unwrap().message.content, "답변");
  }
}
