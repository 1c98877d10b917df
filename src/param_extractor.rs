//! Turns a natural-language tool argument into typed parameters via a model call.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::llm::LanguageModel;

static FIRST_OBJECT: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"\{[^{}]*(?:\{[^{}]*\}[^{}]*)*\}").expect("object pattern"));

/// Builds the extraction prompt for one handler's schema and rules.
pub fn build_extraction_prompt(question: &str, schema: &str, rules: &str) -> String {
  format!(
    "다음 질문에서 필요한 파라미터를 추출하세요:\n\
     주의: 학습된 날짜 이후의 파라미터를 추출해야 할 수도 있습니다.\n\n\
     질문: {question}\n\n\
     JSON으로만 응답: {schema}\n\n\
     {rules}\n\n\
     반드시 JSON 형식으로만 응답하고 다른 설명은 하지 마세요."
  )
}

/// Decodes the first balanced object in `reply`, then the whole trimmed reply.
pub fn decode_params(reply: &str) -> Option<Map<String, Value>> {
  let reply = reply.trim();
  let from_span = FIRST_OBJECT
    .find(reply)
    .and_then(|m| serde_json::from_str::<Value>(m.as_str()).ok());
  match from_span.or_else(|| serde_json::from_str::<Value>(reply).ok()) {
    Some(Value::Object(map)) => Some(map),
    _ => None,
  }
}

/// Extracted parameters with null-aware typed accessors. A JSON `null` counts as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Map<String, Value>);

impl Params {
  pub fn new(map: Map<String, Value>) -> Self {
    Self(map)
  }

  fn present(&self, key: &str) -> Option<&Value> {
    self.0.get(key).filter(|v| !v.is_null())
  }

  /// String value; numbers are rendered as text.
  pub fn opt_str(&self, key: &str) -> Option<String> {
    match self.present(key)? {
      Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
      Value::Number(n) => Some(n.to_string()),
      _ => None,
    }
  }

  pub fn str_or(&self, key: &str, default: &str) -> String {
    self.opt_str(key).unwrap_or_else(|| default.to_string())
  }

  /// Numeric value; numeric strings such as `"70"` are accepted.
  pub fn opt_f64(&self, key: &str) -> Option<f64> {
    match self.present(key)? {
      Value::Number(n) => n.as_f64(),
      Value::String(s) => s.trim().replace(',', "").parse().ok(),
      _ => None,
    }
  }

  pub fn f64_or(&self, key: &str, default: f64) -> f64 {
    self.opt_f64(key).unwrap_or(default)
  }

  pub fn opt_i64(&self, key: &str) -> Option<i64> {
    self.opt_f64(key).map(|v| v.round() as i64)
  }

  pub fn i64_or(&self, key: &str, default: i64) -> i64 {
    self.opt_i64(key).unwrap_or(default)
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

/// Model-backed parameter extraction shared by all tool handlers.
#[derive(Clone)]
pub struct ParamExtractor {
  model: Arc<dyn LanguageModel>,
}

impl ParamExtractor {
  pub fn new(model: Arc<dyn LanguageModel>) -> Self {
    Self { model }
  }

  /// Asks the model for parameters. A failed call or an undecodable reply yields empty
  /// params and a warning; handlers then fall back to their defaults.
  #[instrument(level = "trace", skip(self, schema, rules))]
  pub async fn extract(&self, question: &str, schema: &str, rules: &str) -> Params {
    let prompt = build_extraction_prompt(question, schema, rules);
    let reply = match self.model.complete(&prompt).await {
      Ok(reply) => reply,
      Err(e) => {
        warn!(error = %e, "parameter extraction call failed, using defaults");
        return Params::default();
      }
    };
    match decode_params(&reply) {
      Some(map) => {
        debug!(keys = map.len(), "extracted parameters");
        Params::new(map)
      }
      None => {
        warn!(reply = %reply, "parameter extraction failed, using defaults");
        Params::default()
      }
    }
  }
}
