//! Tests for `ScriptedModel`.

use super::{LanguageModel, ScriptedModel};
use crate::error::LlmError;

#[tokio::test]
async fn replies_in_queue_order_then_exhausts() {
  let m = ScriptedModel::new("test").with_replies(["one", "two"]);
  assert_eq!(m.complete("a").await.unwrap(), "one");
  assert_eq!(m.complete("b").await.unwrap(), "two");
  assert!(matches!(m.complete("c").await, Err(LlmError::Exhausted)));
  assert_eq!(m.prompts(), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn rules_win_over_queue() {
  let m = ScriptedModel::new("test")
    .with_replies(["queued"])
    .with_rule("파라미터", "{\"date\": \"2025-11-06\"}");
  assert_eq!(
    m.complete("다음 질문에서 필요한 파라미터를 추출하세요").await.unwrap(),
    "{\"date\": \"2025-11-06\"}"
  );
  assert_eq!(m.complete("other").await.unwrap(), "queued");
}

#[tokio::test]
async fn fallback_after_queue() {
  let m = ScriptedModel::new("test").with_fallback("default");
  assert_eq!(m.complete("x").await.unwrap(), "default");
  assert_eq!(m.complete("y").await.unwrap(), "default");
  assert_eq!(m.model_name(), "test");
}
