//! Natural-language questions answered by model-written SQL over `stock_prices`.
//!
//! The model writes the statement, [`validate`] gates it according to the [`SqlPolicy`],
//! and the rows are rendered as text. Every failure on this path is reported inline as
//! answer text.

mod extract;
mod format;
mod prompt;
mod schema;
mod validate;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::error::SqlError;
use crate::llm::LanguageModel;
use crate::market::{MarketDb, Source};

pub use extract::extract_sql;
pub use format::{MAX_ROWS, format_rows};
pub use prompt::build_sql_prompt;
pub use schema::{STOCK_PRICES_DDL, TOPICS, Topic, build_schema};
pub use validate::{ALLOWED_TABLE, SqlPolicy, validate};

/// Category used when the orchestrator routes a call to the SQL path.
pub const DEFAULT_CATEGORY: &str = "복합조건";

/// Answers a question with generated SQL. Never fails; faults come back as text.
#[async_trait]
pub trait SqlAnswerer: Send + Sync {
  async fn synthesize(&self, question: &str, topic_hints: &[&str], category: &str) -> String;
}

/// Model-backed [`SqlAnswerer`] reading the price database.
#[derive(Clone)]
pub struct SqlSynthesizer {
  model: Arc<dyn LanguageModel>,
  db: MarketDb,
  policy: SqlPolicy,
}

impl SqlSynthesizer {
  pub fn new(model: Arc<dyn LanguageModel>, db: MarketDb) -> Self {
    Self {
      model,
      db,
      policy: SqlPolicy::default(),
    }
  }

  pub fn with_policy(mut self, policy: SqlPolicy) -> Self {
    self.policy = policy;
    self
  }

  pub fn policy(&self) -> SqlPolicy {
    self.policy
  }

  /// Fallible pipeline behind [`SqlAnswerer::synthesize`].
  pub async fn try_synthesize(
    &self,
    question: &str,
    topic_hints: &[&str],
    category: &str,
  ) -> Result<String, SqlError> {
    let schema = build_schema(topic_hints, category);
    let reply = self
      .model
      .complete(&build_sql_prompt(question, &schema))
      .await?;
    let sql = extract_sql(&reply).ok_or(SqlError::NoStatement)?;
    info!(sql = %sql, "generated sql");
    self.policy.check(&sql)?;
    let rows = self.db.fetch(Source::Prices, &sql, &[]).await?;
    Ok(format_rows(&rows, question))
  }
}

#[async_trait]
impl SqlAnswerer for SqlSynthesizer {
  #[instrument(level = "trace", skip(self))]
  async fn synthesize(&self, question: &str, topic_hints: &[&str], category: &str) -> String {
    match self.try_synthesize(question, topic_hints, category).await {
      Ok(text) => text,
      Err(e) => {
        warn!(error = %e, "sql synthesis failed");
        format!("TEXT2SQL 실행 중 오류 발생: {e}")
      }
    }
  }
}
