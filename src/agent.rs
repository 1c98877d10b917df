//! The stock search agent: one immutable context, one fresh [`RunState`] per query.

use std::sync::Arc;

use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::llm::{ClovaModel, LanguageModel};
use crate::market::{CompanyDirectory, MarketDb};
use crate::nodes::{RunSummary, StageServices, run_execution_loop_once};
use crate::param_extractor::ParamExtractor;
use crate::report::RunReport;
use crate::sql_synthesis::{SqlAnswerer, SqlSynthesizer};
use crate::tools::{StockTools, ToolBox};
use crate::types::RunState;

/// Answer used when a run ends without one.
pub const NO_ANSWER: &str = "답변을 생성할 수 없습니다.";

/// What `search` hands back: the answer alone, or the answer with its run report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchResponse {
  Answer(String),
  Detailed(Box<RunReport>),
}

impl SearchResponse {
  pub fn final_result(&self) -> &str {
    match self {
      SearchResponse::Answer(text) => text,
      SearchResponse::Detailed(report) => &report.final_result,
    }
  }

  pub fn report(&self) -> Option<&RunReport> {
    match self {
      SearchResponse::Answer(_) => None,
      SearchResponse::Detailed(report) => Some(report),
    }
  }
}

/// A finished run: the final state and the path it took.
#[derive(Debug, Clone)]
pub struct CompletedRun {
  pub state: RunState,
  pub summary: RunSummary,
}

impl CompletedRun {
  pub fn final_result(&self) -> &str {
    self.state.final_answer.as_deref().unwrap_or(NO_ANSWER)
  }
}

/// Answers stock questions by running the stage graph over shared models, tools and SQL.
#[derive(Clone)]
pub struct StockSearchAgent {
  model: Arc<dyn LanguageModel>,
  tools: Arc<dyn ToolBox>,
  sql: Arc<dyn SqlAnswerer>,
  detailed_logging: bool,
  today: Option<NaiveDate>,
}

impl StockSearchAgent {
  /// `model` proposes calls and writes the final answer.
  pub fn new(
    model: Arc<dyn LanguageModel>,
    tools: Arc<dyn ToolBox>,
    sql: Arc<dyn SqlAnswerer>,
  ) -> Self {
    Self {
      model,
      tools,
      sql,
      detailed_logging: true,
      today: None,
    }
  }

  pub fn with_detailed_logging(mut self, enabled: bool) -> Self {
    self.detailed_logging = enabled;
    self
  }

  /// Pins the date the propose prompt calls "today". Defaults to the local date.
  pub fn with_today(mut self, today: NaiveDate) -> Self {
    self.today = Some(today);
    self
  }

  /// Builds the CLOVA-backed agent over the configured databases.
  pub fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
    let api_key = config.require_api_key()?;
    let main: Arc<dyn LanguageModel> = Arc::new(ClovaModel::new(
      &config.endpoint,
      api_key,
      &config.main_model,
      config.temperature,
      config.timeout(),
    )?);
    let simple: Arc<dyn LanguageModel> = Arc::new(ClovaModel::new(
      &config.endpoint,
      api_key,
      &config.simple_model,
      config.temperature,
      config.timeout(),
    )?);

    let db = MarketDb::new(
      &config.stock_db_path,
      &config.market_db_path,
      &config.technical_db_path,
    );
    let tools = StockTools::new(
      ParamExtractor::new(simple),
      db.clone(),
      CompanyDirectory::new(&config.company_csv_path),
    );
    let sql = SqlSynthesizer::new(main.clone(), db).with_policy(config.sql_policy);
    info!(
      main_model = %config.main_model,
      simple_model = %config.simple_model,
      sql_policy = ?config.sql_policy,
      "agent configured"
    );
    Ok(Self::new(main, Arc::new(tools), Arc::new(sql)).with_detailed_logging(config.detailed_logging))
  }

  pub fn detailed_logging(&self) -> bool {
    self.detailed_logging
  }

  /// Runs `state` to a terminal stage. Faults abort the run and are returned.
  #[instrument(level = "trace", skip(self, state))]
  pub async fn run(&self, mut state: RunState) -> Result<CompletedRun, AgentError> {
    state.detailed_logging = self.detailed_logging;
    let services = StageServices {
      model: self.model.as_ref(),
      tools: self.tools.as_ref(),
      sql: self.sql.as_ref(),
      today: self.today.unwrap_or_else(|| Local::now().date_naive()),
    };
    let summary = run_execution_loop_once(&services, &mut state).await?;
    Ok(CompletedRun { state, summary })
  }

  /// Answers `query`. Never fails: run faults come back as `"검색 중 오류 발생: {e}"`.
  #[instrument(level = "trace", skip(self))]
  pub async fn search(&self, query: &str, detailed: bool) -> SearchResponse {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    info!(%run_id, query, "search started");
    let detailed = detailed && self.detailed_logging;

    match self.run(RunState::new(query)).await {
      Ok(run) => {
        let answer = run.final_result().to_string();
        info!(%run_id, answer_len = answer.chars().count(), terminal = %run.summary.terminal, "search finished");
        if detailed {
          SearchResponse::Detailed(Box::new(RunReport::from_run(
            run_id, started_at, answer, run.state, run.summary,
          )))
        } else {
          SearchResponse::Answer(answer)
        }
      }
      Err(e) => {
        error!(%run_id, error = %e, "search failed");
        let message = format!("검색 중 오류 발생: {e}");
        if detailed {
          SearchResponse::Detailed(Box::new(RunReport::from_error(
            run_id,
            query,
            started_at,
            message,
            e.to_string(),
          )))
        } else {
          SearchResponse::Answer(message)
        }
      }
    }
  }
}
