//! CLI: Answer one stock question from local market data.
//!
//! Usage: `stock_search [OPTIONS] <query>`
//! Example: stock_search "2025-11-06 KOSPI 상승률 상위 10개 종목은?"
//!
//! Set RUST_LOG=stock_search_agent=trace for TRACE-level span enter/exit and events.

use std::env;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use stock_search_agent::config::{
  ENV_COMPANY_CSV, ENV_MARKET_DB, ENV_STOCK_DB, ENV_TECHNICAL_DB,
};
use stock_search_agent::{AgentConfig, SearchResponse, StockSearchAgent, write_run_report};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

/// Answer a natural-language stock question.
#[derive(Parser, Debug)]
#[command(name = "stock_search")]
#[command(
  after_help = r#"Environment variables (override the matching flags when set):
  CLOVASTUDIO_API_KEY            API key for CLOVA Studio (required).
  CLOVASTUDIO_ENDPOINT           Endpoint base URL.
  STOCK_DB_PATH                  Daily price database.
  MARKET_DB_PATH                 Market index database.
  TECHNICAL_DB_PATH              Technical indicator database.
  COMPANY_CSV_PATH               Company directory CSV (ticker, stock_name, market_type).
  STOCK_AGENT_MAIN_MODEL         Model proposing calls and writing answers (default HCX-007).
  STOCK_AGENT_SIMPLE_MODEL       Model extracting tool parameters (default HCX-005).
  STOCK_AGENT_SQL_POLICY         allow_list (default) or trust_model.
  STOCK_AGENT_DETAILED_LOGGING   true/false.

Examples:
  stock_search "삼성전자의 2025-11-06 종가는?"
  stock_search --detailed --report runs/report.json "2025-11-06 RSI 70 이상 과매수 종목은?""#
)]
struct Args {
  /// Print the run report as JSON instead of the answer alone.
  #[arg(long)]
  detailed: bool,

  /// Also write the run report to this path.
  #[arg(long, value_name = "PATH")]
  report: Option<PathBuf>,

  /// Daily price database. Overridden by STOCK_DB_PATH if set.
  #[arg(long, value_name = "PATH")]
  stock_db: Option<PathBuf>,

  /// Market index database. Overridden by MARKET_DB_PATH if set.
  #[arg(long, value_name = "PATH")]
  market_db: Option<PathBuf>,

  /// Technical indicator database. Overridden by TECHNICAL_DB_PATH if set.
  #[arg(long, value_name = "PATH")]
  technical_db: Option<PathBuf>,

  /// Company directory CSV. Overridden by COMPANY_CSV_PATH if set.
  #[arg(long, value_name = "PATH")]
  company_csv: Option<PathBuf>,

  /// The question to answer
  #[arg(value_name = "query", required = true, num_args = 1..)]
  query: Vec<String>,
}

impl Args {
  /// Flags over defaults; the environment is applied afterwards and wins.
  fn base_config(&self) -> AgentConfig {
    let mut config = AgentConfig::default();
    let flags = [
      (&self.stock_db, &mut config.stock_db_path),
      (&self.market_db, &mut config.market_db_path),
      (&self.technical_db, &mut config.technical_db_path),
      (&self.company_csv, &mut config.company_csv_path),
    ];
    for (flag, slot) in flags {
      if let Some(path) = flag {
        *slot = path.clone();
      }
    }
    config
  }
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
    .with_writer(std::io::stderr)
    .init();

  info!("stock_search starting");
  let args = Args::parse();

  let config = match args.base_config().apply_env_overrides() {
    Ok(c) => c,
    Err(e) => {
      eprintln!("Error: {e}");
      process::exit(2);
    }
  };
  info!(
    stock_db = %config.stock_db_path.display(),
    market_db = %config.market_db_path.display(),
    technical_db = %config.technical_db_path.display(),
    company_csv = %config.company_csv_path.display(),
    env_stock_db = env::var(ENV_STOCK_DB).is_ok(),
    env_market_db = env::var(ENV_MARKET_DB).is_ok(),
    env_technical_db = env::var(ENV_TECHNICAL_DB).is_ok(),
    env_company_csv = env::var(ENV_COMPANY_CSV).is_ok(),
    "options (env or flags)"
  );

  let agent = match StockSearchAgent::from_config(&config) {
    Ok(a) => a,
    Err(e) => {
      eprintln!("Error: {e}");
      process::exit(2);
    }
  };

  let query = args.query.join(" ");
  let wants_report = args.detailed || args.report.is_some();
  let response = agent.search(&query, wants_report).await;

  if let (Some(path), Some(report)) = (&args.report, response.report()) {
    if let Err(e) = write_run_report(path, report) {
      eprintln!("Error writing report to {}: {}", path.display(), e);
      process::exit(1);
    }
    info!(path = %path.display(), "run report written");
  }

  match (&response, args.detailed) {
    (SearchResponse::Detailed(report), true) => match serde_json::to_string_pretty(report) {
      Ok(json) => println!("{json}"),
      Err(e) => {
        eprintln!("Error serializing report: {e}");
        process::exit(1);
      }
    },
    _ => println!("{}", response.final_result()),
  }

  let failed = response.report().is_some_and(|r| r.is_error())
    || response.final_result().starts_with("검색 중 오류 발생");
  if failed {
    process::exit(1);
  }
}
