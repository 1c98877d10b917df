//! Read access to the local market data: price, index, and indicator databases plus the
//! company directory.

mod company;
mod database;
#[cfg(test)]
mod database_test;

use std::fmt;

pub use company::{Companies, Company, CompanyDirectory};
pub use database::{MarketDb, Record, Source, SqlParam, SqlValue};

/// Exchange segment, identified in tickers by suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Market {
  Kospi,
  Kosdaq,
}

impl Market {
  /// Parses a user- or model-supplied market name. Placeholders such as `null` or
  /// `KOSPI|KOSDAQ|null` yield `None`.
  pub fn parse(raw: &str) -> Option<Market> {
    match raw.trim().to_uppercase().as_str() {
      "KOSPI" | "코스피" => Some(Market::Kospi),
      "KOSDAQ" | "코스닥" => Some(Market::Kosdaq),
      _ => None,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Market::Kospi => "KOSPI",
      Market::Kosdaq => "KOSDAQ",
    }
  }

  /// `LIKE` pattern matching this market's tickers.
  pub fn ticker_pattern(self) -> &'static str {
    match self {
      Market::Kospi => "%.KS",
      Market::Kosdaq => "%.KQ",
    }
  }
}

impl fmt::Display for Market {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

/// Ticker suffixes tried, in order, for a bare code such as `005930`.
pub const TICKER_SUFFIXES: [&str; 3] = [".KS", ".KQ", ".KN"];

/// Expands a bare code into suffixed candidates; tickers that already carry a suffix are
/// returned as-is.
pub fn ticker_candidates(ticker: &str) -> Vec<String> {
  if ticker.contains('.') {
    vec![ticker.to_string()]
  } else {
    TICKER_SUFFIXES.iter().map(|s| format!("{ticker}{s}")).collect()
  }
}
