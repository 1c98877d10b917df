//! Per-tool handlers. Each extracts parameters, applies defaults, runs a parameterized read,
//! and formats the answer text.

pub(crate) mod basic;
pub(crate) mod search;
pub(crate) mod technical;

use chrono::NaiveDate;

use crate::market::{Market, SqlParam};
use crate::types::ToolOutput;

/// Date used when the question names none.
pub(crate) const DEFAULT_DATE: &str = "2025-09-15";

/// Normalizes a date to `YYYY-MM-DD`, accepting a few common separators.
pub(crate) fn normalize_date(raw: &str) -> Option<String> {
  let raw = raw.trim();
  ["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d", "%Y%m%d"]
    .iter()
    .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
    .map(|d| d.format("%Y-%m-%d").to_string())
}

pub(crate) fn date_missing(raw: &str) -> ToolOutput {
  ToolOutput::param_missing(format!(
    "날짜 정보를 찾을 수 없습니다: '{raw}'은(는) YYYY-MM-DD 형식의 날짜가 아닙니다."
  ))
}

/// `AND <column> LIKE ?` plus its parameter, or nothing when no market is set.
pub(crate) fn market_filter(market: Option<Market>, column: &str) -> (String, Vec<SqlParam>) {
  match market {
    Some(m) => (
      format!(" AND {column} LIKE ?"),
      vec![SqlParam::from(m.ticker_pattern())],
    ),
    None => (String::new(), Vec::new()),
  }
}

/// `"KOSPI "` or empty.
pub(crate) fn market_word(market: Option<Market>) -> String {
  market.map(|m| format!("{m} ")).unwrap_or_default()
}

/// `"KOSPI 시장에서 "` or empty.
pub(crate) fn market_scope(market: Option<Market>) -> String {
  market.map(|m| format!("{m} 시장에서 ")).unwrap_or_default()
}

pub(crate) fn limit_param(value: i64) -> i64 {
  value.clamp(1, 500)
}

#[cfg(test)]
mod tests {
  use super::normalize_date;

  #[test]
  fn normalizes_common_date_forms() {
    assert_eq!(normalize_date("2025-11-06").as_deref(), Some("2025-11-06"));
    assert_eq!(normalize_date("2025.11.06").as_deref(), Some("2025-11-06"));
    assert_eq!(normalize_date("20251106").as_deref(), Some("2025-11-06"));
    assert_eq!(normalize_date("YYYY-MM-DD"), None);
    assert_eq!(normalize_date("2025-13-01"), None);
  }
}
