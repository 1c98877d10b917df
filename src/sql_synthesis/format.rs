//! Renders generated-query rows as numbered, labeled lines.

use crate::format::{shares, signed_pct, won};
use crate::market::{Record, SqlValue};

/// Rows shown before the listing is cut off.
pub const MAX_ROWS: usize = 50;

const PRICE_COLUMNS: [&str; 4] = ["close_price", "open_price", "high_price", "low_price"];

fn label(column: &str) -> &str {
  match column {
    "stock_name" => "종목명",
    "close_price" => "종가",
    "open_price" => "시가",
    "high_price" => "고가",
    "low_price" => "저가",
    "change_rate" => "등락률",
    "trading_volume" => "거래량",
    "trading_date" => "날짜",
    "ticker" => "종목코드",
    other => other,
  }
}

fn render(column: &str, value: &SqlValue) -> String {
  let numeric = value.as_f64().filter(|_| !matches!(value, SqlValue::Text(_)));
  match (column, numeric) {
    (c, Some(v)) if PRICE_COLUMNS.contains(&c) => won(v),
    ("change_rate", Some(v)) => signed_pct(v),
    ("trading_volume", Some(v)) => shares(v.round() as i64),
    _ => value.to_string(),
  }
}

/// Formats query results. No rows yields the "nothing matched" sentence for `question`.
pub fn format_rows(rows: &[Record], question: &str) -> String {
  if rows.is_empty() {
    return format!("'{question}' 조건에 맞는 종목이 없습니다.");
  }
  let mut lines = vec![format!("조건을 만족하는 종목 {}개:", rows.len()), String::new()];
  for (i, row) in rows.iter().take(MAX_ROWS).enumerate() {
    let parts: Vec<String> = row
      .fields()
      .iter()
      .map(|(column, value)| format!("{}: {}", label(column), render(column, value)))
      .collect();
    lines.push(format!("{}. {}", i + 1, parts.join(" / ")));
  }
  if rows.len() > MAX_ROWS {
    lines.push(format!("\n... 총 {}개 중 상위 {MAX_ROWS}개만 표시", rows.len()));
  }
  lines.join("\n")
}
