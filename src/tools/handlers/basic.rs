//! Lookups: single-stock prices, market statistics, index values, company search, and the
//! trading value ranking.

use tracing::instrument;

use super::{DEFAULT_DATE, date_missing, limit_param, normalize_date};
use crate::error::ToolFault;
use crate::format::{shares, won};
use crate::market::{Market, Source, SqlParam, ticker_candidates};
use crate::tools::StockTools;
use crate::types::ToolOutput;

#[instrument(level = "trace", skip(tools))]
pub(crate) async fn stock_price(tools: &StockTools, args: &str) -> Result<ToolOutput, ToolFault> {
  let p = tools
    .params(
      args,
      r#"{"ticker": "종목코드나종목명", "date": "YYYY-MM-DD"}"#,
      &format!("종목명인 경우 그대로 유지하고, 질문에 날짜가 명시되어 있지 않으면 '{DEFAULT_DATE}' 사용"),
    )
    .await;
  let raw_date = p.str_or("date", DEFAULT_DATE);
  let Some(date) = normalize_date(&raw_date) else {
    return Ok(date_missing(&raw_date));
  };
  let requested = p.str_or("ticker", "005930");
  let ticker = tools.companies().await?.resolve_ticker(&requested).unwrap_or(requested);

  for candidate in ticker_candidates(&ticker) {
    let row = tools
      .db()
      .fetch_one(
        Source::Prices,
        "SELECT stock_name, trading_date, open_price, high_price, low_price, close_price, \
         trading_volume, change_rate FROM stock_prices WHERE ticker = ? AND trading_date = ?",
        &[candidate.into(), date.as_str().into()],
      )
      .await?;
    if let Some(r) = row {
      let name = r.text("stock_name").unwrap_or_else(|| ticker.clone());
      let day = r.text("trading_date").unwrap_or_else(|| date.clone());
      return Ok(ToolOutput::ok(format!(
        "{name}의 {day} 가격 정보:\n\
         - 시가: {}\n\
         - 고가: {}\n\
         - 저가: {}\n\
         - 종가: {}\n\
         - 거래량: {}\n\
         - 등락률: {:.2}%",
        won(r.f64("open_price").unwrap_or_default()),
        won(r.f64("high_price").unwrap_or_default()),
        won(r.f64("low_price").unwrap_or_default()),
        won(r.f64("close_price").unwrap_or_default()),
        shares(r.i64("trading_volume").unwrap_or_default()),
        r.f64("change_rate").unwrap_or_default(),
      )));
    }
  }
  Ok(ToolOutput::ok(format!(
    "{ticker} 종목의 {date} 가격 정보를 찾을 수 없습니다."
  )))
}

#[instrument(level = "trace", skip(tools))]
pub(crate) async fn market_stats(tools: &StockTools, args: &str) -> Result<ToolOutput, ToolFault> {
  let p = tools
    .params(
      args,
      r#"{"date": "YYYY-MM-DD"}"#,
      &format!("질문에 날짜가 명시되어 있지 않으면 '{DEFAULT_DATE}' 사용"),
    )
    .await;
  let raw_date = p.str_or("date", DEFAULT_DATE);
  let Some(date) = normalize_date(&raw_date) else {
    return Ok(date_missing(&raw_date));
  };
  let day: [SqlParam; 1] = [date.as_str().into()];

  let overall = tools
    .db()
    .fetch_one(
      Source::Prices,
      "SELECT COUNT(DISTINCT ticker) AS total_stocks, AVG(change_rate) AS avg_change_rate, \
       MAX(change_rate) AS max_change_rate, MIN(change_rate) AS min_change_rate, \
       SUM(CASE WHEN change_rate > 0 THEN 1 ELSE 0 END) AS up_stocks, \
       SUM(CASE WHEN change_rate < 0 THEN 1 ELSE 0 END) AS down_stocks, \
       SUM(trading_volume * close_price) AS total_trading_value, \
       AVG(CASE WHEN change_rate > 0 THEN change_rate END) AS up_avg_change_rate, \
       AVG(CASE WHEN change_rate < 0 THEN change_rate END) AS down_avg_change_rate \
       FROM stock_prices WHERE trading_date = ?",
      &day,
    )
    .await?
    .unwrap_or_default();
  let total = overall.i64("total_stocks").unwrap_or_default();
  if total == 0 {
    return Ok(ToolOutput::ok(format!(
      "{date}의 시장 통계 데이터를 찾을 수 없습니다."
    )));
  }

  let per_market = tools
    .db()
    .fetch(
      Source::Prices,
      "SELECT market, COUNT(*) AS count, AVG(change_rate) AS avg_change_rate \
       FROM stock_prices WHERE trading_date = ? GROUP BY market",
      &day,
    )
    .await?;
  let market_row = |m: Market| {
    per_market
      .iter()
      .find(|r| r.text("market").as_deref() == Some(m.label()))
  };
  let count = |m: Market| market_row(m).and_then(|r| r.i64("count")).unwrap_or_default();
  let avg = |m: Market| {
    market_row(m)
      .and_then(|r| r.f64("avg_change_rate"))
      .unwrap_or_default()
  };

  let up = overall.i64("up_stocks").unwrap_or_default();
  let down = overall.i64("down_stocks").unwrap_or_default();
  let rate = |column: &str| overall.f64(column).unwrap_or_default();

  let lines = [
    format!("{date} 시장 통계:"),
    format!("- 전체 종목수: {total}개"),
    format!("- 상승 종목수: {up}개"),
    format!("- 하락 종목수: {down}개"),
    format!("- 보합 종목수: {}개", total - up - down),
    format!("- KOSPI 종목수: {}개", count(Market::Kospi)),
    format!("- KOSDAQ 종목수: {}개", count(Market::Kosdaq)),
    format!("- **시장 평균 등락률: {:.4}%**", rate("avg_change_rate")),
    format!("- 최고 등락률: {:.4}%", rate("max_change_rate")),
    format!("- 최저 등락률: {:.4}%", rate("min_change_rate")),
    format!("- 상승 종목 평균 등락률: {:.4}%", rate("up_avg_change_rate")),
    format!("- 하락 종목 평균 등락률: {:.4}%", rate("down_avg_change_rate")),
    format!("- KOSPI 평균 등락률: {:.4}%", avg(Market::Kospi)),
    format!("- KOSDAQ 평균 등락률: {:.4}%", avg(Market::Kosdaq)),
    format!("- 전체 거래대금: {}", won(rate("total_trading_value"))),
  ];
  Ok(ToolOutput::ok(lines.join("\n")))
}

#[instrument(level = "trace", skip(tools))]
pub(crate) async fn market_index(tools: &StockTools, args: &str) -> Result<ToolOutput, ToolFault> {
  let p = tools
    .params(
      args,
      r#"{"date": "YYYY-MM-DD", "market": "KOSPI"}"#,
      &format!(
        "규칙:\n\
         - date: 질문에 날짜가 명시되어 있지 않으면 \"{DEFAULT_DATE}\" 사용\n\
         - market: \"KOSPI\" 또는 \"KOSDAQ\" (기본값: \"KOSPI\")\n  \
         예: \"KOSDAQ 지수\", \"코스닥\" → \"KOSDAQ\"\n  \
         예: \"KOSPI 지수\", \"코스피\" → \"KOSPI\""
      ),
    )
    .await;
  let raw_date = p.str_or("date", DEFAULT_DATE);
  let Some(date) = normalize_date(&raw_date) else {
    return Ok(date_missing(&raw_date));
  };
  let market = p
    .opt_str("market")
    .and_then(|m| Market::parse(&m))
    .unwrap_or(Market::Kospi);

  let rows = tools
    .db()
    .fetch(
      Source::Index,
      "SELECT market_index_name, close_price FROM market_index WHERE trading_date = ?",
      &[date.as_str().into()],
    )
    .await?;
  if rows.is_empty() {
    return Ok(ToolOutput::ok(format!(
      "{date}의 시장 지수 데이터를 찾을 수 없습니다."
    )));
  }
  let value = rows
    .iter()
    .find(|r| r.text("market_index_name").as_deref() == Some(market.label()))
    .and_then(|r| r.f64("close_price"));
  Ok(ToolOutput::ok(match value {
    Some(v) => format!("{date} {market} 지수: {v:.2}"),
    None => format!("{date}의 {market} 지수 데이터를 찾을 수 없습니다."),
  }))
}

/// Searches the directory with the raw argument; no extraction call.
#[instrument(level = "trace", skip(tools))]
pub(crate) async fn company_search(tools: &StockTools, args: &str) -> Result<ToolOutput, ToolFault> {
  let name = args.trim();
  let companies = tools.companies().await?;
  let hits = companies.search_by_name(name);
  if hits.is_empty() {
    return Ok(ToolOutput::ok(format!(
      "'{name}' 관련 종목을 찾을 수 없습니다."
    )));
  }
  let mut lines = vec![format!("'{name}' 검색 결과:")];
  lines.extend(
    hits
      .iter()
      .map(|c| format!("- {} ({}) - {}", c.stock_name, c.ticker, c.market_type)),
  );
  Ok(ToolOutput::ok(lines.join("\n")))
}

#[instrument(level = "trace", skip(tools))]
pub(crate) async fn trading_value_ranking(
  tools: &StockTools,
  args: &str,
) -> Result<ToolOutput, ToolFault> {
  let p = tools
    .params(
      args,
      r#"{"date": "YYYY-MM-DD", "limit": 10}"#,
      &format!("질문에 날짜가 명시되어 있지 않으면 '{DEFAULT_DATE}', 개수가 없으면 10 사용"),
    )
    .await;
  let raw_date = p.str_or("date", DEFAULT_DATE);
  let Some(date) = normalize_date(&raw_date) else {
    return Ok(date_missing(&raw_date));
  };
  let limit = limit_param(p.i64_or("limit", 10));

  let rows = tools
    .db()
    .fetch(
      Source::Prices,
      "SELECT stock_name, (close_price * trading_volume) AS trading_value FROM stock_prices \
       WHERE trading_date = ? ORDER BY trading_value DESC LIMIT ?",
      &[date.as_str().into(), limit.into()],
    )
    .await?;
  if rows.is_empty() {
    return Ok(ToolOutput::ok(format!(
      "{date}에 거래대금 데이터를 찾을 수 없습니다."
    )));
  }
  let items: Vec<String> = rows
    .iter()
    .map(|r| {
      let eok = r.f64("trading_value").unwrap_or_default() / 100_000_000.0;
      format!("{}({eok:.0}억원)", r.text("stock_name").unwrap_or_default())
    })
    .collect();
  Ok(ToolOutput::ok(format!(
    "{date} 거래대금 상위 {}개: {}",
    rows.len(),
    items.join(", ")
  )))
}
