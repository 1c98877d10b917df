//! Tests for `MarketDb` reads and dynamic row decoding.

use super::{Source, SqlParam, SqlValue};
use crate::test_support::fixture;

#[tokio::test]
async fn fetch_binds_params_and_decodes_types() {
  let f = fixture().await;
  let rows = f
    .db
    .fetch(
      Source::Prices,
      "SELECT stock_name, close_price, trading_volume, prev_close_price FROM stock_prices \
       WHERE trading_date = ? AND ticker = ?",
      &["2025-11-06".into(), "005930.KS".into()],
    )
    .await
    .unwrap();
  assert_eq!(rows.len(), 1);
  let r = &rows[0];
  assert_eq!(r.get("stock_name"), Some(&SqlValue::Text("삼성전자".to_string())));
  assert_eq!(r.get("close_price"), Some(&SqlValue::Real(101000.0)));
  assert_eq!(r.get("trading_volume"), Some(&SqlValue::Integer(20_000_000)));
  assert_eq!(r.get("prev_close_price"), Some(&SqlValue::Null));
  assert_eq!(r.i64("close_price"), Some(101000));
}

#[tokio::test]
async fn numeric_params_bind() {
  let f = fixture().await;
  let rows = f
    .db
    .fetch(
      Source::Technical,
      "SELECT ticker FROM technical_indicators WHERE rsi >= ? AND trading_volume >= ? ORDER BY rsi DESC",
      &[SqlParam::Real(70.0), SqlParam::Integer(1_000_000)],
    )
    .await
    .unwrap();
  let tickers: Vec<_> = rows.iter().filter_map(|r| r.text("ticker")).collect();
  assert_eq!(tickers, vec!["000660.KS", "005930.KS"]);
}

#[tokio::test]
async fn index_source_reads_market_index() {
  let f = fixture().await;
  let row = f
    .db
    .fetch_one(
      Source::Index,
      "SELECT close_price FROM market_index WHERE market_index_name = ?",
      &["KOSDAQ".into()],
    )
    .await
    .unwrap()
    .unwrap();
  assert_eq!(row.f64("close_price"), Some(901.89));
}

#[tokio::test]
async fn indicators_attach_for_joins() {
  let f = fixture().await;
  let rows = f
    .db
    .fetch_with_indicators(
      "SELECT sp.stock_name, ti.rsi FROM stock_prices sp \
       JOIN tech.technical_indicators ti ON sp.ticker = ti.ticker AND sp.trading_date = ti.trading_date \
       WHERE sp.trading_date = ? AND ti.rsi <= ?",
      &["2025-11-06".into(), SqlParam::Real(30.0)],
    )
    .await
    .unwrap();
  assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn connections_are_read_only() {
  let f = fixture().await;
  let err = f
    .db
    .fetch(Source::Prices, "DELETE FROM stock_prices", &[])
    .await;
  assert!(err.is_err());
}

#[tokio::test]
async fn missing_database_is_an_error() {
  let db = super::MarketDb::new("/nonexistent/a.db", "/nonexistent/b.db", "/nonexistent/c.db");
  assert!(db.fetch(Source::Prices, "SELECT 1", &[]).await.is_err());
}
