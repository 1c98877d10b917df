//! Seeded SQLite fixtures shared by unit tests.

use std::path::Path;

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection, SqliteConnection};
use tempfile::TempDir;

use crate::market::{CompanyDirectory, MarketDb};

pub(crate) const COMPANY_CSV: &str = "ticker,stock_name,market_type\n\
005930.KS,삼성전자,KOSPI\n\
000660.KS,SK하이닉스,KOSPI\n\
035420.KS,NAVER,KOSPI\n\
247540.KQ,에코프로비엠,KOSDAQ\n\
086520.KQ,에코프로,KOSDAQ\n";

/// (date, ticker, name, market, open, high, low, close, change_rate, volume)
type PriceRow = (&'static str, &'static str, &'static str, &'static str, f64, f64, f64, f64, f64, i64);

pub(crate) const PRICES: [PriceRow; 7] = [
  ("2025-11-05", "005930.KS", "삼성전자", "KOSPI", 99000.0, 100000.0, 98000.0, 99500.0, 0.5, 10_000_000),
  ("2025-11-05", "247540.KQ", "에코프로비엠", "KOSDAQ", 110000.0, 114000.0, 109000.0, 113700.0, 1.0, 1_000_000),
  ("2025-11-06", "005930.KS", "삼성전자", "KOSPI", 100000.0, 102000.0, 99000.0, 101000.0, 1.51, 20_000_000),
  ("2025-11-06", "000660.KS", "SK하이닉스", "KOSPI", 540000.0, 556000.0, 538000.0, 550000.0, 3.2, 5_000_000),
  ("2025-11-06", "035420.KS", "NAVER", "KOSPI", 253000.0, 254000.0, 248000.0, 250000.0, -1.2, 1_000_000),
  ("2025-11-06", "247540.KQ", "에코프로비엠", "KOSDAQ", 114000.0, 121000.0, 113500.0, 120000.0, 5.5, 3_000_000),
  ("2025-11-06", "086520.KQ", "에코프로", "KOSDAQ", 46000.0, 46500.0, 44800.0, 45000.0, -3.0, 800_000),
];

/// (ticker, date, close, volume, rsi, bb_upper, bb_lower, ma5, ma20, ma60, volume_ratio, golden, dead)
type IndicatorRow = (&'static str, &'static str, f64, i64, f64, f64, f64, f64, f64, f64, f64, i64, i64);

pub(crate) const INDICATORS: [IndicatorRow; 6] = [
  ("005930.KS", "2025-11-06", 101000.0, 20_000_000, 72.5, 101020.0, 90000.0, 99000.0, 95000.0, 90000.0, 2.5, 1, 0),
  ("000660.KS", "2025-11-06", 550000.0, 5_000_000, 81.0, 600000.0, 450000.0, 540000.0, 500000.0, 450000.0, 6.0, 0, 0),
  ("035420.KS", "2025-11-06", 250000.0, 1_000_000, 28.0, 280000.0, 249900.0, 255000.0, 260000.0, 240000.0, 0.8, 0, 1),
  ("247540.KQ", "2025-11-06", 120000.0, 3_000_000, 65.0, 130000.0, 100000.0, 115000.0, 110000.0, 100000.0, 5.5, 1, 0),
  ("086520.KQ", "2025-11-06", 45000.0, 800_000, 25.0, 52000.0, 44000.0, 46000.0, 47000.0, 50000.0, 1.0, 0, 0),
  ("005930.KS", "2025-03-10", 56000.0, 15_000_000, 45.0, 60000.0, 52000.0, 55000.0, 56500.0, 58000.0, 1.2, 0, 1),
];

pub(crate) struct Fixture {
  _dir: TempDir,
  pub db: MarketDb,
  pub companies: CompanyDirectory,
}

async fn create(path: &Path) -> SqliteConnection {
  SqliteConnectOptions::new()
    .filename(path)
    .create_if_missing(true)
    .connect()
    .await
    .unwrap()
}

async fn exec(conn: &mut SqliteConnection, sql: &str) {
  sqlx::query(sql).execute(&mut *conn).await.unwrap();
}

/// Creates the three databases and the company CSV in a fresh temp dir.
pub(crate) async fn fixture() -> Fixture {
  let dir = tempfile::tempdir().unwrap();
  let stock = dir.path().join("stock_data.db");
  let market = dir.path().join("market_data.db");
  let technical = dir.path().join("technical_indicators.db");
  let csv = dir.path().join("company_info.csv");

  let mut conn = create(&stock).await;
  exec(
    &mut conn,
    "CREATE TABLE stock_prices (trading_date TEXT, ticker TEXT, stock_name TEXT, market TEXT, \
     open_price REAL, high_price REAL, low_price REAL, close_price REAL, adj_close_price REAL, \
     prev_close_price REAL, change REAL, change_rate REAL, trading_volume INTEGER)",
  )
  .await;
  for (date, ticker, name, mkt, open, high, low, close, rate, volume) in PRICES {
    sqlx::query(
      "INSERT INTO stock_prices (trading_date, ticker, stock_name, market, open_price, high_price, \
       low_price, close_price, adj_close_price, change_rate, trading_volume) \
       VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(date)
    .bind(ticker)
    .bind(name)
    .bind(mkt)
    .bind(open)
    .bind(high)
    .bind(low)
    .bind(close)
    .bind(close)
    .bind(rate)
    .bind(volume)
    .execute(&mut conn)
    .await
    .unwrap();
  }
  conn.close().await.unwrap();

  let mut conn = create(&market).await;
  exec(
    &mut conn,
    "CREATE TABLE market_index (trading_date TEXT, market_index_name TEXT, close_price REAL)",
  )
  .await;
  exec(
    &mut conn,
    "INSERT INTO market_index VALUES ('2025-11-06', 'KOSPI', 4004.42), ('2025-11-06', 'KOSDAQ', 901.89)",
  )
  .await;
  conn.close().await.unwrap();

  let mut conn = create(&technical).await;
  exec(
    &mut conn,
    "CREATE TABLE technical_indicators (ticker TEXT, trading_date TEXT, close_price REAL, \
     trading_volume INTEGER, rsi REAL, bb_upper REAL, bb_middle REAL, bb_lower REAL, ma5 REAL, \
     ma20 REAL, ma60 REAL, volume_ratio REAL, golden_cross INTEGER, dead_cross INTEGER)",
  )
  .await;
  for (ticker, date, close, volume, rsi, upper, lower, ma5, ma20, ma60, ratio, golden, dead) in INDICATORS {
    sqlx::query(
      "INSERT INTO technical_indicators VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(ticker)
    .bind(date)
    .bind(close)
    .bind(volume)
    .bind(rsi)
    .bind(upper)
    .bind((upper + lower) / 2.0)
    .bind(lower)
    .bind(ma5)
    .bind(ma20)
    .bind(ma60)
    .bind(ratio)
    .bind(golden)
    .bind(dead)
    .execute(&mut conn)
    .await
    .unwrap();
  }
  conn.close().await.unwrap();

  tokio::fs::write(&csv, COMPANY_CSV).await.unwrap();

  Fixture {
    db: MarketDb::new(&stock, &market, &technical),
    companies: CompanyDirectory::new(&csv),
    _dir: dir,
  }
}
