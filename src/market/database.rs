//! Parameterized read-only queries over the three SQLite databases.
//!
//! Every query opens its own connection and closes it before returning.

use std::path::{Path, PathBuf};

use sqlx::sqlite::{SqliteConnectOptions, SqliteRow};
use sqlx::{Column, ConnectOptions, Connection, Row, SqliteConnection, TypeInfo, ValueRef};
use tracing::{debug, instrument};

/// Which database a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
  /// `stock_prices`
  Prices,
  /// `market_index`
  Index,
  /// `technical_indicators`
  Technical,
}

/// A dynamically typed SQLite value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
  Null,
  Integer(i64),
  Real(f64),
  Text(String),
}

impl SqlValue {
  pub fn as_f64(&self) -> Option<f64> {
    match self {
      SqlValue::Integer(i) => Some(*i as f64),
      SqlValue::Real(r) => Some(*r),
      SqlValue::Text(t) => t.trim().parse().ok(),
      SqlValue::Null => None,
    }
  }

  pub fn as_i64(&self) -> Option<i64> {
    match self {
      SqlValue::Integer(i) => Some(*i),
      SqlValue::Real(r) => Some(r.round() as i64),
      SqlValue::Text(t) => t.trim().parse().ok(),
      SqlValue::Null => None,
    }
  }
}

impl std::fmt::Display for SqlValue {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      SqlValue::Null => f.write_str("None"),
      SqlValue::Integer(i) => write!(f, "{i}"),
      SqlValue::Real(r) if r.fract() == 0.0 && r.is_finite() => write!(f, "{r:.1}"),
      SqlValue::Real(r) => write!(f, "{r}"),
      SqlValue::Text(t) => f.write_str(t),
    }
  }
}

/// One result row: column names with values, in select order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
  fields: Vec<(String, SqlValue)>,
}

impl Record {
  pub fn new(fields: Vec<(String, SqlValue)>) -> Self {
    Self { fields }
  }

  pub fn get(&self, column: &str) -> Option<&SqlValue> {
    self
      .fields
      .iter()
      .find(|(name, _)| name == column)
      .map(|(_, v)| v)
  }

  pub fn f64(&self, column: &str) -> Option<f64> {
    self.get(column).and_then(SqlValue::as_f64)
  }

  pub fn i64(&self, column: &str) -> Option<i64> {
    self.get(column).and_then(SqlValue::as_i64)
  }

  pub fn text(&self, column: &str) -> Option<String> {
    match self.get(column)? {
      SqlValue::Null => None,
      v => Some(v.to_string()),
    }
  }

  pub fn fields(&self) -> &[(String, SqlValue)] {
    &self.fields
  }
}

/// A bound query parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
  Text(String),
  Real(f64),
  Integer(i64),
}

impl From<&str> for SqlParam {
  fn from(v: &str) -> Self {
    SqlParam::Text(v.to_string())
  }
}

impl From<String> for SqlParam {
  fn from(v: String) -> Self {
    SqlParam::Text(v)
  }
}

impl From<f64> for SqlParam {
  fn from(v: f64) -> Self {
    SqlParam::Real(v)
  }
}

impl From<i64> for SqlParam {
  fn from(v: i64) -> Self {
    SqlParam::Integer(v)
  }
}

/// Paths of the price, index, and indicator databases.
#[derive(Debug, Clone)]
pub struct MarketDb {
  stock_db: PathBuf,
  market_db: PathBuf,
  technical_db: PathBuf,
}

impl MarketDb {
  pub fn new(
    stock_db: impl Into<PathBuf>,
    market_db: impl Into<PathBuf>,
    technical_db: impl Into<PathBuf>,
  ) -> Self {
    Self {
      stock_db: stock_db.into(),
      market_db: market_db.into(),
      technical_db: technical_db.into(),
    }
  }

  fn path(&self, source: Source) -> &Path {
    match source {
      Source::Prices => &self.stock_db,
      Source::Index => &self.market_db,
      Source::Technical => &self.technical_db,
    }
  }

  /// Runs one read query against `source`.
  #[instrument(level = "trace", skip(self, params))]
  pub async fn fetch(
    &self,
    source: Source,
    sql: &str,
    params: &[SqlParam],
  ) -> Result<Vec<Record>, sqlx::Error> {
    let mut conn = open_read_only(self.path(source)).await?;
    let rows = run(&mut conn, sql, params).await;
    conn.close().await?;
    let rows = rows?;
    debug!(?source, rows = rows.len(), "query finished");
    Ok(rows)
  }

  /// Runs a query on the price database with the indicator database attached as `tech`.
  #[instrument(level = "trace", skip(self, params))]
  pub async fn fetch_with_indicators(
    &self,
    sql: &str,
    params: &[SqlParam],
  ) -> Result<Vec<Record>, sqlx::Error> {
    let mut conn = open_read_only(&self.stock_db).await?;
    let attach = sqlx::query("ATTACH DATABASE ? AS tech")
      .bind(self.technical_db.to_string_lossy().into_owned())
      .execute(&mut conn)
      .await;
    let rows = match attach {
      Ok(_) => run(&mut conn, sql, params).await,
      Err(e) => Err(e),
    };
    conn.close().await?;
    rows
  }

  /// Runs the first row of a query, if any.
  pub async fn fetch_one(
    &self,
    source: Source,
    sql: &str,
    params: &[SqlParam],
  ) -> Result<Option<Record>, sqlx::Error> {
    Ok(self.fetch(source, sql, params).await?.into_iter().next())
  }
}

async fn open_read_only(path: &Path) -> Result<SqliteConnection, sqlx::Error> {
  SqliteConnectOptions::new()
    .filename(path)
    .read_only(true)
    .connect()
    .await
}

async fn run(
  conn: &mut SqliteConnection,
  sql: &str,
  params: &[SqlParam],
) -> Result<Vec<Record>, sqlx::Error> {
  let mut query = sqlx::query(sql);
  for p in params {
    query = match p {
      SqlParam::Text(v) => query.bind(v.clone()),
      SqlParam::Real(v) => query.bind(*v),
      SqlParam::Integer(v) => query.bind(*v),
    };
  }
  let rows = query.fetch_all(&mut *conn).await?;
  rows.iter().map(decode_row).collect()
}

fn decode_row(row: &SqliteRow) -> Result<Record, sqlx::Error> {
  let mut fields = Vec::with_capacity(row.len());
  for (i, column) in row.columns().iter().enumerate() {
    let raw = row.try_get_raw(i)?;
    let value = if raw.is_null() {
      SqlValue::Null
    } else {
      let kind = raw.type_info().name().to_string();
      match kind.as_str() {
        "INTEGER" => SqlValue::Integer(row.try_get_unchecked::<i64, _>(i)?),
        "REAL" => SqlValue::Real(row.try_get_unchecked::<f64, _>(i)?),
        "BLOB" => {
          let bytes = row.try_get_unchecked::<Vec<u8>, _>(i)?;
          SqlValue::Text(String::from_utf8_lossy(&bytes).into_owned())
        }
        _ => SqlValue::Text(row.try_get_unchecked::<String, _>(i)?),
      }
    };
    fields.push((column.name().to_string(), value));
  }
  Ok(Record::new(fields))
}
