//! Cross-sectional searches over one trading day: price, change rate, volume, and compound
//! conditions. Price, change rate, and volume searches each support a top-N list, a single
//! stock's rank, and a threshold or range mode.

use tracing::{debug, instrument};

use super::{
  DEFAULT_DATE, date_missing, limit_param, market_filter, market_scope, market_word,
  normalize_date,
};
use crate::error::ToolFault;
use crate::format::{group_thousands, shares, signed_pct, won};
use crate::market::{Companies, Market, Record, Source, SqlParam, ticker_candidates};
use crate::tools::StockTools;
use crate::types::ToolOutput;

/// Longest name list shown for list and range results.
const LIST_DISPLAY: usize = 30;
const COMPOUND_DISPLAY: usize = 25;
const DEFAULT_LIMIT: i64 = 50;

/// Whether the caller wants a top-N list or one stock's position in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResultShape {
  List,
  StockRank,
}

impl ResultShape {
  fn parse(raw: &str) -> ResultShape {
    if raw.trim() == "종목순위" {
      ResultShape::StockRank
    } else {
      ResultShape::List
    }
  }
}

/// Column compared by a rank query and the direction that counts as "ahead".
struct RankSpec<'a> {
  column: &'a str,
  descending: bool,
}

/// A single stock's rank for one date, counting stocks strictly ahead of it. `Ok(None)`
/// means the stock has no row for the date.
async fn rank_of(
  tools: &StockTools,
  date: &str,
  ticker: &str,
  market: Option<Market>,
  spec: RankSpec<'_>,
) -> Result<Option<(i64, f64)>, ToolFault> {
  let (market_sql, market_params) = market_filter(market, "ticker");
  let mut target = None;
  for candidate in ticker_candidates(ticker) {
    let mut params: Vec<SqlParam> = vec![date.into(), candidate.into()];
    params.extend(market_params.iter().cloned());
    let sql = format!(
      "SELECT {} AS value FROM stock_prices WHERE trading_date = ? AND ticker = ?{market_sql}",
      spec.column
    );
    if let Some(v) = tools
      .db()
      .fetch_one(Source::Prices, &sql, &params)
      .await?
      .and_then(|r| r.f64("value"))
    {
      target = Some(v);
      break;
    }
  }
  let Some(value) = target else {
    return Ok(None);
  };

  let cmp = if spec.descending { ">" } else { "<" };
  let sql = format!(
    "SELECT COUNT(*) + 1 AS ranking FROM stock_prices WHERE trading_date = ?{market_sql} AND {} {cmp} ?",
    spec.column
  );
  let mut params: Vec<SqlParam> = vec![date.into()];
  params.extend(market_params);
  params.push(value.into());
  let ranking = tools
    .db()
    .fetch_one(Source::Prices, &sql, &params)
    .await?
    .and_then(|r| r.i64("ranking"))
    .unwrap_or(1);
  debug!(ticker, ranking, value, "rank resolved");
  Ok(Some((ranking, value)))
}

/// Resolves a rank target. `Err` carries the not-found answer.
fn rank_target(companies: &Companies, requested: &str) -> Result<String, ToolOutput> {
  companies.resolve_ticker(requested).ok_or_else(|| {
    ToolOutput::ok(format!("'{requested}' 종목을 찾을 수 없습니다."))
  })
}

/// Joins at most `cap` items, noting the total when truncated.
fn capped(items: &[String], cap: usize) -> (String, Option<usize>) {
  let shown = items.iter().take(cap).cloned().collect::<Vec<_>>().join(", ");
  let total = (items.len() > cap).then_some(items.len());
  (shown, total)
}

fn names(rows: &[Record]) -> Vec<String> {
  rows
    .iter()
    .map(|r| r.text("stock_name").unwrap_or_default())
    .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PriceKind {
  Open,
  High,
  Low,
  Close,
}

impl PriceKind {
  fn parse(raw: &str) -> PriceKind {
    match raw.trim() {
      "시가" => PriceKind::Open,
      "고가" => PriceKind::High,
      "저가" => PriceKind::Low,
      _ => PriceKind::Close,
    }
  }

  fn column(self) -> &'static str {
    match self {
      PriceKind::Open => "open_price",
      PriceKind::High => "high_price",
      PriceKind::Low => "low_price",
      PriceKind::Close => "close_price",
    }
  }

  fn label(self) -> &'static str {
    match self {
      PriceKind::Open => "시가",
      PriceKind::High => "고가",
      PriceKind::Low => "저가",
      PriceKind::Close => "종가",
    }
  }
}

#[instrument(level = "trace", skip(tools))]
pub(crate) async fn price(tools: &StockTools, args: &str) -> Result<ToolOutput, ToolFault> {
  let p = tools
    .params(
      args,
      r#"{"date": "YYYY-MM-DD", "search_type": "순위검색|범위검색", "result_type": "목록순위|종목순위", "ticker": null, "price_type": "시가|고가|저가|종가", "limit": 10, "min_price": null, "max_price": null, "market": "KOSPI|KOSDAQ|null"}"#,
      &format!(
        "규칙:\n\
         - date: 질문에 날짜가 명시되어 있지 않으면 \"{DEFAULT_DATE}\" 사용\n\
         - search_type: \"가장 비싼\", \"순위\", \"상위\" → \"순위검색\", \"1만원~5만원\", \"범위\", \"이상\", \"이하\" → \"범위검색\"\n\
         - result_type: \"상위 10개\", \"목록\" → \"목록순위\", \"삼성전자가 몇 등\", \"순위\" → \"종목순위\"\n\
         - ticker: 종목명이나 코드 추출 (종목순위일 때만 필수)\n\
         - price_type: \"시가\" → \"시가\", \"고가\" → \"고가\", \"저가\" → \"저가\", \"종가\" → \"종가\" (기본값: 종가)\n\
         - limit: \"10개\", \"20개\" → 10, 20 (기본값 10, 목록순위일 때만)\n\
         - min_price: \"1만원\", \"5만원\" → 10000, 50000 (범위검색일 때만)\n\
         - max_price: \"10만원\", \"50만원\" → 100000, 500000 (범위검색일 때만)\n\
         - market: \"KOSPI\" → \"KOSPI\", \"KOSDAQ\" → \"KOSDAQ\", 없으면 null 사용"
      ),
    )
    .await;
  let raw_date = p.str_or("date", DEFAULT_DATE);
  let Some(date) = normalize_date(&raw_date) else {
    return Ok(date_missing(&raw_date));
  };
  let kind = PriceKind::parse(&p.str_or("price_type", "종가"));
  let market = p.opt_str("market").and_then(|m| Market::parse(&m));
  let limit = limit_param(p.i64_or("limit", DEFAULT_LIMIT));
  let column = kind.column();
  let label = kind.label();

  if p.str_or("search_type", "범위검색") == "순위검색" {
    let requested = p.opt_str("ticker");
    if let (ResultShape::StockRank, Some(requested)) =
      (ResultShape::parse(&p.str_or("result_type", "목록순위")), requested)
    {
      let ticker = match rank_target(&tools.companies().await?, &requested) {
        Ok(t) => t,
        Err(not_found) => return Ok(not_found),
      };
      let spec = RankSpec {
        column,
        descending: true,
      };
      return Ok(ToolOutput::ok(
        match rank_of(tools, &date, &ticker, market, spec).await? {
          Some((ranking, value)) => format!(
            "{date} {}{requested}의 {label} 순위: {ranking}위 ({})",
            market_scope(market),
            won(value)
          ),
          None => format!("{date}에 '{requested}' 종목의 데이터를 찾을 수 없습니다."),
        },
      ));
    }

    let (market_sql, mut params) = market_filter(market, "ticker");
    params.insert(0, date.as_str().into());
    params.push(limit.into());
    let sql = format!(
      "SELECT ticker, stock_name, {column} AS price FROM stock_prices \
       WHERE trading_date = ?{market_sql} ORDER BY {column} DESC LIMIT ?"
    );
    let rows = tools.db().fetch(Source::Prices, &sql, &params).await?;
    if rows.is_empty() {
      return Ok(ToolOutput::ok(format!(
        "{date}에 {}{label} 데이터를 찾을 수 없습니다.",
        market_word(market)
      )));
    }
    let items: Vec<String> = rows
      .iter()
      .map(|r| {
        format!(
          "{}({})",
          r.text("stock_name").unwrap_or_default(),
          won(r.f64("price").unwrap_or_default())
        )
      })
      .collect();
    return Ok(ToolOutput::ok(format!(
      "{date} {}{label} 상위 {}개: {}",
      market_word(market),
      rows.len(),
      items.join(", ")
    )));
  }

  let min = p.opt_f64("min_price");
  let max = p.opt_f64("max_price");
  let (bounds, subject) = match (min, max) {
    (Some(lo), Some(hi)) => (format!("{} 이상 {} 이하", won(lo), won(hi)), true),
    (Some(lo), None) => (format!("{} 이상", won(lo)), true),
    (None, Some(hi)) => (format!("{} 이하", won(hi)), true),
    (None, None) => (String::new(), false),
  };
  if !subject {
    return Ok(ToolOutput::param_missing(format!(
      "조건을 찾을 수 없습니다: {label} 범위(min_price, max_price)가 지정되지 않았습니다."
    )));
  }

  let mut sql = format!(
    "SELECT ticker, stock_name, {column} AS price FROM stock_prices WHERE trading_date = ?"
  );
  let mut params: Vec<SqlParam> = vec![date.as_str().into()];
  if let Some(lo) = min {
    sql.push_str(&format!(" AND {column} >= ?"));
    params.push(lo.into());
  }
  if let Some(hi) = max {
    sql.push_str(&format!(" AND {column} <= ?"));
    params.push(hi.into());
  }
  let (market_sql, market_params) = market_filter(market, "ticker");
  sql.push_str(&market_sql);
  params.extend(market_params);
  sql.push_str(&format!(" ORDER BY {column} DESC LIMIT ?"));
  params.push(limit.into());

  let rows = tools.db().fetch(Source::Prices, &sql, &params).await?;
  if rows.is_empty() {
    return Ok(ToolOutput::ok(format!(
      "{date}에 {}{label}가 {bounds}인 종목을 찾을 수 없습니다.",
      market_word(market)
    )));
  }
  let items: Vec<String> = rows
    .iter()
    .map(|r| {
      format!(
        "{}({})",
        r.text("stock_name").unwrap_or_default(),
        won(r.f64("price").unwrap_or_default())
      )
    })
    .collect();
  Ok(ToolOutput::ok(format!(
    "{date} {}{label} {bounds} 종목: {}",
    market_scope(market),
    items.join(", ")
  )))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChangeMode {
  Gainers,
  Losers,
  Range,
}

impl ChangeMode {
  fn parse(raw: &str) -> ChangeMode {
    match raw.trim() {
      "상승률순위" => ChangeMode::Gainers,
      "하락률순위" => ChangeMode::Losers,
      _ => ChangeMode::Range,
    }
  }
}

fn rate_bounds(min: Option<f64>, max: Option<f64>) -> Option<String> {
  match (min, max) {
    (Some(lo), Some(hi)) => Some(format!("{lo:+.1}% 이상 {hi:+.1}% 이하")),
    (Some(lo), None) => Some(format!("{lo:+.1}% 이상")),
    (None, Some(hi)) => Some(format!("{hi:+.1}% 이하")),
    (None, None) => None,
  }
}

#[instrument(level = "trace", skip(tools))]
pub(crate) async fn price_change(tools: &StockTools, args: &str) -> Result<ToolOutput, ToolFault> {
  let p = tools
    .params(
      args,
      r#"{"date": "YYYY-MM-DD", "ranking_type": "상승률순위|하락률순위|범위검색", "result_type": "목록순위|종목순위", "ticker": null, "limit": 5, "min_change_rate": null, "max_change_rate": null, "market": "KOSPI|KOSDAQ|null"}"#,
      &format!(
        "규칙:\n\
         - date: 질문에 날짜가 명시되어 있지 않으면 \"{DEFAULT_DATE}\" 사용\n\
         - ranking_type: \"상승률 높은\", \"상승률순위\" → \"상승률순위\", \"하락률 높은\", \"하락률순위\" → \"하락률순위\", 범위 조건 → \"범위검색\"\n\
         - result_type: \"상위 10개\", \"목록\" → \"목록순위\", \"삼성전자가 몇 등\", \"순위\" → \"종목순위\"\n\
         - ticker: 종목명이나 코드 추출 (종목순위일 때만 필수)\n\
         - limit: \"5개\", \"10개\" → 5, 10 (기본값 5, 목록순위일 때만)\n\
         - min_change_rate: \"5% 이상\", \"+10% 이상\" → 5.0, 10.0 (범위검색일 때만)\n\
         - max_change_rate: \"-10% 이하\", \"5% 이하\" → -10.0, 5.0 (범위검색일 때만)\n\
         - market: \"KOSPI\" → \"KOSPI\", \"KOSDAQ\" → \"KOSDAQ\", 없으면 null 사용"
      ),
    )
    .await;
  let raw_date = p.str_or("date", DEFAULT_DATE);
  let Some(date) = normalize_date(&raw_date) else {
    return Ok(date_missing(&raw_date));
  };
  let mode = ChangeMode::parse(&p.str_or("ranking_type", "범위검색"));
  let market = p.opt_str("market").and_then(|m| Market::parse(&m));
  let limit = limit_param(p.i64_or("limit", DEFAULT_LIMIT));
  let (market_sql, market_params) = market_filter(market, "ticker");

  let (rows, condition) = match mode {
    ChangeMode::Gainers | ChangeMode::Losers => {
      let word = if mode == ChangeMode::Gainers { "상승률" } else { "하락률" };
      let requested = p.opt_str("ticker");
      if let (ResultShape::StockRank, Some(requested)) =
        (ResultShape::parse(&p.str_or("result_type", "목록순위")), requested)
      {
        let ticker = match rank_target(&tools.companies().await?, &requested) {
          Ok(t) => t,
          Err(not_found) => return Ok(not_found),
        };
        let spec = RankSpec {
          column: "change_rate",
          descending: mode == ChangeMode::Gainers,
        };
        return Ok(ToolOutput::ok(
          match rank_of(tools, &date, &ticker, market, spec).await? {
            Some((ranking, rate)) => format!(
              "{date} {}{requested}의 {word} 순위: {ranking}위 ({})",
              market_scope(market),
              signed_pct(rate)
            ),
            None => format!("{date}에 '{requested}' 종목의 데이터를 찾을 수 없습니다."),
          },
        ));
      }

      let order = if mode == ChangeMode::Gainers { "DESC" } else { "ASC" };
      let sql = format!(
        "SELECT ticker, stock_name, change_rate FROM stock_prices \
         WHERE trading_date = ?{market_sql} ORDER BY change_rate {order} LIMIT ?"
      );
      let mut params: Vec<SqlParam> = vec![date.as_str().into()];
      params.extend(market_params);
      params.push(limit.into());
      let rows = tools.db().fetch(Source::Prices, &sql, &params).await?;
      if rows.is_empty() {
        return Ok(ToolOutput::ok(format!(
          "{date}에{} {word} 순위 {limit}개인 종목을 찾을 수 없습니다.",
          market.map(|m| format!(" {m} 시장에서")).unwrap_or_default()
        )));
      }
      (rows, format!("{word} 순위"))
    }
    ChangeMode::Range => {
      let min = p.opt_f64("min_change_rate");
      let max = p.opt_f64("max_change_rate");
      let Some(bounds) = rate_bounds(min, max) else {
        return Ok(ToolOutput::param_missing(
          "조건을 찾을 수 없습니다: 등락률 범위(min_change_rate, max_change_rate)가 지정되지 않았습니다.",
        ));
      };
      let mut sql =
        "SELECT ticker, stock_name, change_rate FROM stock_prices WHERE trading_date = ?".to_string();
      let mut params: Vec<SqlParam> = vec![date.as_str().into()];
      if let Some(lo) = min {
        sql.push_str(" AND change_rate >= ?");
        params.push(lo.into());
      }
      if let Some(hi) = max {
        sql.push_str(" AND change_rate <= ?");
        params.push(hi.into());
      }
      sql.push_str(&market_sql);
      params.extend(market_params);
      sql.push_str(" ORDER BY change_rate DESC LIMIT ?");
      params.push(limit.into());
      let rows = tools.db().fetch(Source::Prices, &sql, &params).await?;
      if rows.is_empty() {
        return Ok(ToolOutput::ok(format!(
          "{date}에{} 등락률이 {bounds}인 종목을 찾을 수 없습니다.",
          market.map(|m| format!(" {m} 시장에서")).unwrap_or_default()
        )));
      }
      (rows, format!("등락률 {bounds}"))
    }
  };

  let market_text = market.map(|m| format!(" {m} 시장")).unwrap_or_default();
  let (shown, total) = capped(&names(&rows), LIST_DISPLAY);
  Ok(ToolOutput::ok(match total {
    Some(total) => format!("{date}{market_text} {condition} 만족 종목 (총 {total}개): {shown}, ...등"),
    None => format!("{date}{market_text} {condition} 만족 종목: {shown}"),
  }))
}

#[instrument(level = "trace", skip(tools))]
pub(crate) async fn volume(tools: &StockTools, args: &str) -> Result<ToolOutput, ToolFault> {
  let p = tools
    .params(
      args,
      r#"{"date": "YYYY-MM-DD", "ranking_type": "거래량순위|임계값검색", "result_type": "목록순위|종목순위", "ticker": null, "limit": 10, "min_volume": null, "market": "KOSPI|KOSDAQ|null"}"#,
      &format!(
        "규칙:\n\
         - date: 질문에 날짜가 명시되어 있지 않으면 \"{DEFAULT_DATE}\" 사용\n\
         - ranking_type: \"거래량 순위\", \"거래량 상위\" → \"거래량순위\", \"100만주 이상\", \"임계값\" → \"임계값검색\"\n\
         - result_type: \"상위 10개\", \"목록\" → \"목록순위\", \"삼성전자가 몇 등\", \"순위\" → \"종목순위\"\n\
         - ticker: 종목명이나 코드 추출 (종목순위일 때만 필수)\n\
         - limit: \"10개\", \"20개\" → 10, 20 (기본값 10, 목록순위일 때만)\n\
         - min_volume: \"100만주\", \"500만주\" → 1000000, 5000000 (임계값검색일 때만)\n\
         - market: \"KOSPI\" → \"KOSPI\", \"KOSDAQ\" → \"KOSDAQ\", 없으면 null 사용"
      ),
    )
    .await;
  let raw_date = p.str_or("date", DEFAULT_DATE);
  let Some(date) = normalize_date(&raw_date) else {
    return Ok(date_missing(&raw_date));
  };
  let market = p.opt_str("market").and_then(|m| Market::parse(&m));
  let limit = limit_param(p.i64_or("limit", DEFAULT_LIMIT));
  let (market_sql, market_params) = market_filter(market, "ticker");

  if p.str_or("ranking_type", "임계값검색") == "거래량순위" {
    let requested = p.opt_str("ticker");
    if let (ResultShape::StockRank, Some(requested)) =
      (ResultShape::parse(&p.str_or("result_type", "목록순위")), requested)
    {
      let ticker = match rank_target(&tools.companies().await?, &requested) {
        Ok(t) => t,
        Err(not_found) => return Ok(not_found),
      };
      let spec = RankSpec {
        column: "trading_volume",
        descending: true,
      };
      return Ok(ToolOutput::ok(
        match rank_of(tools, &date, &ticker, market, spec).await? {
          Some((ranking, volume)) => format!(
            "{date} {}{requested}의 거래량 순위: {ranking}위 ({})",
            market_scope(market),
            shares(volume.round() as i64)
          ),
          None => format!("{date}에 '{requested}' 종목의 데이터를 찾을 수 없습니다."),
        },
      ));
    }

    let sql = format!(
      "SELECT ticker, stock_name, trading_volume FROM stock_prices \
       WHERE trading_date = ?{market_sql} ORDER BY trading_volume DESC LIMIT ?"
    );
    let mut params: Vec<SqlParam> = vec![date.as_str().into()];
    params.extend(market_params);
    params.push(limit.into());
    let rows = tools.db().fetch(Source::Prices, &sql, &params).await?;
    if rows.is_empty() {
      return Ok(ToolOutput::ok(format!(
        "{date}에 {}거래량 데이터를 찾을 수 없습니다.",
        market_word(market)
      )));
    }
    let items: Vec<String> = rows
      .iter()
      .map(|r| {
        format!(
          "{}({})",
          r.text("stock_name").unwrap_or_default(),
          shares(r.i64("trading_volume").unwrap_or_default())
        )
      })
      .collect();
    let (shown, total) = capped(&items, LIST_DISPLAY);
    return Ok(ToolOutput::ok(match total {
      Some(total) => format!(
        "{date} {}거래량 상위 종목 (총 {total}개 중 {LIST_DISPLAY}개 표시): {shown}",
        market_word(market)
      ),
      None => format!(
        "{date} {}거래량 상위 {}개: {shown}",
        market_word(market),
        items.len()
      ),
    }));
  }

  let Some(min_volume) = p.opt_i64("min_volume") else {
    return Ok(ToolOutput::param_missing(
      "임계값을 찾을 수 없습니다: 최소 거래량(min_volume)이 지정되지 않았습니다.",
    ));
  };
  let sql = format!(
    "SELECT ticker, stock_name, trading_volume FROM stock_prices \
     WHERE trading_date = ? AND trading_volume >= ?{market_sql} \
     ORDER BY trading_volume DESC LIMIT ?"
  );
  let mut params: Vec<SqlParam> = vec![date.as_str().into(), min_volume.into()];
  params.extend(market_params);
  params.push(limit.into());
  let rows = tools.db().fetch(Source::Prices, &sql, &params).await?;
  let threshold = group_thousands(min_volume);
  if rows.is_empty() {
    return Ok(ToolOutput::ok(format!(
      "{date}에 {}거래량이 {threshold}주 이상인 종목을 찾을 수 없습니다.",
      market_word(market)
    )));
  }
  let companies = tools.companies().await?;
  let found: Vec<String> = rows
    .iter()
    .map(|r| {
      let ticker = r.text("ticker").unwrap_or_default();
      companies
        .find_by_ticker(&ticker)
        .map(|c| c.stock_name.clone())
        .or_else(|| r.text("stock_name"))
        .unwrap_or(ticker)
    })
    .collect();
  let (shown, total) = capped(&found, LIST_DISPLAY);
  let scope = market_scope(market);
  Ok(ToolOutput::ok(match total {
    Some(total) => format!(
      "{date} {scope}거래량이 {threshold}주 이상인 종목 (총 {total}개 중 {LIST_DISPLAY}개 표시): {shown}"
    ),
    None => format!("{date} {scope}거래량이 {threshold}주 이상인 종목: {shown}"),
  }))
}

#[instrument(level = "trace", skip(tools))]
pub(crate) async fn compound(tools: &StockTools, args: &str) -> Result<ToolOutput, ToolFault> {
  let p = tools
    .params(
      args,
      r#"{"date": "YYYY-MM-DD", "market": "KOSPI|KOSDAQ|null", "limit": 10, "price_min": null, "price_max": null, "change_rate_min": null, "change_rate_max": null, "volume_min": null, "rsi_min": null, "rsi_max": null}"#,
      &format!(
        "규칙:\n\
         - date: 질문에 날짜가 명시되어 있지 않으면 \"{DEFAULT_DATE}\" 사용\n\
         - market: \"KOSPI\" → \"KOSPI\", \"KOSDAQ\" → \"KOSDAQ\", 없으면 null 사용\n\
         - limit: \"10개\", \"20개\" → 10, 20 (기본값 10)\n\
         - price_min: \"1만원 이상\" → 10000 (가격 최소값)\n\
         - price_max: \"5만원 이하\" → 50000 (가격 최대값)\n\
         - change_rate_min: \"+3% 이상\" → 3.0 (등락률 최소값)\n\
         - change_rate_max: \"+10% 이하\" → 10.0 (등락률 최대값)\n\
         - volume_min: \"100만주 이상\" → 1000000 (거래량 최소값)\n\
         - rsi_min: \"RSI 70 이상\" → 70.0 (RSI 최소값)\n\
         - rsi_max: \"RSI 30 이하\" → 30.0 (RSI 최대값)"
      ),
    )
    .await;
  let raw_date = p.str_or("date", DEFAULT_DATE);
  let Some(date) = normalize_date(&raw_date) else {
    return Ok(date_missing(&raw_date));
  };
  let market = p.opt_str("market").and_then(|m| Market::parse(&m));
  let limit = limit_param(p.i64_or("limit", DEFAULT_LIMIT));

  let mut where_sql = "sp.trading_date = ?".to_string();
  let mut params: Vec<SqlParam> = vec![date.as_str().into()];
  let mut described: Vec<String> = Vec::new();
  let mut add = |clause: &str, param: SqlParam, text: String| {
    where_sql.push_str(" AND ");
    where_sql.push_str(clause);
    params.push(param);
    described.push(text);
  };

  if let Some(v) = p.opt_f64("price_min") {
    add("sp.close_price >= ?", v.into(), format!("가격 {} 이상", won(v)));
  }
  if let Some(v) = p.opt_f64("price_max") {
    add("sp.close_price <= ?", v.into(), format!("가격 {} 이하", won(v)));
  }
  if let Some(v) = p.opt_f64("change_rate_min") {
    add("sp.change_rate >= ?", v.into(), format!("등락률 {v:+.1}% 이상"));
  }
  if let Some(v) = p.opt_f64("change_rate_max") {
    add("sp.change_rate <= ?", v.into(), format!("등락률 {v:+.1}% 이하"));
  }
  if let Some(v) = p.opt_i64("volume_min") {
    add("sp.trading_volume >= ?", v.into(), format!("거래량 {} 이상", shares(v)));
  }
  let rsi_min = p.opt_f64("rsi_min");
  let rsi_max = p.opt_f64("rsi_max");
  if let Some(v) = rsi_min {
    add("ti.rsi >= ?", v.into(), format!("RSI {v:.0} 이상"));
  }
  if let Some(v) = rsi_max {
    add("ti.rsi <= ?", v.into(), format!("RSI {v:.0} 이하"));
  }
  if described.is_empty() {
    return Ok(ToolOutput::param_missing(
      "조건을 찾을 수 없습니다: 가격, 등락률, 거래량, RSI 중 하나 이상의 조건이 필요합니다.",
    ));
  }

  let (market_sql, market_params) = market_filter(market, "sp.ticker");
  where_sql.push_str(&market_sql);
  params.extend(market_params);
  params.push(limit.into());

  let with_rsi = rsi_min.is_some() || rsi_max.is_some();
  let rows = if with_rsi {
    let sql = format!(
      "SELECT sp.ticker, sp.stock_name, sp.close_price, sp.change_rate, sp.trading_volume, ti.rsi \
       FROM stock_prices sp JOIN tech.technical_indicators ti \
       ON sp.ticker = ti.ticker AND sp.trading_date = ti.trading_date \
       WHERE {where_sql} ORDER BY sp.change_rate DESC LIMIT ?"
    );
    tools.db().fetch_with_indicators(&sql, &params).await?
  } else {
    let sql = format!(
      "SELECT sp.ticker, sp.stock_name, sp.close_price, sp.change_rate, sp.trading_volume \
       FROM stock_prices sp WHERE {where_sql} ORDER BY sp.change_rate DESC LIMIT ?"
    );
    tools.db().fetch(Source::Prices, &sql, &params).await?
  };

  let conditions = described.join(", ");
  let word = market_word(market);
  if rows.is_empty() {
    return Ok(ToolOutput::ok(format!(
      "{date}에 {word}{conditions}을/를 모두 만족하는 종목을 찾을 수 없습니다."
    )));
  }
  let items: Vec<String> = rows
    .iter()
    .map(|r| {
      let mut item = format!(
        "{}(종가:{}, 등락률:{}, 거래량:{}",
        r.text("stock_name").unwrap_or_default(),
        won(r.f64("close_price").unwrap_or_default()),
        signed_pct(r.f64("change_rate").unwrap_or_default()),
        shares(r.i64("trading_volume").unwrap_or_default())
      );
      if let Some(rsi) = r.f64("rsi") {
        item.push_str(&format!(", RSI:{rsi:.1}"));
      }
      item.push(')');
      item
    })
    .collect();
  let (shown, total) = capped(&items, COMPOUND_DISPLAY);
  Ok(ToolOutput::ok(match total {
    Some(total) => format!(
      "{date} {word}{conditions}을/를 모두 만족하는 종목 (총 {total}개 중 {COMPOUND_DISPLAY}개 표시): {shown}"
    ),
    None => format!("{date} {word}{conditions}을/를 모두 만족하는 종목: {shown}"),
  }))
}
