//! Indicator-driven searches over `technical_indicators`: RSI, Bollinger touches, moving
//! average breakouts, volume surges, and golden/dead crosses.

use tracing::{debug, instrument};

use super::{DEFAULT_DATE, date_missing, normalize_date};
use crate::error::ToolFault;
use crate::market::{Source, SqlParam, ticker_candidates};
use crate::tools::StockTools;
use crate::types::ToolOutput;

const SIGNAL_LIMIT: i64 = 30;
const SURGE_LIMIT: i64 = 50;
const CROSS_LIMIT: usize = 20;

#[instrument(level = "trace", skip(tools))]
pub(crate) async fn rsi_signals(tools: &StockTools, args: &str) -> Result<ToolOutput, ToolFault> {
  let p = tools
    .params(
      args,
      r#"{"date": "YYYY-MM-DD", "rsi_min": null, "rsi_max": null}"#,
      &format!(
        "규칙:\n\
         - date: 질문에 날짜가 명시되어 있지 않으면 \"{DEFAULT_DATE}\" 사용\n\
         - rsi_min: RSI 최소값 (예: \"RSI 70 이상\", \"과매수\" → 70.0)\n\
         - rsi_max: RSI 최대값 (예: \"RSI 30 이하\", \"과매도\" → 30.0)\n\
         - 과매수만 언급되면 rsi_min: 70.0, 과매도만 언급되면 rsi_max: 30.0"
      ),
    )
    .await;
  let raw_date = p.str_or("date", DEFAULT_DATE);
  let Some(date) = normalize_date(&raw_date) else {
    return Ok(date_missing(&raw_date));
  };
  let rsi_min = p.opt_f64("rsi_min");
  let rsi_max = p.opt_f64("rsi_max");

  let base = "SELECT ticker, trading_date, close_price, rsi FROM technical_indicators WHERE trading_date = ?";
  let mut params: Vec<SqlParam> = vec![date.as_str().into()];
  let (sql, condition) = match (rsi_min, rsi_max) {
    (Some(lo), Some(hi)) => {
      params.extend([lo.into(), hi.into()]);
      (
        format!("{base} AND rsi BETWEEN ? AND ? ORDER BY rsi DESC LIMIT ?"),
        format!("RSI {lo:?} 이상 {hi:?} 이하"),
      )
    }
    (Some(lo), None) => {
      params.push(lo.into());
      (
        format!("{base} AND rsi >= ? ORDER BY rsi DESC LIMIT ?"),
        format!("RSI {lo:?} 이상"),
      )
    }
    (None, Some(hi)) => {
      params.push(hi.into());
      (
        format!("{base} AND rsi <= ? ORDER BY rsi ASC LIMIT ?"),
        format!("RSI {hi:?} 이하"),
      )
    }
    (None, None) => (
      format!("{base} ORDER BY rsi DESC LIMIT ?"),
      "RSI 조건".to_string(),
    ),
  };
  params.push(SIGNAL_LIMIT.into());

  let rows = tools.db().fetch(Source::Technical, &sql, &params).await?;
  if rows.is_empty() {
    return Ok(ToolOutput::ok(format!(
      "{date}에 {condition} 종목을 찾을 수 없습니다."
    )));
  }
  let companies = tools.companies().await?;
  let items: Vec<String> = rows
    .iter()
    .map(|r| {
      let ticker = r.text("ticker").unwrap_or_default();
      format!(
        "{}(RSI:{:.1})",
        companies.name_for(&ticker),
        r.f64("rsi").unwrap_or_default()
      )
    })
    .collect();
  Ok(ToolOutput::ok(format!(
    "{date} {condition} 종목: {}",
    items.join(", ")
  )))
}

/// Which Bollinger band a touch is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Band {
  Upper,
  Lower,
}

impl Band {
  fn parse(raw: &str) -> Band {
    match raw.trim().to_lowercase().as_str() {
      "lower" | "하단" => Band::Lower,
      _ => Band::Upper,
    }
  }

  fn korean(self) -> &'static str {
    match self {
      Band::Upper => "상단",
      Band::Lower => "하단",
    }
  }

  /// A touch means closing within 0.05% of the band or beyond it.
  fn query(self) -> &'static str {
    match self {
      Band::Upper => {
        "SELECT ticker, close_price, bb_upper FROM technical_indicators \
         WHERE trading_date = ? AND close_price >= bb_upper * 0.9995 \
         ORDER BY ABS(close_price - bb_upper) ASC LIMIT ?"
      }
      Band::Lower => {
        "SELECT ticker, close_price, bb_lower FROM technical_indicators \
         WHERE trading_date = ? AND close_price <= bb_lower * 1.0005 \
         ORDER BY ABS(close_price - bb_lower) ASC LIMIT ?"
      }
    }
  }
}

#[instrument(level = "trace", skip(tools))]
pub(crate) async fn bollinger_signals(
  tools: &StockTools,
  args: &str,
) -> Result<ToolOutput, ToolFault> {
  let p = tools
    .params(
      args,
      r#"{"date": "YYYY-MM-DD", "band_type": "upper|lower"}"#,
      &format!(
        "질문에 날짜가 명시되어 있지 않으면 '{DEFAULT_DATE}' 사용, '상단'/'upper' → 'upper', '하단'/'lower' → 'lower'"
      ),
    )
    .await;
  let raw_date = p.str_or("date", DEFAULT_DATE);
  let Some(date) = normalize_date(&raw_date) else {
    return Ok(date_missing(&raw_date));
  };
  let band = Band::parse(&p.str_or("band_type", "upper"));

  let rows = tools
    .db()
    .fetch(
      Source::Technical,
      band.query(),
      &[date.as_str().into(), SIGNAL_LIMIT.into()],
    )
    .await?;
  if rows.is_empty() {
    return Ok(ToolOutput::ok(format!(
      "{date}에 볼린저 밴드 {}에 터치한 종목을 찾을 수 없습니다.",
      band.korean()
    )));
  }
  let companies = tools.companies().await?;
  let names: Vec<String> = rows
    .iter()
    .map(|r| companies.name_for(&r.text("ticker").unwrap_or_default()))
    .collect();
  Ok(ToolOutput::ok(format!(
    "{date} 볼린저 밴드 {} 터치 종목: {}",
    band.korean(),
    names.join(", ")
  )))
}

/// Moving average windows present as indicator columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MaPeriod {
  Five,
  Twenty,
  Sixty,
}

impl MaPeriod {
  fn from_days(days: i64) -> Option<MaPeriod> {
    match days {
      5 => Some(MaPeriod::Five),
      20 => Some(MaPeriod::Twenty),
      60 => Some(MaPeriod::Sixty),
      _ => None,
    }
  }

  fn days(self) -> i64 {
    match self {
      MaPeriod::Five => 5,
      MaPeriod::Twenty => 20,
      MaPeriod::Sixty => 60,
    }
  }

  fn column(self) -> &'static str {
    match self {
      MaPeriod::Five => "ma5",
      MaPeriod::Twenty => "ma20",
      MaPeriod::Sixty => "ma60",
    }
  }
}

#[instrument(level = "trace", skip(tools))]
pub(crate) async fn ma_breakout(tools: &StockTools, args: &str) -> Result<ToolOutput, ToolFault> {
  let p = tools
    .params(
      args,
      r#"{"date": "YYYY-MM-DD", "ma_period": 20, "breakout_ratio": 0.03}"#,
      &format!(
        "규칙:\n\
         - date: 질문에 날짜가 명시되어 있지 않으면 \"{DEFAULT_DATE}\" 사용\n\
         - ma_period: \"5일\"/\"MA5\" → 5, \"20일\"/\"MA20\" → 20, \"60일\"/\"MA60\" → 60, 없으면 20 사용\n\
         - breakout_ratio: \"1%\" → 0.01, \"3%\" → 0.03, \"5%\" → 0.05, \"10%\" → 0.10, 없으면 0.03 사용"
      ),
    )
    .await;
  let raw_date = p.str_or("date", DEFAULT_DATE);
  let Some(date) = normalize_date(&raw_date) else {
    return Ok(date_missing(&raw_date));
  };
  let days = p.i64_or("ma_period", 20);
  let Some(period) = MaPeriod::from_days(days) else {
    return Ok(ToolOutput::param_missing(format!(
      "조건을 찾을 수 없습니다: {days}일 이동평균은 지원하지 않습니다. 5, 20, 60일 중 하나를 지정해 주세요."
    )));
  };
  let mut ratio = p.f64_or("breakout_ratio", 0.03);
  if ratio >= 1.0 {
    ratio /= 100.0;
  }

  let ma = period.column();
  let sql = format!(
    "SELECT ticker, close_price, {ma}, ((close_price - {ma}) / {ma} * 100) AS breakout_percentage \
     FROM technical_indicators WHERE trading_date = ? AND close_price > {ma} * (1 + ?) \
     ORDER BY breakout_percentage DESC LIMIT ?"
  );
  let rows = tools
    .db()
    .fetch(
      Source::Technical,
      &sql,
      &[date.as_str().into(), ratio.into(), SIGNAL_LIMIT.into()],
    )
    .await?;
  let pct = ratio * 100.0;
  if rows.is_empty() {
    return Ok(ToolOutput::ok(format!(
      "{date}에 {}일 이동평균을 {pct:.0}% 이상 돌파한 종목을 찾을 수 없습니다.",
      period.days()
    )));
  }
  let companies = tools.companies().await?;
  let items: Vec<String> = rows
    .iter()
    .map(|r| {
      format!(
        "{}({:.2}%)",
        companies.name_for(&r.text("ticker").unwrap_or_default()),
        r.f64("breakout_percentage").unwrap_or_default()
      )
    })
    .collect();
  Ok(ToolOutput::ok(format!(
    "{date} {}일 이동평균 {pct:.0}% 이상 돌파: {}",
    period.days(),
    items.join(", ")
  )))
}

#[instrument(level = "trace", skip(tools))]
pub(crate) async fn volume_surge(tools: &StockTools, args: &str) -> Result<ToolOutput, ToolFault> {
  let p = tools
    .params(
      args,
      r#"{"date": "YYYY-MM-DD", "surge_ratio": 5.0}"#,
      &format!(
        "질문에 날짜가 명시되어 있지 않으면 '{DEFAULT_DATE}' 사용, '100%' → 1.0, '200%' → 2.0, '500%' → 5.0"
      ),
    )
    .await;
  let raw_date = p.str_or("date", DEFAULT_DATE);
  let Some(date) = normalize_date(&raw_date) else {
    return Ok(date_missing(&raw_date));
  };
  let surge = p.f64_or("surge_ratio", 5.0);

  let rows = tools
    .db()
    .fetch(
      Source::Technical,
      "SELECT ticker, volume_ratio FROM technical_indicators \
       WHERE trading_date = ? AND volume_ratio >= ? ORDER BY volume_ratio DESC LIMIT ?",
      &[date.as_str().into(), surge.into(), SURGE_LIMIT.into()],
    )
    .await?;
  let pct = surge * 100.0;
  if rows.is_empty() {
    return Ok(ToolOutput::ok(format!(
      "{date}에 거래량이 20일 평균 대비 {pct:.0}% 이상 급증한 종목을 찾을 수 없습니다."
    )));
  }
  let companies = tools.companies().await?;
  let items: Vec<String> = rows
    .iter()
    .map(|r| {
      format!(
        "{}({:.0}%)",
        companies.name_for(&r.text("ticker").unwrap_or_default()),
        r.f64("volume_ratio").unwrap_or_default() * 100.0
      )
    })
    .collect();
  Ok(ToolOutput::ok(format!(
    "{date} 거래량 20일 평균 대비 {pct:.0}% 이상 급증: {}",
    items.join(", ")
  )))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cross {
  Golden,
  Dead,
}

impl Cross {
  fn column(self) -> &'static str {
    match self {
      Cross::Golden => "golden_cross",
      Cross::Dead => "dead_cross",
    }
  }

  fn korean(self) -> &'static str {
    match self {
      Cross::Golden => "골든크로스",
      Cross::Dead => "데드크로스",
    }
  }
}

/// Validates both ends of a date range, reporting the first bad one.
fn date_range(start: &str, end: &str) -> Result<(String, String), ToolOutput> {
  let start = normalize_date(start).ok_or_else(|| date_missing(start))?;
  let end = normalize_date(end).ok_or_else(|| date_missing(end))?;
  Ok((start, end))
}

#[instrument(level = "trace", skip(tools))]
pub(crate) async fn cross_signals(tools: &StockTools, args: &str) -> Result<ToolOutput, ToolFault> {
  let p = tools
    .params(
      args,
      r#"{"start_date": "YYYY-MM-DD", "end_date": "YYYY-MM-DD", "signal_type": "golden|dead"}"#,
      "규칙:\n\
       - start_date: 시작날짜, 없으면 \"2024-01-01\" 사용\n\
       - end_date: 종료날짜, 없으면 \"2024-12-31\" 사용\n\
       - signal_type: \"데드크로스\" → \"dead\", \"골든크로스\" → \"golden\" ",
    )
    .await;
  let (start, end) = match date_range(
    &p.str_or("start_date", "2024-01-01"),
    &p.str_or("end_date", "2024-12-31"),
  ) {
    Ok(range) => range,
    Err(missing) => return Ok(missing),
  };
  let cross = match p.str_or("signal_type", "golden").as_str() {
    "dead" => Cross::Dead,
    _ => Cross::Golden,
  };

  let sql = format!(
    "SELECT ticker, trading_date FROM technical_indicators \
     WHERE trading_date BETWEEN ? AND ? AND {} = 1 ORDER BY trading_date DESC, ticker",
    cross.column()
  );
  let rows = tools
    .db()
    .fetch(Source::Technical, &sql, &[start.as_str().into(), end.as_str().into()])
    .await?;
  if rows.is_empty() {
    return Ok(ToolOutput::ok(format!(
      "{start}부터 {end}까지 {}가 발생한 종목을 찾을 수 없습니다.",
      cross.korean()
    )));
  }

  let mut tickers: Vec<String> = Vec::new();
  for ticker in rows.iter().filter_map(|r| r.text("ticker")) {
    if !tickers.contains(&ticker) {
      tickers.push(ticker);
    }
  }
  tickers.truncate(CROSS_LIMIT);
  let companies = tools.companies().await?;
  let names: Vec<String> = tickers.iter().map(|t| companies.name_for(t)).collect();
  Ok(ToolOutput::ok(format!(
    "{start}부터 {end}까지 {} 발생 종목: {}",
    cross.korean(),
    names.join(", ")
  )))
}

#[instrument(level = "trace", skip(tools))]
pub(crate) async fn cross_count(tools: &StockTools, args: &str) -> Result<ToolOutput, ToolFault> {
  let p = tools
    .params(
      args,
      r#"{"ticker": "종목명", "start_date": "YYYY-MM-DD", "end_date": "YYYY-MM-DD", "signal_type": "golden|dead|both"}"#,
      "규칙:\n\
       - ticker: 종목명을 추출, 없으면 \"삼성전자\" 사용\n\
       - start_date: 시작날짜, 없으면 \"2024-06-01\" 사용\n\
       - end_date: 종료날짜, 없으면 \"2025-06-30\" 사용\n\
       - signal_type: \"골든크로스\"만 → \"golden\", \"데드크로스\"만 → \"dead\", 둘다 → \"both\" ",
    )
    .await;
  let (start, end) = match date_range(
    &p.str_or("start_date", "2024-06-01"),
    &p.str_or("end_date", "2025-06-30"),
  ) {
    Ok(range) => range,
    Err(missing) => return Ok(missing),
  };
  let requested = p.str_or("ticker", "삼성전자");
  let ticker = tools
    .companies()
    .await?
    .resolve_ticker(&requested)
    .unwrap_or(requested);
  let candidates = ticker_candidates(&ticker);
  debug!(?candidates, "counting crosses");

  let count = |cross: Cross| {
    let placeholders = vec!["?"; candidates.len()].join(", ");
    let sql = format!(
      "SELECT COUNT(*) AS count FROM technical_indicators \
       WHERE ticker IN ({placeholders}) AND trading_date BETWEEN ? AND ? AND {} = 1",
      cross.column()
    );
    let mut params: Vec<SqlParam> = candidates.iter().map(|c| c.as_str().into()).collect();
    params.extend([start.as_str().into(), end.as_str().into()]);
    async move {
      let row = tools.db().fetch_one(Source::Technical, &sql, &params).await?;
      Ok::<i64, ToolFault>(row.and_then(|r| r.i64("count")).unwrap_or_default())
    }
  };

  let text = match p.str_or("signal_type", "both").as_str() {
    "golden" => format!("{}번", count(Cross::Golden).await?),
    "dead" => format!("{}번", count(Cross::Dead).await?),
    _ => {
      let golden = count(Cross::Golden).await?;
      let dead = count(Cross::Dead).await?;
      format!("데드크로스 {dead}번, 골든크로스 {golden}번")
    }
  };
  Ok(ToolOutput::ok(text))
}
