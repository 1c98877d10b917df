//! Closed set of tools the model may call.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::SQL_TOOL_NAME;

/// Identifier of a registered tool. Dispatch matches on this exhaustively; the only string
/// lookup is [`ToolId::from_name`] at the parse boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolId {
  GetStockPrice,
  GetMarketStats,
  GetMarketIndex,
  SearchCompany,
  SearchPrice,
  SearchPriceChange,
  SearchVolume,
  SearchTradingValueRanking,
  GetRsiSignals,
  GetBollingerSignals,
  GetMaBreakout,
  GetVolumeSurge,
  GetCrossSignals,
  CountCrossSignals,
  SearchCompound,
  Text2Sql,
}

impl ToolId {
  /// Registration order; the propose prompt lists tools in this order.
  pub const ALL: [ToolId; 16] = [
    ToolId::GetStockPrice,
    ToolId::GetMarketStats,
    ToolId::GetMarketIndex,
    ToolId::SearchCompany,
    ToolId::SearchPrice,
    ToolId::SearchPriceChange,
    ToolId::SearchVolume,
    ToolId::SearchTradingValueRanking,
    ToolId::GetRsiSignals,
    ToolId::GetBollingerSignals,
    ToolId::GetMaBreakout,
    ToolId::GetVolumeSurge,
    ToolId::GetCrossSignals,
    ToolId::CountCrossSignals,
    ToolId::SearchCompound,
    ToolId::Text2Sql,
  ];

  pub fn name(self) -> &'static str {
    match self {
      ToolId::GetStockPrice => "get_stock_price",
      ToolId::GetMarketStats => "get_market_stats",
      ToolId::GetMarketIndex => "get_market_index",
      ToolId::SearchCompany => "search_company",
      ToolId::SearchPrice => "search_price",
      ToolId::SearchPriceChange => "search_price_change",
      ToolId::SearchVolume => "search_volume",
      ToolId::SearchTradingValueRanking => "search_trading_value_ranking",
      ToolId::GetRsiSignals => "get_rsi_signals",
      ToolId::GetBollingerSignals => "get_bollinger_signals",
      ToolId::GetMaBreakout => "get_ma_breakout",
      ToolId::GetVolumeSurge => "get_volume_surge",
      ToolId::GetCrossSignals => "get_cross_signals",
      ToolId::CountCrossSignals => "count_cross_signals",
      ToolId::SearchCompound => "search_compound",
      ToolId::Text2Sql => SQL_TOOL_NAME,
    }
  }

  pub fn from_name(name: &str) -> Option<ToolId> {
    ToolId::ALL.into_iter().find(|t| t.name() == name)
  }

  /// Description shown to the model in the propose prompt.
  pub fn description(self) -> &'static str {
    match self {
      ToolId::GetStockPrice => {
        "특정 종목의 특정날짜의 시가/고가/저가/종가/거래량/등락률을 조회합니다. 종목명(삼성전자)이나 코드(005930)로 검색 가능"
      }
      ToolId::GetMarketIndex => "시장 지수를 조회합니다. KOSPI나 KOSDAQ 지수값을 날짜별로 조회 가능",
      ToolId::GetMarketStats => {
        "시장 통계를 조회합니다. 제공 정보: 전체/상승/하락/보합 종목수, KOSPI/KOSDAQ 종목수, 시장 평균 등락률, 최고/최저 등락률, 전체 거래대금, 상승/하락 종목 평균 등락률"
      }
      ToolId::SearchCompany => "회사명으로 종목을 검색합니다. 부분 검색도 가능",
      ToolId::SearchPrice => {
        "가격 기준 검색을 수행합니다. 가격 순위 조회 및 가격 범위 검색 모두 가능. 시가/고가/저가/종가 지원"
      }
      ToolId::SearchPriceChange => {
        "등락률 기준 검색을 수행합니다. 상승률/하락률 순위 조회 및 등락률 범위 검색 모두 가능"
      }
      ToolId::SearchVolume => {
        "거래량 기준 검색을 수행합니다. 거래량 순위 조회 및 거래량 임계값 검색 모두 가능"
      }
      ToolId::SearchTradingValueRanking => "거래대금 순위를 조회합니다. 거래대금 상위 종목들",
      ToolId::GetRsiSignals => {
        "RSI 기반 과매수/과매도 신호를 감지합니다. RSI 70 이상 과매수, 30 이하 과매도 종목 검색"
      }
      ToolId::GetBollingerSignals => {
        "볼린저 밴드 상단/하단 터치 종목을 검색합니다. 볼린저 밴드 신호 감지"
      }
      ToolId::GetMaBreakout => "이동평균선 돌파 종목을 검색합니다. 5일, 20일, 60일 이동평균 돌파 분석",
      ToolId::GetVolumeSurge => {
        "거래량 급증 종목을 검색합니다. 20일 평균 대비 100%, 200%, 300%, 500% 이상 급증 (※전날대비/어제대비/하루대비는 TEXT2SQL 사용)"
      }
      ToolId::GetCrossSignals => {
        "특정 기간 동안 골든크로스/데드크로스가 발생한 종목 목록을 검색합니다. '어떤 종목이 데드크로스 발생했는지' 질문에 사용"
      }
      ToolId::CountCrossSignals => {
        "특정 종목 하나의 골든크로스/데드크로스 발생 횟수를 계산합니다. '삼성전자가 몇 번 데드크로스 발생했는지' 질문에 사용"
      }
      ToolId::SearchCompound => {
        "복합조건 검색을 수행합니다. 가격, 등락률, 거래량, RSI 등 여러 조건을 동시에 만족하는 종목을 검색"
      }
      ToolId::Text2Sql => {
        "복잡한 계산이나 집계가 필요한 쿼리를 처리합니다. 전날대비 비교, 시장 비율 계산, 복잡한 조건 검색 등에 사용"
      }
    }
  }

  /// Tools whose output can list many entities and is passed through the result filter.
  pub fn needs_filtering(self) -> bool {
    matches!(
      self,
      ToolId::SearchPriceChange
        | ToolId::SearchVolume
        | ToolId::SearchPrice
        | ToolId::SearchCompound
        | ToolId::GetRsiSignals
        | ToolId::GetMaBreakout
        | ToolId::GetVolumeSurge
        | ToolId::GetCrossSignals
        | ToolId::Text2Sql
    )
  }

  pub fn is_sql(self) -> bool {
    self == ToolId::Text2Sql
  }
}

impl fmt::Display for ToolId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

#[cfg(test)]
mod tests {
  use super::ToolId;

  #[test]
  fn names_roundtrip_through_from_name() {
    for tool in ToolId::ALL {
      assert_eq!(ToolId::from_name(tool.name()), Some(tool));
    }
    assert_eq!(ToolId::from_name("get_weather"), None);
  }

  #[test]
  fn filtering_set_has_nine_members() {
    let n = ToolId::ALL.iter().filter(|t| t.needs_filtering()).count();
    assert_eq!(n, 9);
    assert!(!ToolId::GetStockPrice.needs_filtering());
    assert!(ToolId::Text2Sql.needs_filtering());
  }

  #[test]
  fn only_text2sql_is_sql() {
    assert_eq!(
      ToolId::ALL.iter().filter(|t| t.is_sql()).collect::<Vec<_>>(),
      vec![&ToolId::Text2Sql]
    );
  }
}
