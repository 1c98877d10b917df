//! The production tool box: parameter extraction plus parameterized market data reads.

use async_trait::async_trait;
use tracing::{info, instrument};

use super::handlers::{basic, search, technical};
use super::{ToolBox, ToolId};
use crate::error::ToolFault;
use crate::market::{Companies, CompanyDirectory, MarketDb};
use crate::param_extractor::{ParamExtractor, Params};
use crate::types::ToolOutput;

/// Handlers for every [`ToolId`] except the SQL path.
#[derive(Clone)]
pub struct StockTools {
  extractor: ParamExtractor,
  db: MarketDb,
  directory: CompanyDirectory,
}

impl StockTools {
  pub fn new(extractor: ParamExtractor, db: MarketDb, directory: CompanyDirectory) -> Self {
    Self {
      extractor,
      db,
      directory,
    }
  }

  pub(crate) fn db(&self) -> &MarketDb {
    &self.db
  }

  pub(crate) async fn companies(&self) -> Result<Companies, ToolFault> {
    self.directory.load().await
  }

  pub(crate) async fn params(&self, args: &str, schema: &str, rules: &str) -> Params {
    self.extractor.extract(args, schema, rules).await
  }
}

#[async_trait]
impl ToolBox for StockTools {
  #[instrument(level = "trace", skip(self))]
  async fn invoke(&self, tool: ToolId, args: &str) -> Result<ToolOutput, ToolFault> {
    info!(tool = %tool, "invoking tool");
    match tool {
      ToolId::GetStockPrice => basic::stock_price(self, args).await,
      ToolId::GetMarketStats => basic::market_stats(self, args).await,
      ToolId::GetMarketIndex => basic::market_index(self, args).await,
      ToolId::SearchCompany => basic::company_search(self, args).await,
      ToolId::SearchTradingValueRanking => basic::trading_value_ranking(self, args).await,
      ToolId::SearchPrice => search::price(self, args).await,
      ToolId::SearchPriceChange => search::price_change(self, args).await,
      ToolId::SearchVolume => search::volume(self, args).await,
      ToolId::SearchCompound => search::compound(self, args).await,
      ToolId::GetRsiSignals => technical::rsi_signals(self, args).await,
      ToolId::GetBollingerSignals => technical::bollinger_signals(self, args).await,
      ToolId::GetMaBreakout => technical::ma_breakout(self, args).await,
      ToolId::GetVolumeSurge => technical::volume_surge(self, args).await,
      ToolId::GetCrossSignals => technical::cross_signals(self, args).await,
      ToolId::CountCrossSignals => technical::cross_count(self, args).await,
      ToolId::Text2Sql => Ok(ToolOutput::ok(format!(
        "TEXT2SQL 쿼리가 별도 노드에서 처리됩니다: {args}"
      ))),
    }
  }
}
