//! Company directory loaded from the listing CSV (`ticker, stock_name, market_type`).

use std::path::PathBuf;

use serde::Deserialize;
use tracing::instrument;

use crate::error::ToolFault;

/// One listed company.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Company {
  pub ticker: String,
  pub stock_name: String,
  #[serde(default)]
  pub market_type: String,
}

/// Source of the company listing. The CSV is read on every [`CompanyDirectory::load`].
#[derive(Debug, Clone)]
pub struct CompanyDirectory {
  path: PathBuf,
}

impl CompanyDirectory {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  #[instrument(level = "trace", skip(self), fields(path = %self.path.display()))]
  pub async fn load(&self) -> Result<Companies, ToolFault> {
    let bytes = tokio::fs::read(&self.path).await?;
    Companies::from_csv(bytes.as_slice())
  }
}

/// An in-memory company listing.
#[derive(Debug, Clone, Default)]
pub struct Companies {
  entries: Vec<Company>,
}

impl Companies {
  pub fn new(entries: Vec<Company>) -> Self {
    Self { entries }
  }

  pub fn from_csv<R: std::io::Read>(reader: R) -> Result<Self, ToolFault> {
    let mut rdr = csv::Reader::from_reader(reader);
    let entries = rdr.deserialize().collect::<Result<Vec<Company>, _>>()?;
    Ok(Self { entries })
  }

  /// Exact name matches; if there are none, names containing `name`.
  pub fn search_by_name(&self, name: &str) -> Vec<&Company> {
    let exact: Vec<&Company> = self.entries.iter().filter(|c| c.stock_name == name).collect();
    if !exact.is_empty() {
      return exact;
    }
    if name.is_empty() {
      return Vec::new();
    }
    self
      .entries
      .iter()
      .filter(|c| c.stock_name.contains(name))
      .collect()
  }

  pub fn find_by_ticker(&self, ticker: &str) -> Option<&Company> {
    self.entries.iter().find(|c| c.ticker == ticker)
  }

  /// Display name for a ticker, falling back to the ticker itself.
  pub fn name_for(&self, ticker: &str) -> String {
    self
      .find_by_ticker(ticker)
      .map(|c| c.stock_name.clone())
      .unwrap_or_else(|| ticker.to_string())
  }

  /// Resolves a name or code to a ticker. Codes (all digits, or carrying a suffix) pass
  /// through; names resolve to the first directory match.
  pub fn resolve_ticker(&self, input: &str) -> Option<String> {
    let input = input.trim();
    let is_code = (!input.is_empty() && input.chars().all(|c| c.is_ascii_digit())) || input.contains('.');
    if is_code {
      return Some(input.to_string());
    }
    self.search_by_name(input).first().map(|c| c.ticker.clone())
  }
}
