//! Agent configuration: data paths, model endpoint and names, SQL policy.
//!
//! Defaults come from [`AgentConfig::default`]; environment variables override them through
//! [`AgentConfig::apply_env_overrides`].

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AgentError;
use crate::llm::DEFAULT_CLOVA_ENDPOINT;
use crate::sql_synthesis::SqlPolicy;

pub const ENV_API_KEY: &str = "CLOVASTUDIO_API_KEY";
pub const ENV_ENDPOINT: &str = "CLOVASTUDIO_ENDPOINT";
pub const ENV_STOCK_DB: &str = "STOCK_DB_PATH";
pub const ENV_MARKET_DB: &str = "MARKET_DB_PATH";
pub const ENV_TECHNICAL_DB: &str = "TECHNICAL_DB_PATH";
pub const ENV_COMPANY_CSV: &str = "COMPANY_CSV_PATH";
pub const ENV_MAIN_MODEL: &str = "STOCK_AGENT_MAIN_MODEL";
pub const ENV_SIMPLE_MODEL: &str = "STOCK_AGENT_SIMPLE_MODEL";
pub const ENV_TEMPERATURE: &str = "STOCK_AGENT_TEMPERATURE";
pub const ENV_TIMEOUT_SECS: &str = "STOCK_AGENT_TIMEOUT_SECS";
pub const ENV_SQL_POLICY: &str = "STOCK_AGENT_SQL_POLICY";
pub const ENV_DETAILED_LOGGING: &str = "STOCK_AGENT_DETAILED_LOGGING";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
  pub stock_db_path: PathBuf,
  pub market_db_path: PathBuf,
  pub technical_db_path: PathBuf,
  pub company_csv_path: PathBuf,
  pub endpoint: String,
  /// Never written out.
  #[serde(skip_serializing)]
  pub api_key: Option<String>,
  /// Proposes calls, writes SQL, and writes the final answer.
  pub main_model: String,
  /// Extracts tool parameters.
  pub simple_model: String,
  pub temperature: f32,
  pub timeout_secs: u64,
  pub sql_policy: SqlPolicy,
  pub detailed_logging: bool,
}

impl Default for AgentConfig {
  fn default() -> Self {
    Self {
      stock_db_path: PathBuf::from("stock_info.db"),
      market_db_path: PathBuf::from("market_index.db"),
      technical_db_path: PathBuf::from("technical_indicators.db"),
      company_csv_path: PathBuf::from("company_info.csv"),
      endpoint: DEFAULT_CLOVA_ENDPOINT.to_string(),
      api_key: None,
      main_model: "HCX-007".to_string(),
      simple_model: "HCX-005".to_string(),
      temperature: 0.1,
      timeout_secs: 60,
      sql_policy: SqlPolicy::AllowList,
      detailed_logging: true,
    }
  }
}

fn parsed<T: FromStr>(key: &str, raw: &str) -> Result<T, AgentError> {
  raw
    .trim()
    .parse()
    .map_err(|_| AgentError::Config(format!("{key}: invalid value {raw:?}")))
}

fn flag(key: &str, raw: &str) -> Result<bool, AgentError> {
  match raw.trim().to_lowercase().as_str() {
    "1" | "true" | "yes" | "on" => Ok(true),
    "0" | "false" | "no" | "off" => Ok(false),
    _ => Err(AgentError::Config(format!("{key}: invalid value {raw:?}"))),
  }
}

impl AgentConfig {
  /// Defaults overridden by the process environment.
  pub fn from_env() -> Result<Self, AgentError> {
    Self::default().apply_env_overrides()
  }

  pub fn apply_env_overrides(self) -> Result<Self, AgentError> {
    self.apply_overrides(|key| std::env::var(key).ok())
  }

  /// Applies every variable `lookup` knows. Empty values are ignored.
  pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, AgentError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get(ENV_API_KEY) {
      self.api_key = Some(v);
    }
    if let Some(v) = get(ENV_ENDPOINT) {
      self.endpoint = v;
    }
    if let Some(v) = get(ENV_STOCK_DB) {
      self.stock_db_path = PathBuf::from(v);
    }
    if let Some(v) = get(ENV_MARKET_DB) {
      self.market_db_path = PathBuf::from(v);
    }
    if let Some(v) = get(ENV_TECHNICAL_DB) {
      self.technical_db_path = PathBuf::from(v);
    }
    if let Some(v) = get(ENV_COMPANY_CSV) {
      self.company_csv_path = PathBuf::from(v);
    }
    if let Some(v) = get(ENV_MAIN_MODEL) {
      self.main_model = v;
    }
    if let Some(v) = get(ENV_SIMPLE_MODEL) {
      self.simple_model = v;
    }
    if let Some(v) = get(ENV_TEMPERATURE) {
      self.temperature = parsed(ENV_TEMPERATURE, &v)?;
    }
    if let Some(v) = get(ENV_TIMEOUT_SECS) {
      self.timeout_secs = parsed(ENV_TIMEOUT_SECS, &v)?;
    }
    if let Some(v) = get(ENV_SQL_POLICY) {
      self.sql_policy = v.parse().map_err(AgentError::Config)?;
    }
    if let Some(v) = get(ENV_DETAILED_LOGGING) {
      self.detailed_logging = flag(ENV_DETAILED_LOGGING, &v)?;
    }
    Ok(self)
  }

  /// The API key, or a configuration error naming the variable to set.
  pub fn require_api_key(&self) -> Result<&str, AgentError> {
    self
      .api_key
      .as_deref()
      .filter(|k| !k.trim().is_empty())
      .ok_or_else(|| AgentError::Config(format!("{ENV_API_KEY}가 설정되지 않았습니다.")))
  }

  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;

  fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    move |key| map.get(key).cloned()
  }

  #[test]
  fn defaults_use_two_model_tiers() {
    let config = AgentConfig::default();
    assert_eq!(config.main_model, "HCX-007");
    assert_eq!(config.simple_model, "HCX-005");
    assert_eq!(config.temperature, 0.1);
    assert_eq!(config.sql_policy, SqlPolicy::AllowList);
    assert!(config.detailed_logging);
    assert_eq!(config.endpoint, DEFAULT_CLOVA_ENDPOINT);
  }

  #[test]
  fn environment_overrides_defaults() {
    let config = AgentConfig::default()
      .apply_overrides(env(&[
        (ENV_API_KEY, "nv-secret"),
        (ENV_STOCK_DB, "/data/stock.db"),
        (ENV_TIMEOUT_SECS, "15"),
        (ENV_SQL_POLICY, "trust-model"),
        (ENV_DETAILED_LOGGING, "off"),
        (ENV_MAIN_MODEL, ""),
      ]))
      .unwrap();
    assert_eq!(config.require_api_key().unwrap(), "nv-secret");
    assert_eq!(config.stock_db_path, PathBuf::from("/data/stock.db"));
    assert_eq!(config.timeout(), Duration::from_secs(15));
    assert_eq!(config.sql_policy, SqlPolicy::TrustModel);
    assert!(!config.detailed_logging);
    assert_eq!(config.main_model, "HCX-007");
  }

  #[test]
  fn bad_values_are_config_errors() {
    let err = AgentConfig::default()
      .apply_overrides(env(&[(ENV_TEMPERATURE, "warm")]))
      .unwrap_err();
    assert!(matches!(err, AgentError::Config(m) if m.contains(ENV_TEMPERATURE)));

    let err = AgentConfig::default()
      .apply_overrides(env(&[(ENV_SQL_POLICY, "yolo")]))
      .unwrap_err();
    assert!(matches!(err, AgentError::Config(_)));
  }

  #[test]
  fn missing_api_key_is_reported() {
    let err = AgentConfig::default().require_api_key().unwrap_err();
    assert!(err.to_string().contains(ENV_API_KEY));
  }

  #[test]
  fn api_key_is_not_serialized() {
    let config = AgentConfig {
      api_key: Some("nv-secret".to_string()),
      ..AgentConfig::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    assert!(!json.contains("nv-secret"));
    let back: AgentConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back.api_key, None);
    assert_eq!(back.main_model, "HCX-007");
  }
}
