//! Allow-list validation of generated SQL.

use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};
use sqlparser::ast::{ObjectName, Query, Statement, Visit, Visitor};
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;

use crate::error::SqlError;

/// Table generated SQL may read.
pub const ALLOWED_TABLE: &str = "stock_prices";

/// How much generated SQL is trusted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlPolicy {
  /// One read-only query over `stock_prices` and its own CTEs.
  #[default]
  AllowList,
  /// Run whatever the model wrote.
  TrustModel,
}

impl SqlPolicy {
  pub fn check(self, sql: &str) -> Result<(), SqlError> {
    match self {
      SqlPolicy::AllowList => validate(sql),
      SqlPolicy::TrustModel => Ok(()),
    }
  }
}

impl std::str::FromStr for SqlPolicy {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().replace('-', "_").as_str() {
      "allow_list" | "allowlist" => Ok(SqlPolicy::AllowList),
      "trust_model" | "trust" => Ok(SqlPolicy::TrustModel),
      other => Err(format!("unknown sql policy: {other}")),
    }
  }
}

/// CTE names declared by one query. Non-recursive CTEs become visible one at a time as
/// their bodies finish; the query body sees all of them.
struct Scope {
  names: Vec<String>,
  finished: usize,
  recursive: bool,
}

impl Scope {
  fn visible(&self) -> &[String] {
    let open = self.finished + usize::from(self.recursive);
    &self.names[..open.min(self.names.len())]
  }
}

/// Walks every relation with the CTE scopes open at that point; breaks on the first one
/// that is neither `stock_prices` nor a visible CTE.
#[derive(Default)]
struct Relations {
  scopes: Vec<Scope>,
}

impl Relations {
  fn is_visible_cte(&self, name: &str) -> bool {
    self
      .scopes
      .iter()
      .any(|scope| scope.visible().iter().any(|cte| cte == name))
  }
}

impl Visitor for Relations {
  type Break = String;

  fn pre_visit_query(&mut self, query: &Query) -> ControlFlow<Self::Break> {
    let (names, recursive) = match &query.with {
      Some(with) => (
        with
          .cte_tables
          .iter()
          .map(|cte| cte.alias.name.value.to_lowercase())
          .collect(),
        with.recursive,
      ),
      None => (Vec::new(), false),
    };
    self.scopes.push(Scope {
      names,
      finished: 0,
      recursive,
    });
    ControlFlow::Continue(())
  }

  fn post_visit_query(&mut self, _query: &Query) -> ControlFlow<Self::Break> {
    self.scopes.pop();
    if let Some(parent) = self.scopes.last_mut() {
      parent.finished += 1;
    }
    ControlFlow::Continue(())
  }

  fn pre_visit_relation(&mut self, relation: &ObjectName) -> ControlFlow<Self::Break> {
    let parts: Vec<String> = relation
      .0
      .iter()
      .map(|ident| ident.value.to_lowercase())
      .collect();
    let allowed = match parts.as_slice() {
      [table] => table == ALLOWED_TABLE || self.is_visible_cte(table),
      [schema, table] => schema == "main" && table == ALLOWED_TABLE,
      _ => false,
    };
    if allowed {
      ControlFlow::Continue(())
    } else {
      ControlFlow::Break(parts.join("."))
    }
  }
}

/// Accepts exactly one query statement whose relations are all `stock_prices` (optionally
/// `main.`-qualified) or CTEs in scope where they are referenced.
pub fn validate(sql: &str) -> Result<(), SqlError> {
  let statements =
    Parser::parse_sql(&SQLiteDialect {}, sql).map_err(|e| SqlError::Parse(e.to_string()))?;
  let statement = match statements.as_slice() {
    [single] => single,
    [] => return Err(SqlError::NoStatement),
    many => {
      return Err(SqlError::Rejected(format!(
        "하나의 문장만 허용됩니다 ({}개 발견)",
        many.len()
      )));
    }
  };
  if !matches!(statement, Statement::Query(_)) {
    return Err(SqlError::Rejected("SELECT 쿼리만 허용됩니다".to_string()));
  }

  match statement.visit(&mut Relations::default()) {
    ControlFlow::Break(table) => Err(SqlError::Rejected(format!(
      "허용되지 않은 테이블: {table}"
    ))),
    ControlFlow::Continue(()) => Ok(()),
  }
}
