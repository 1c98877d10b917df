//! Tests for `ToolCall`.

use std::collections::HashSet;

use super::{SQL_TOOL_NAME, ToolCall};

#[test]
fn new_accepts_str_and_string() {
  let c = ToolCall::new("search_company", String::from("SK하이닉스"));
  assert_eq!(c.name, "search_company");
  assert_eq!(c.args, "SK하이닉스");
}

#[test]
fn is_sql_only_for_reserved_name() {
  assert!(ToolCall::new(SQL_TOOL_NAME, "q").is_sql());
  assert!(!ToolCall::new("get_stock_price", "q").is_sql());
  assert!(!ToolCall::new("TEXT2SQL", "q").is_sql());
}

#[test]
fn identity_is_name_and_args() {
  let mut set = HashSet::new();
  assert!(set.insert(ToolCall::new("a", "x")));
  assert!(!set.insert(ToolCall::new("a", "x")));
  assert!(set.insert(ToolCall::new("a", "y")));
}
