//! Tests for the entity-listing filter.

use super::result_filter::{DEFAULT_CAP, filter_results, is_entity_line, requested_limit};

fn listing(n: usize) -> String {
  let mut lines = vec!["결과 목록:".to_string()];
  lines.extend((1..=n).map(|i| format!("{i}. 종목{i} (00{i:04}.KS)")));
  lines.join("\n")
}

#[test]
fn classifies_entity_lines() {
  assert!(is_entity_line("삼성전자 (005930)"));
  assert!(is_entity_line("1. 삼성전자"));
  assert!(is_entity_line("삼성전자 | 50,000"));
  assert!(is_entity_line("삼성전자 하락"));
  assert!(!is_entity_line("에코프로비엠 상승"));
  assert!(!is_entity_line("---"));
  assert!(!is_entity_line("ABCDEFG"));
}

#[test]
fn all_keyword_disables_the_cap() {
  let text = listing(150);
  let out = filter_results(&text, "RSI 70 이상 종목 모두 보여줘");
  assert_eq!(out.entity_count, 150);
  assert_eq!(out.limit_applied, None);
  assert_eq!(out.text, text);
}

#[test]
fn large_listings_cap_at_default() {
  let out = filter_results(&listing(150), "RSI 70 이상 종목");
  assert_eq!(out.limit_applied, Some(DEFAULT_CAP));
  let lines: Vec<&str> = out.text.lines().collect();
  assert_eq!(lines[0], "결과 목록:");
  assert_eq!(lines[100], "100. 종목100 (000100.KS)");
  assert!(!out.text.contains("101. 종목101"));
  assert!(out.text.ends_with("\n\n... 등 총 150개 종목이 있습니다."));
}

#[test]
fn explicit_count_wins() {
  let out = filter_results(&listing(20), "상승률 상위 5개");
  assert_eq!(out.limit_applied, Some(5));
  assert!(out.text.contains("5. 종목5"));
  assert!(!out.text.contains("6. 종목6"));
  assert!(out.text.ends_with("... 등 총 20개 종목이 있습니다."));
}

#[test]
fn small_listings_pass_through() {
  let text = listing(30);
  let out = filter_results(&text, "상승 종목");
  assert_eq!(out.limit_applied, None);
  assert_eq!(out.text, text);

  let out = filter_results(&text, "상위 50개");
  assert_eq!(out.text, text);
}

#[test]
fn limit_rules() {
  assert_eq!(requested_limit("전체 종목", 500), None);
  assert_eq!(requested_limit("10개만", 3), Some(10));
  assert_eq!(requested_limit("종목", 101), Some(100));
  assert_eq!(requested_limit("종목", 100), None);
}
