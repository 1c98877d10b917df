//! Tests for `Stage`.

use super::Stage;

#[test]
fn only_clarify_and_generate_are_terminal() {
  let terminal: Vec<_> = all().into_iter().filter(|s| s.is_terminal()).collect();
  assert_eq!(terminal, vec![Stage::Clarify, Stage::Generate]);
}

#[test]
fn display_matches_serde_name() {
  for s in all() {
    let json = serde_json::to_string(&s).unwrap();
    assert_eq!(json, format!("\"{}\"", s));
  }
}

#[test]
fn start_is_propose() {
  assert_eq!(Stage::START, Stage::Propose);
}

fn all() -> Vec<Stage> {
  vec![
    Stage::Propose,
    Stage::Parse,
    Stage::Dispatch,
    Stage::ExecuteStructured,
    Stage::ExecuteSql,
    Stage::DecidePostExecute,
    Stage::Clarify,
    Stage::FilterDecide,
    Stage::Filter,
    Stage::Generate,
  ]
}
