//! Caps long entity listings before they reach the answer model.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

static NAME_WITH_CODE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"[\w가-힣]+\s*\([\w\d]+\)").expect("name-with-code pattern"));
static NUMBERED: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^\d+\.\s*[\w가-힣]").expect("numbered pattern"));
static PIPE_VALUE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"[\w가-힣]+\s*\|\s*[\d,]+").expect("pipe-value pattern"));
static COUNT_REQUEST: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)개").expect("count pattern"));

const HANGUL_PROBES: &str = "가나다라마바사아자차카타파하";
const ALL_KEYWORDS: [&str; 3] = ["모두", "전체", "모든"];

/// Entities kept when the query asks for no particular count.
pub const DEFAULT_CAP: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOutcome {
  pub text: String,
  pub entity_count: usize,
  /// The cap that was applied, if the listing was cut.
  pub limit_applied: Option<usize>,
}

/// Heuristic for a line naming a stock or another listed entity.
pub fn is_entity_line(line: &str) -> bool {
  let len = line.chars().count();
  NAME_WITH_CODE.is_match(line)
    || NUMBERED.is_match(line)
    || PIPE_VALUE.is_match(line)
    || (len > 5 && len < 100 && line.chars().any(|c| HANGUL_PROBES.contains(c)))
}

/// The cap implied by the query, given how many entities were found.
pub fn requested_limit(query: &str, entity_count: usize) -> Option<usize> {
  let lowered = query.to_lowercase();
  if ALL_KEYWORDS.iter().any(|k| lowered.contains(k)) {
    return None;
  }
  if let Some(n) = COUNT_REQUEST
    .captures(query)
    .and_then(|c| c[1].parse::<usize>().ok())
  {
    return Some(n);
  }
  (entity_count > DEFAULT_CAP).then_some(DEFAULT_CAP)
}

/// Keeps non-entity lines and the first `limit` entity lines, then notes the total. Text is
/// returned unchanged when no cap applies or the cap is not exceeded.
#[instrument(level = "trace", skip(text))]
pub fn filter_results(text: &str, query: &str) -> FilterOutcome {
  let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
  let entities: Vec<&str> = lines.iter().copied().filter(|l| is_entity_line(l)).collect();
  let entity_count = entities.len();

  match requested_limit(query, entity_count) {
    Some(limit) if limit < entity_count => {
      let mut kept: Vec<&str> = lines
        .iter()
        .copied()
        .filter(|l| !entities.contains(l))
        .collect();
      kept.extend(entities.iter().take(limit));
      let text = format!(
        "{}\n\n... 등 총 {entity_count}개 종목이 있습니다.",
        kept.join("\n")
      );
      debug!(entity_count, limit, "capped entity listing");
      FilterOutcome {
        text,
        entity_count,
        limit_applied: Some(limit),
      }
    }
    _ => FilterOutcome {
      text: text.to_string(),
      entity_count,
      limit_applied: None,
    },
  }
}
