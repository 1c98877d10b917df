//! Pulls the SQL statement out of a model reply.

use once_cell::sync::Lazy;
use regex::Regex;

static SQL_FENCE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"(?is)```sql\s*(.*?)\s*```").expect("sql fence pattern"));

/// Line prefixes that keep an unfenced statement going.
const CONTINUATIONS: [&str; 10] = [
  "SELECT", "FROM", "WHERE", "GROUP", "ORDER", "HAVING", "LIMIT", "AND", "OR", "WITH",
];

/// Returns the first fenced `sql` block, or else the lines starting at the first `SELECT`.
/// The unfenced scan stops after a line ending in `;` or after a line that does not start
/// with a continuation keyword. Trailing semicolons are removed. `None` when nothing remains.
pub fn extract_sql(reply: &str) -> Option<String> {
  let sql = match SQL_FENCE.captures(reply) {
    Some(caps) => caps[1].trim().to_string(),
    None => scan_lines(reply),
  };
  let sql = sql.trim_end_matches(';').trim().to_string();
  (!sql.is_empty()).then_some(sql)
}

fn scan_lines(reply: &str) -> String {
  let mut lines = Vec::new();
  let mut in_sql = false;
  for line in reply.lines().map(str::trim) {
    let upper = line.to_uppercase();
    if upper.starts_with("SELECT") {
      in_sql = true;
    }
    if !in_sql {
      continue;
    }
    lines.push(line);
    let continues = CONTINUATIONS.iter().any(|k| upper.starts_with(k));
    if line.ends_with(';') || (!line.is_empty() && !continues) {
      break;
    }
  }
  lines.join("\n")
}
