//! Number formatting shared by tool handlers and the row formatter.

/// Inserts `,` thousands separators into an integer.
pub fn group_thousands(n: i64) -> String {
  let digits = n.unsigned_abs().to_string();
  let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
  if n < 0 {
    out.push('-');
  }
  let lead = digits.len() % 3;
  for (i, ch) in digits.chars().enumerate() {
    if i > 0 && (i + 3 - lead) % 3 == 0 {
      out.push(',');
    }
    out.push(ch);
  }
  out
}

/// Rounds to the nearest integer and groups thousands.
pub fn grouped(value: f64) -> String {
  group_thousands(value.round() as i64)
}

/// `75,000원`
pub fn won(value: f64) -> String {
  format!("{}원", grouped(value))
}

/// `1,234,567주`
pub fn shares(value: i64) -> String {
  format!("{}주", group_thousands(value))
}

/// `+3.25%` / `-1.10%`
pub fn signed_pct(value: f64) -> String {
  format!("{value:+.2}%")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn groups_thousands() {
    assert_eq!(group_thousands(0), "0");
    assert_eq!(group_thousands(999), "999");
    assert_eq!(group_thousands(1000), "1,000");
    assert_eq!(group_thousands(1234567), "1,234,567");
    assert_eq!(group_thousands(-45000), "-45,000");
  }

  #[test]
  fn formats_units() {
    assert_eq!(won(74999.6), "75,000원");
    assert_eq!(shares(1_500_000), "1,500,000주");
    assert_eq!(signed_pct(3.254), "+3.25%");
    assert_eq!(signed_pct(-1.1), "-1.10%");
  }
}
