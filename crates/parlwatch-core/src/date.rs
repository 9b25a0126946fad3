//! Date normalisation shared by every upstream mapping.
//!
//! Sources disagree on whether dates carry a time component. Everything that
//! leaves this crate is either a full ISO-8601 timestamp or passed through
//! untouched when it is not a bare calendar date.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

static BARE_DATE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static regex"));

/// Give a bare `YYYY-MM-DD` a midnight-UTC time component.
///
/// Other non-empty input is returned unchanged; empty input yields `None`.
pub fn to_canonical_date(input: &str) -> Option<String> {
  let trimmed = input.trim();
  if trimmed.is_empty() {
    return None;
  }
  if BARE_DATE.is_match(trimmed) {
    Some(format!("{trimmed}T00:00:00Z"))
  } else {
    Some(input.to_string())
  }
}

/// Best-effort parse of the timestamp shapes upstreams emit.
///
/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS` (assumed UTC) and bare dates.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
  let s = input.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(dt.with_timezone(&Utc));
  }
  if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
    return Some(naive.and_utc());
  }
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|naive| naive.and_utc())
}

/// Whether `s` is a bare `YYYY-MM-DD` calendar date.
pub fn is_bare_date(s: &str) -> bool {
  BARE_DATE.is_match(s) && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bare_date_gains_midnight_utc() {
    assert_eq!(
      to_canonical_date("2024-07-15").as_deref(),
      Some("2024-07-15T00:00:00Z")
    );
  }

  #[test]
  fn empty_input_is_none() {
    assert_eq!(to_canonical_date(""), None);
    assert_eq!(to_canonical_date("   "), None);
  }

  #[test]
  fn timestamps_pass_through() {
    assert_eq!(
      to_canonical_date("2024-07-15T09:30:00Z").as_deref(),
      Some("2024-07-15T09:30:00Z")
    );
    assert_eq!(to_canonical_date("15 July 2024").as_deref(), Some("15 July 2024"));
  }

  #[test]
  fn parses_naive_parliament_timestamps() {
    let dt = parse_timestamp("2024-07-15T00:00:00").unwrap();
    assert_eq!(dt.format("%Y-%m-%d").to_string(), "2024-07-15");
    assert!(parse_timestamp("not a date").is_none());
  }

  #[test]
  fn bare_date_check_rejects_impossible_dates() {
    assert!(is_bare_date("2024-02-29"));
    assert!(!is_bare_date("2024-13-01"));
    assert!(!is_bare_date("2024-01-01T00:00:00Z"));
  }
}
