//! Aggregations over a page of entries: payer groups and monthly totals.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  date::parse_timestamp,
  entry::{InterestEntry, sort_by_received_desc},
};

/// Trailing window used for monthly totals.
pub const DEFAULT_WINDOW_DAYS: i64 = 365;

const LEGAL_SUFFIXES: &[&str] = &["ltd", "limited", "plc", "llp"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayerGroup {
  pub key:     String,
  /// Display name, taken from the newest entry in the group.
  pub payer:   String,
  pub total:   f64,
  pub count:   usize,
  pub entries: Vec<InterestEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
  /// `YYYY-MM`
  pub month: String,
  pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestSummary {
  pub groups:  Vec<PayerGroup>,
  pub monthly: Vec<MonthlyTotal>,
  pub total:   f64,
}

/// Grouping key that treats "GB News Ltd" and "GB News Limited." alike.
pub fn payer_key(payer: &str) -> String {
  let lowered: String = payer
    .to_lowercase()
    .chars()
    .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
    .collect();
  let mut words: Vec<&str> = lowered.split_whitespace().collect();
  while words.len() > 1
    && words.last().is_some_and(|w| LEGAL_SUFFIXES.contains(w))
  {
    words.pop();
  }
  words.join(" ")
}

/// Group entries by [`payer_key`], largest total first.
pub fn group_by_payer(entries: &[InterestEntry]) -> Vec<PayerGroup> {
  let mut order: Vec<String> = Vec::new();
  let mut buckets: HashMap<String, Vec<InterestEntry>> = HashMap::new();
  for e in entries {
    let key = payer_key(&e.payer);
    buckets
      .entry(key.clone())
      .or_insert_with(|| {
        order.push(key);
        Vec::new()
      })
      .push(e.clone());
  }

  let mut groups: Vec<PayerGroup> = order
    .into_iter()
    .filter_map(|key| {
      let mut members = buckets.remove(&key)?;
      sort_by_received_desc(&mut members);
      Some(PayerGroup {
        payer: members.first().map(|e| e.payer.clone()).unwrap_or_default(),
        total: members.iter().filter_map(|e| e.amount).sum(),
        count: members.len(),
        key,
        entries: members,
      })
    })
    .collect();

  groups.sort_by(|a, b| b.total.total_cmp(&a.total));
  groups
}

/// Sum of amounts per month for entries received within `days` before `now`.
pub fn monthly_totals(
  entries: &[InterestEntry],
  now: DateTime<Utc>,
  days: i64,
) -> Vec<MonthlyTotal> {
  let from = now - Duration::days(days);
  let mut months: BTreeMap<String, f64> = BTreeMap::new();
  for e in entries {
    let (Some(received), Some(amount)) = (
      e.received_date.as_deref().and_then(parse_timestamp),
      e.amount,
    ) else {
      continue;
    };
    if received < from || received > now {
      continue;
    }
    *months.entry(received.format("%Y-%m").to_string()).or_default() += amount;
  }
  months
    .into_iter()
    .map(|(month, total)| MonthlyTotal { month, total })
    .collect()
}

pub fn summarize(entries: &[InterestEntry], now: DateTime<Utc>) -> InterestSummary {
  InterestSummary {
    groups:  group_by_payer(entries),
    monthly: monthly_totals(entries, now, DEFAULT_WINDOW_DAYS),
    total:   entries.iter().filter_map(|e| e.amount).sum(),
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn entry(payer: &str, amount: Option<f64>, received: &str) -> InterestEntry {
    InterestEntry {
      id:              format!("{payer}-{received}"),
      person_id:       None,
      name:            None,
      constituency:    None,
      category:        None,
      subcategory:     None,
      payer:           payer.into(),
      amount,
      amount_label:    None,
      received_date:   Some(received.into()),
      registered_date: None,
      purpose:         None,
      link:            None,
      natural_id:      true,
    }
  }

  #[test]
  fn payer_keys_ignore_suffix_and_punctuation() {
    assert_eq!(payer_key("GB News Ltd"), "gb news");
    assert_eq!(payer_key("GB News Limited."), "gb news");
    assert_eq!(payer_key("  Limited "), "limited");
  }

  #[test]
  fn groups_sorted_by_total() {
    let entries = vec![
      entry("Small Co Ltd", Some(10.0), "2024-01-01T00:00:00Z"),
      entry("GB News Ltd", Some(100.0), "2024-01-01T00:00:00Z"),
      entry("GB News Limited", Some(50.0), "2024-03-01T00:00:00Z"),
    ];
    let groups = group_by_payer(&entries);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].key, "gb news");
    assert_eq!(groups[0].total, 150.0);
    assert_eq!(groups[0].count, 2);
    assert_eq!(groups[0].payer, "GB News Limited");
    assert_eq!(groups[1].total, 10.0);
  }

  #[test]
  fn monthly_totals_respect_window() {
    let now = Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap();
    let entries = vec![
      entry("A", Some(100.0), "2024-06-02T00:00:00Z"),
      entry("B", Some(50.0), "2024-06-20T00:00:00Z"),
      entry("C", Some(25.0), "2024-11-01T00:00:00Z"),
      entry("Old", Some(999.0), "2023-06-01T00:00:00Z"),
      entry("Future", Some(7.0), "2025-02-01T00:00:00Z"),
      entry("Unpriced", None, "2024-06-02T00:00:00Z"),
    ];
    let monthly = monthly_totals(&entries, now, DEFAULT_WINDOW_DAYS);
    assert_eq!(monthly, vec![
      MonthlyTotal { month: "2024-06".into(), total: 150.0 },
      MonthlyTotal { month: "2024-11".into(), total: 25.0 },
    ]);
  }
}
