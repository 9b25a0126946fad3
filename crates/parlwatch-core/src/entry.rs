//! The unified interest record and the page envelope it is served in.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Payer label used when no source of funds can be determined.
pub const DEFAULT_PAYER: &str = "Source not specified";

/// Payer label for child entries whose payer is recorded on the parent.
pub const PARENT_PAYER: &str = "Payer in parent entry";

// ─── Entry ────────────────────────────────────────────────────────────────────

/// One register-of-interests entry, normalised from any upstream shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestEntry {
  pub id:              String,
  pub person_id:       Option<String>,
  pub name:            Option<String>,
  pub constituency:    Option<String>,
  pub category:        Option<String>,
  pub subcategory:     Option<String>,
  /// Always a plain string; [`DEFAULT_PAYER`] when nothing was found.
  pub payer:           String,
  /// GBP, decimal units. Never negative or non-finite.
  pub amount:          Option<f64>,
  pub amount_label:    Option<String>,
  pub received_date:   Option<String>,
  pub registered_date: Option<String>,
  pub purpose:         Option<String>,
  pub link:            Option<String>,
  /// `false` when `id` was synthesized from person, date and payer.
  #[serde(skip)]
  pub natural_id:      bool,
}

impl InterestEntry {
  /// Key used to drop duplicates within one page.
  ///
  /// Upstream ids are trusted as-is. Synthesized ids are too coarse (they
  /// ignore the amount), so those entries are keyed on the composite of
  /// person, payer, received date and amount instead.
  pub fn dedup_key(&self) -> String {
    if self.natural_id {
      return self.id.clone();
    }
    let amount = self
      .amount
      .map(|a| a.to_string())
      .unwrap_or_else(|| "null".to_string());
    format!(
      "{}\u{1f}{}\u{1f}{}\u{1f}{}",
      self.person_id.as_deref().unwrap_or(""),
      self.payer,
      self.received_date.as_deref().unwrap_or(""),
      amount,
    )
  }
}

/// Synthesize an id from whatever identifying parts are present.
pub fn synthesize_id(
  person_id: Option<&str>,
  date: Option<&str>,
  payer: Option<&str>,
) -> String {
  format!(
    "{}-{}-{}",
    person_id.filter(|s| !s.is_empty()).unwrap_or("x"),
    date.filter(|s| !s.is_empty()).unwrap_or("x"),
    payer.filter(|s| !s.is_empty()).unwrap_or("x"),
  )
}

/// Drop entries whose [`InterestEntry::dedup_key`] was already seen.
/// The first occurrence wins and relative order is preserved.
pub fn dedup(entries: Vec<InterestEntry>) -> Vec<InterestEntry> {
  let mut seen = HashSet::new();
  entries
    .into_iter()
    .filter(|e| seen.insert(e.dedup_key()))
    .collect()
}

/// Sort newest first by received date; undated entries go last.
pub fn sort_by_received_desc(entries: &mut [InterestEntry]) {
  entries.sort_by(|a, b| {
    let ka = a.received_date.as_deref().and_then(crate::date::parse_timestamp);
    let kb = b.received_date.as_deref().and_then(crate::date::parse_timestamp);
    match (ka, kb) {
      (Some(a), Some(b)) => b.cmp(&a),
      (Some(_), None) => std::cmp::Ordering::Less,
      (None, Some(_)) => std::cmp::Ordering::Greater,
      (None, None) => std::cmp::Ordering::Equal,
    }
  });
}

// ─── Page envelope ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
  pub limit:       u32,
  pub offset:      u32,
  pub next_offset: Option<u32>,
}

impl Page {
  /// A further page exists when the upstream filled this one completely.
  pub fn new(limit: u32, offset: u32, upstream_rows: usize) -> Self {
    let next_offset =
      (upstream_rows == limit as usize).then(|| offset.saturating_add(limit));
    Self { limit, offset, next_offset }
  }

  /// Paging over a list already held in memory of `total` entries.
  pub fn in_memory(limit: u32, offset: u32, total: usize) -> Self {
    let end = offset as usize + limit as usize;
    let next_offset = (total > end).then(|| offset.saturating_add(limit));
    Self { limit, offset, next_offset }
  }
}

/// Echo of the recognised filters; absent ones serialise as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
  pub start:      Option<String>,
  pub end:        Option<String>,
  pub payer:      Option<String>,
  pub category:   Option<String>,
  pub min_amount: Option<f64>,
  pub max_amount: Option<f64>,
  pub person_id:  Option<String>,
  pub member_id:  Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestsPage {
  pub results: Vec<InterestEntry>,
  pub page:    Page,
  pub filters: Filters,
}
