//! Caller query parameters and their translation into the Datasette dialect.
//!
//! | Param | Aliases | Notes |
//! |-------|---------|-------|
//! | `start`, `end` | | `YYYY-MM-DD`, inclusive, on the received date |
//! | `payer` | | substring match |
//! | `category` | | exact match |
//! | `minAmount`, `maxAmount` | | GBP |
//! | `personId` | `PersonId` | |
//! | `memberId` | `MemberId`, `mpId` | |
//! | `limit` | `Take` | default 100, capped at [`MAX_LIMIT`] |
//! | `offset` | `Skip` | default 0 |
//!
//! Anything else on the query string is ignored.

use serde::Deserialize;

use crate::{
  date::{is_bare_date, parse_timestamp},
  entry::{Filters, InterestEntry},
  error::{Error, Result},
};

pub const DEFAULT_LIMIT: u32 = 100;
pub const MAX_LIMIT: u32 = 500;

/// Table queried on the Datasette instance.
pub const INTERESTS_TABLE: &str = "register_interests";

// ─── Raw params ───────────────────────────────────────────────────────────────

/// Query string as received; every value is kept as text until validated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestParams {
  pub start:      Option<String>,
  pub end:        Option<String>,
  pub payer:      Option<String>,
  pub category:   Option<String>,
  pub min_amount: Option<String>,
  pub max_amount: Option<String>,
  #[serde(alias = "PersonId")]
  pub person_id:  Option<String>,
  #[serde(alias = "MemberId", alias = "mpId")]
  pub member_id:  Option<String>,
  #[serde(alias = "Take")]
  pub limit:      Option<String>,
  #[serde(alias = "Skip")]
  pub offset:     Option<String>,
  /// `diag=1` requests diagnostic output, if the server allows it.
  pub diag:       Option<String>,
}

impl InterestParams {
  pub fn wants_diagnostics(&self) -> bool {
    self.diag.as_deref() == Some("1")
  }
}

// ─── Validated query ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct InterestQuery {
  pub start:      Option<String>,
  pub end:        Option<String>,
  pub payer:      Option<String>,
  pub category:   Option<String>,
  pub min_amount: Option<f64>,
  pub max_amount: Option<f64>,
  pub person_id:  Option<String>,
  pub member_id:  Option<String>,
  pub limit:      u32,
  pub offset:     u32,
}

impl Default for InterestQuery {
  fn default() -> Self {
    Self {
      start:      None,
      end:        None,
      payer:      None,
      category:   None,
      min_amount: None,
      max_amount: None,
      person_id:  None,
      member_id:  None,
      limit:      DEFAULT_LIMIT,
      offset:     0,
    }
  }
}

fn non_empty(v: Option<String>) -> Option<String> {
  v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn date_param(name: &'static str, v: Option<String>) -> Result<Option<String>> {
  match non_empty(v) {
    Some(d) if !is_bare_date(&d) => Err(Error::InvalidDate { name, value: d }),
    other => Ok(other),
  }
}

fn amount_param(name: &'static str, v: Option<String>) -> Result<Option<f64>> {
  non_empty(v)
    .map(|s| {
      s.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or(Error::InvalidNumber { name, value: s })
    })
    .transpose()
}

impl TryFrom<InterestParams> for InterestQuery {
  type Error = Error;

  fn try_from(p: InterestParams) -> Result<Self> {
    let limit = non_empty(p.limit)
      .and_then(|s| s.parse::<i64>().ok())
      .filter(|n| *n > 0)
      .map_or(DEFAULT_LIMIT, |n| n.min(i64::from(MAX_LIMIT)) as u32);
    let offset = non_empty(p.offset)
      .and_then(|s| s.parse::<u32>().ok())
      .unwrap_or(0);

    Ok(Self {
      start: date_param("start", p.start)?,
      end: date_param("end", p.end)?,
      payer: non_empty(p.payer),
      category: non_empty(p.category),
      min_amount: amount_param("minAmount", p.min_amount)?,
      max_amount: amount_param("maxAmount", p.max_amount)?,
      person_id: non_empty(p.person_id),
      member_id: non_empty(p.member_id),
      limit,
      offset,
    })
  }
}

impl InterestQuery {
  pub fn filters(&self) -> Filters {
    Filters {
      start:      self.start.clone(),
      end:        self.end.clone(),
      payer:      self.payer.clone(),
      category:   self.category.clone(),
      min_amount: self.min_amount,
      max_amount: self.max_amount,
      person_id:  self.person_id.clone(),
      member_id:  self.member_id.clone(),
    }
  }

  /// SQL template for the Datasette instance. Values travel separately as
  /// named parameters, see [`InterestQuery::bind_params`].
  pub fn to_sql(&self) -> String {
    const AMOUNT: &str = "CAST(REPLACE(REPLACE(IFNULL(amount, value), ',', ''), '£', '') AS REAL)";

    let mut clauses: Vec<String> = Vec::new();
    if self.start.is_some() {
      clauses.push("date(received_date) >= date(:start)".into());
    }
    if self.end.is_some() {
      clauses.push("date(received_date) <= date(:end)".into());
    }
    if self.payer.is_some() {
      clauses.push("(payer LIKE :payer OR donor LIKE :payer)".into());
    }
    if self.category.is_some() {
      clauses.push("(category = :category OR category_name = :category)".into());
    }
    if self.person_id.is_some() {
      clauses.push("(person_id = :personId)".into());
    }
    if self.member_id.is_some() {
      clauses.push("(member_id = :memberId OR mp_id = :memberId)".into());
    }
    if self.min_amount.is_some() {
      clauses.push(format!("{AMOUNT} >= :minAmount"));
    }
    if self.max_amount.is_some() {
      clauses.push(format!("{AMOUNT} <= :maxAmount"));
    }

    let where_sql = if clauses.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", clauses.join(" AND "))
    };

    format!(
      "SELECT register_entry_id, person_id, member_id, mp_id, member_name, \
       constituency, category, category_name, subcategory, payer, donor, \
       source, amount, value, received_value, donation_value, received_date, \
       date_received, entry_date, date, registered_date, date_registered, \
       parsed_date, purpose, description, details, link, source_url, \
       register_url FROM {INTERESTS_TABLE} {where_sql} ORDER BY \
       date(received_date) DESC NULLS LAST, date_registered DESC NULLS LAST \
       LIMIT :limit OFFSET :offset"
    )
  }

  /// Named parameters for [`InterestQuery::to_sql`], only for present values.
  pub fn bind_params(&self) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    let mut push = |name: &'static str, v: Option<String>| {
      if let Some(v) = v {
        params.push((name, v));
      }
    };
    push("start", self.start.clone());
    push("end", self.end.clone());
    push("payer", self.payer.as_ref().map(|p| format!("%{p}%")));
    push("category", self.category.clone());
    push("minAmount", self.min_amount.map(|n| n.to_string()));
    push("maxAmount", self.max_amount.map(|n| n.to_string()));
    push("personId", self.person_id.clone());
    push("memberId", self.member_id.clone());
    push("limit", Some(self.limit.to_string()));
    push("offset", Some(self.offset.to_string()));
    params
  }

  /// In-memory equivalent of the SQL filters, for sources that cannot be
  /// queried server-side.
  pub fn matches(&self, e: &InterestEntry) -> bool {
    if let Some(p) = &self.payer
      && !e.payer.to_lowercase().contains(&p.to_lowercase())
    {
      return false;
    }
    if let Some(c) = &self.category
      && e.category.as_deref() != Some(c.as_str())
      && e.subcategory.as_deref() != Some(c.as_str())
    {
      return false;
    }
    if let Some(id) = &self.person_id
      && e.person_id.as_deref() != Some(id.as_str())
    {
      return false;
    }
    if self.min_amount.is_some_and(|min| e.amount.is_none_or(|a| a < min)) {
      return false;
    }
    if self.max_amount.is_some_and(|max| e.amount.is_none_or(|a| a > max)) {
      return false;
    }
    if self.start.is_some() || self.end.is_some() {
      let Some(received) = e
        .received_date
        .as_deref()
        .and_then(parse_timestamp)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
      else {
        return false;
      };
      if self.start.as_deref().is_some_and(|s| received.as_str() < s) {
        return false;
      }
      if self.end.as_deref().is_some_and(|end| received.as_str() > end) {
        return false;
      }
    }
    true
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn params(pairs: &[(&str, &str)]) -> InterestParams {
    let map: serde_json::Map<String, serde_json::Value> = pairs
      .iter()
      .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
      .collect();
    serde_json::from_value(serde_json::Value::Object(map)).unwrap()
  }

  #[test]
  fn defaults_and_cap() {
    let q = InterestQuery::try_from(InterestParams::default()).unwrap();
    assert_eq!((q.limit, q.offset), (DEFAULT_LIMIT, 0));

    let q = InterestQuery::try_from(params(&[("limit", "9999")])).unwrap();
    assert_eq!(q.limit, MAX_LIMIT);

    let q = InterestQuery::try_from(params(&[("limit", "-3"), ("offset", "abc")]))
      .unwrap();
    assert_eq!((q.limit, q.offset), (DEFAULT_LIMIT, 0));
  }

  #[test]
  fn legacy_aliases_are_accepted() {
    let q = InterestQuery::try_from(params(&[
      ("Take", "25"),
      ("Skip", "50"),
      ("PersonId", "11575"),
      ("mpId", "5091"),
    ]))
    .unwrap();
    assert_eq!(q.limit, 25);
    assert_eq!(q.offset, 50);
    assert_eq!(q.person_id.as_deref(), Some("11575"));
    assert_eq!(q.member_id.as_deref(), Some("5091"));
  }

  #[test]
  fn unknown_params_are_ignored() {
    let q = InterestQuery::try_from(params(&[("colour", "blue")])).unwrap();
    assert_eq!(q, InterestQuery::default());
  }

  #[test]
  fn invalid_numbers_and_dates_are_rejected() {
    assert!(matches!(
      InterestQuery::try_from(params(&[("minAmount", "lots")])),
      Err(Error::InvalidNumber { name: "minAmount", .. })
    ));
    assert!(matches!(
      InterestQuery::try_from(params(&[("start", "July")])),
      Err(Error::InvalidDate { name: "start", .. })
    ));
  }

  #[test]
  fn sql_only_carries_present_filters() {
    let q = InterestQuery::try_from(params(&[("payer", "GB News"), ("limit", "10")]))
      .unwrap();
    let sql = q.to_sql();
    assert!(sql.contains("FROM register_interests WHERE (payer LIKE :payer"));
    assert!(!sql.contains(":start"));
    assert!(!sql.contains(":minAmount"));
    assert!(sql.contains("LIMIT :limit OFFSET :offset"));

    let bound = q.bind_params();
    assert_eq!(bound, vec![
      ("payer", "%GB News%".to_string()),
      ("limit", "10".to_string()),
      ("offset", "0".to_string()),
    ]);
  }

  #[test]
  fn no_filters_means_no_where_clause() {
    let sql = InterestQuery::default().to_sql();
    assert!(!sql.contains("WHERE"));
  }

  #[test]
  fn in_memory_matching() {
    let q = InterestQuery {
      payer: Some("gb news".into()),
      start: Some("2024-01-01".into()),
      min_amount: Some(100.0),
      ..InterestQuery::default()
    };
    let entry = InterestEntry {
      id:              "1".into(),
      person_id:       None,
      name:            None,
      constituency:    None,
      category:        None,
      subcategory:     None,
      payer:           "GB News Limited".into(),
      amount:          Some(500.0),
      amount_label:    None,
      received_date:   Some("2024-06-02T00:00:00Z".into()),
      registered_date: None,
      purpose:         None,
      link:            None,
      natural_id:      true,
    };
    assert!(q.matches(&entry));

    let old = InterestEntry { received_date: Some("2023-12-31".into()), ..entry.clone() };
    assert!(!q.matches(&old));

    let small = InterestEntry { amount: Some(50.0), ..entry };
    assert!(!q.matches(&small));
  }

  #[test]
  fn category_matches_name_or_subcategory() {
    let entry = InterestEntry {
      id:              "1".into(),
      person_id:       None,
      name:            None,
      constituency:    None,
      category:        Some("Gifts, benefits and hospitality from UK sources".into()),
      subcategory:     Some("3".into()),
      payer:           "Acme Ltd".into(),
      amount:          None,
      amount_label:    None,
      received_date:   None,
      registered_date: None,
      purpose:         None,
      link:            None,
      natural_id:      true,
    };
    let by = |category: &str| InterestQuery {
      category: Some(category.into()),
      ..InterestQuery::default()
    };
    assert!(by("Gifts, benefits and hospitality from UK sources").matches(&entry));
    assert!(by("3").matches(&entry));
    assert!(!by("4").matches(&entry));
    assert!(!by("Visits outside the UK").matches(&entry));

    let uncategorised = InterestEntry { category: None, subcategory: None, ..entry };
    assert!(!by("3").matches(&uncategorised));
  }
}
