//! Declarative mapping from upstream rows to [`InterestEntry`].
//!
//! Every upstream names the same facts differently. Instead of chains of
//! fallbacks, each source has an ordered table of [`FieldRule`]s; for a given
//! canonical field the first candidate that holds a usable scalar wins.
//!
//! | Source | Rule table | Lookup |
//! |--------|------------|--------|
//! | Datasette `register_interests` | [`DATASETTE_RULES`] | row columns |
//! | Parliament interests API | [`PARLIAMENT_FIELD_RULES`] | `fields[].name` |

use serde_json::{Map, Value};

use crate::{
  date::to_canonical_date,
  entry::{DEFAULT_PAYER, InterestEntry, PARENT_PAYER, synthesize_id},
  extract::{
    extract_payer, parse_money, representative_amount, summary_amount,
    summary_payer,
  },
};

// ─── Rules ────────────────────────────────────────────────────────────────────

/// Canonical [`InterestEntry`] fields a rule can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
  Id,
  PersonId,
  Name,
  Constituency,
  Category,
  Subcategory,
  Payer,
  Amount,
  ReceivedDate,
  RegisteredDate,
  Purpose,
  Link,
}

/// Candidate source names for one canonical field, highest priority first.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
  pub field:      Field,
  pub candidates: &'static [&'static str],
}

const fn rule(field: Field, candidates: &'static [&'static str]) -> FieldRule {
  FieldRule { field, candidates }
}

/// Column priorities for rows of the Datasette `register_interests` table.
pub const DATASETTE_RULES: &[FieldRule] = &[
  rule(Field::Id, &["register_entry_id"]),
  rule(Field::PersonId, &["person_id", "member_id", "mp_id"]),
  rule(Field::Name, &["member_name", "name"]),
  rule(Field::Constituency, &["constituency"]),
  rule(Field::Category, &["category", "category_name"]),
  rule(Field::Subcategory, &["subcategory"]),
  rule(Field::Payer, &[
    "payer",
    "donor",
    "source",
    "payer_name",
    "organisation",
    "organization",
    "company",
    "employer",
    "value_from",
    "from",
    "provider",
    "sponsor",
  ]),
  rule(Field::Amount, &[
    "amount",
    "value",
    "received_value",
    "donation_value",
    "payment_value",
    "gross_value",
    "net_value",
  ]),
  rule(Field::ReceivedDate, &[
    "received_date",
    "date_received",
    "date_of_payment",
    "payment_date",
    "entry_date",
    "date",
  ]),
  rule(Field::RegisteredDate, &[
    "registered_date",
    "date_registered",
    "parsed_date",
  ]),
  rule(Field::Purpose, &["purpose", "description", "details", "nature"]),
  rule(Field::Link, &["link", "source_url", "register_url", "url"]),
];

/// `fields[].name` priorities for Parliament interests API items.
///
/// Only the fields that live in the item's `fields` array are listed; member
/// and category metadata come from fixed paths on the item itself.
pub const PARLIAMENT_FIELD_RULES: &[FieldRule] = &[
  rule(Field::Payer, &["PayerName", "DonorName"]),
  rule(Field::Amount, &["Value"]),
  rule(Field::ReceivedDate, &["ReceivedDate", "AcceptedDate", "StartDate"]),
  rule(Field::Purpose, &["PaymentDescription", "Purpose"]),
];

/// Candidates for `field` in `rules`; empty when the table has no rule.
pub fn candidates(rules: &[FieldRule], field: Field) -> &'static [&'static str] {
  rules
    .iter()
    .find(|r| r.field == field)
    .map(|r| r.candidates)
    .unwrap_or(&[])
}

// ─── Lookup ───────────────────────────────────────────────────────────────────

/// Something rules can be evaluated against.
pub trait FieldSource {
  fn lookup(&self, name: &str) -> Option<&Value>;
}

impl FieldSource for Map<String, Value> {
  fn lookup(&self, name: &str) -> Option<&Value> {
    self.get(name)
  }
}

/// The `fields` array of a Parliament interests item.
pub struct NamedFields<'a>(pub &'a [Value]);

impl FieldSource for NamedFields<'_> {
  fn lookup(&self, name: &str) -> Option<&Value> {
    self
      .0
      .iter()
      .find(|f| f.get("name").and_then(Value::as_str) == Some(name))
      .and_then(|f| f.get("value"))
  }
}

/// A JSON scalar as display text. Objects, arrays, booleans, nulls and blank
/// strings yield `None`, so nested payloads never leak into string fields.
pub fn scalar_str(v: &Value) -> Option<String> {
  match v {
    Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}

/// A JSON number or money-ish string as a non-negative finite amount.
pub fn money(v: &Value) -> Option<f64> {
  match v {
    Value::Number(n) => n.as_f64().filter(|x| x.is_finite() && *x >= 0.0),
    Value::String(s) => parse_money(s),
    _ => None,
  }
}

/// First candidate holding a usable scalar.
pub fn first_str<S: FieldSource + ?Sized>(
  src: &S,
  rules: &[FieldRule],
  field: Field,
) -> Option<String> {
  candidates(rules, field)
    .iter()
    .find_map(|name| src.lookup(name).and_then(scalar_str))
}

/// First candidate that parses as an amount.
pub fn first_money<S: FieldSource + ?Sized>(
  src: &S,
  rules: &[FieldRule],
  field: Field,
) -> Option<f64> {
  candidates(rules, field)
    .iter()
    .find_map(|name| src.lookup(name).and_then(money))
}

fn first_date<S: FieldSource + ?Sized>(
  src: &S,
  rules: &[FieldRule],
  field: Field,
) -> Option<String> {
  first_str(src, rules, field).and_then(|d| to_canonical_date(&d))
}

// ─── Datasette ────────────────────────────────────────────────────────────────

/// Map one `register_interests` row.
///
/// When no payer or amount column is usable, the narrative extractor runs over
/// the purpose text.
pub fn map_datasette_row(row: &Map<String, Value>) -> InterestEntry {
  let rules = DATASETTE_RULES;
  let purpose = first_str(row, rules, Field::Purpose);
  let narrative = purpose.as_deref().unwrap_or("");

  let payer = first_str(row, rules, Field::Payer).or_else(|| {
    Some(extract_payer(narrative)).filter(|p| !p.is_empty())
  });
  let amount = first_money(row, rules, Field::Amount)
    .or_else(|| representative_amount(narrative));

  let person_id = first_str(row, rules, Field::PersonId);
  let received_date = first_date(row, rules, Field::ReceivedDate);
  let registered_date = first_date(row, rules, Field::RegisteredDate);

  let natural = first_str(row, rules, Field::Id);
  let natural_id = natural.is_some();
  let id = natural.unwrap_or_else(|| {
    synthesize_id(
      person_id.as_deref(),
      received_date.as_deref().or(registered_date.as_deref()),
      payer.as_deref(),
    )
  });

  InterestEntry {
    id,
    person_id,
    name: first_str(row, rules, Field::Name),
    constituency: first_str(row, rules, Field::Constituency),
    category: first_str(row, rules, Field::Category),
    subcategory: first_str(row, rules, Field::Subcategory),
    payer: payer.unwrap_or_else(|| DEFAULT_PAYER.to_string()),
    amount,
    amount_label: first_str(row, rules, Field::Amount),
    received_date,
    registered_date,
    purpose,
    link: first_str(row, rules, Field::Link),
    natural_id,
  }
}

// ─── Parliament interests API ─────────────────────────────────────────────────

/// Name of the first donor in a visit's nested `Donors[].values[][]` list.
fn first_donor_name(fields: &[Value]) -> Option<String> {
  fields
    .iter()
    .find(|f| f.get("name").and_then(Value::as_str) == Some("Donors"))
    .and_then(|f| f.get("values"))
    .and_then(Value::as_array)?
    .iter()
    .find_map(Value::as_array)?
    .iter()
    .find(|v| v.get("name").and_then(Value::as_str) == Some("Name"))
    .and_then(|v| v.get("value"))
    .and_then(scalar_str)
}

fn path_str(item: &Value, path: &[&str]) -> Option<String> {
  path
    .iter()
    .try_fold(item, |v, key| v.get(key))
    .and_then(scalar_str)
}

/// Map one item from the Parliament interests API.
pub fn map_parliament_item(item: &Value) -> InterestEntry {
  let rules = PARLIAMENT_FIELD_RULES;
  let fields = item
    .get("fields")
    .and_then(Value::as_array)
    .map(Vec::as_slice)
    .unwrap_or(&[]);
  let named = NamedFields(fields);
  let summary = path_str(item, &["summary"]).unwrap_or_default();
  let has_parent = item
    .get("parentInterestId")
    .is_some_and(|v| !v.is_null());

  let payer = first_str(&named, rules, Field::Payer)
    .or_else(|| first_donor_name(fields))
    .or_else(|| summary_payer(&summary))
    .unwrap_or_else(|| {
      let fallback = if has_parent { PARENT_PAYER } else { DEFAULT_PAYER };
      fallback.to_string()
    });

  let amount = first_money(&named, rules, Field::Amount)
    .or_else(|| summary_amount(&summary))
    .or_else(|| representative_amount(&summary));

  let person_id = path_str(item, &["member", "id"]);
  let received_date = first_date(&named, rules, Field::ReceivedDate);
  let registered_date = path_str(item, &["registrationDate"])
    .and_then(|d| to_canonical_date(&d));

  let natural = path_str(item, &["id"]);
  let natural_id = natural.is_some();
  let id = natural.unwrap_or_else(|| {
    synthesize_id(
      person_id.as_deref(),
      received_date.as_deref().or(registered_date.as_deref()),
      Some(payer.as_str()),
    )
  });

  let link = item
    .get("links")
    .and_then(Value::as_array)
    .and_then(|links| {
      links
        .iter()
        .find(|l| l.get("rel").and_then(Value::as_str) == Some("self"))
    })
    .and_then(|l| l.get("href"))
    .and_then(scalar_str);

  InterestEntry {
    id,
    person_id,
    name: path_str(item, &["member", "nameDisplayAs"]),
    constituency: path_str(item, &["member", "memberFrom"]),
    category: path_str(item, &["category", "name"]),
    subcategory: path_str(item, &["category", "number"]),
    payer,
    amount,
    amount_label: first_str(&named, rules, Field::Amount),
    received_date,
    registered_date,
    purpose: first_str(&named, rules, Field::Purpose)
      .or_else(|| Some(summary).filter(|s| !s.is_empty())),
    link,
    natural_id,
  }
}
