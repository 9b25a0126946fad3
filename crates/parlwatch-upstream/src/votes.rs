//! Client for the Commons Votes API (`/data/divisions.json/membervoting`).

use parlwatch_core::{
  date::parse_timestamp,
  votes::{MemberVote, VoteRecord},
};
use reqwest::{Client, Url};
use serde_json::Value;

use crate::{
  error::{Result, UpstreamError},
  get_json,
  payload::extract_rows,
};

pub const DEFAULT_BASE_URL: &str = "https://commonsvotes-api.parliament.uk";

const HANSARD_SEARCH: &str = "https://hansard.parliament.uk/search";

#[derive(Clone)]
pub struct VotesClient {
  client:   Client,
  base_url: String,
}

impl VotesClient {
  pub fn new(client: Client, base_url: impl Into<String>) -> Self {
    Self {
      client,
      base_url: base_url.into().trim_end_matches('/').to_string(),
    }
  }

  pub fn member_votes_url(&self, member_id: u32, take: u32, skip: u32) -> Result<Url> {
    Url::parse_with_params(
      &format!("{}/data/divisions.json/membervoting", self.base_url),
      &[
        ("queryParameters.memberId", member_id.to_string()),
        ("queryParameters.take", take.to_string()),
        ("queryParameters.skip", skip.to_string()),
      ],
    )
    .map_err(|e| UpstreamError::Url(e.to_string()))
  }

  /// The member's most recent division votes, newest first as served.
  pub async fn member_votes(
    &self,
    member_id: u32,
    take: u32,
    skip: u32,
  ) -> Result<Vec<VoteRecord>> {
    let url = self.member_votes_url(member_id, take, skip)?;
    let rows = extract_rows(get_json(self.client.get(url)).await?);
    tracing::info!(member_id, count = rows.len(), "votes fetched");
    Ok(rows.iter().map(map_vote).collect())
  }
}

fn int(v: &Value, key: &str) -> Option<i64> {
  v.get(key).and_then(Value::as_i64)
}

fn text(v: &Value, key: &str) -> Option<String> {
  v.get(key)
    .and_then(Value::as_str)
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_string)
}

/// Hansard has no stable page per division; link a search on title and day.
fn hansard_link(title: &str, date: Option<&str>) -> Option<String> {
  let mut params = vec![("searchTerm", title.to_string())];
  if let Some(day) = date
    .and_then(parse_timestamp)
    .map(|dt| dt.format("%Y-%m-%d").to_string())
  {
    params.push(("startDate", day.clone()));
    params.push(("endDate", day));
  }
  Url::parse_with_params(HANSARD_SEARCH, &params)
    .ok()
    .map(String::from)
}

/// Map one `membervoting` record.
pub fn map_vote(rec: &Value) -> VoteRecord {
  let division = rec.get("PublishedDivision").unwrap_or(&Value::Null);
  let title = text(division, "FriendlyTitle")
    .or_else(|| text(division, "Title"))
    .unwrap_or_else(|| "Untitled division".to_string());
  let date = text(division, "Date");
  let vote = MemberVote::from_flags(
    rec.get("MemberVotedAye").and_then(Value::as_bool),
    rec
      .get("MemberWasTeller")
      .and_then(Value::as_bool)
      .unwrap_or(false),
  );

  VoteRecord {
    division_id: int(division, "DivisionId"),
    number: int(division, "Number"),
    link: hansard_link(&title, date.as_deref()),
    title,
    date,
    aye_count: int(division, "AyeCount"),
    no_count: int(division, "NoCount"),
    vote,
  }
}
