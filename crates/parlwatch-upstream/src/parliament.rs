//! Client for the Parliament Register of Interests REST API.
//!
//! The API partitions interests by category, so a member's full register is
//! assembled by querying each configured category concurrently and joining
//! the results. Any failed category fails the whole fetch.

use futures::future::try_join_all;
use parlwatch_core::{InterestEntry, mapping::map_parliament_item};
use reqwest::{Client, Url};

use crate::{
  error::{Result, UpstreamError},
  get_json,
  payload::extract_rows,
};

pub const DEFAULT_BASE_URL: &str = "https://interests-api.parliament.uk/api/v1";

#[derive(Clone)]
pub struct ParliamentClient {
  client:   Client,
  base_url: String,
}

impl ParliamentClient {
  pub fn new(client: Client, base_url: impl Into<String>) -> Self {
    Self {
      client,
      base_url: base_url.into().trim_end_matches('/').to_string(),
    }
  }

  /// `GET {base}/Interests?MemberId=..&CategoryId=..&Take=..&SortOrder=..`
  pub fn category_url(&self, member_id: &str, category_id: u32, take: u32) -> Result<Url> {
    Url::parse_with_params(&format!("{}/Interests", self.base_url), &[
      ("MemberId", member_id.to_string()),
      ("CategoryId", category_id.to_string()),
      ("Take", take.to_string()),
      ("SortOrder", "PublishingDateDescending".to_string()),
    ])
    .map_err(|e| UpstreamError::Url(e.to_string()))
  }

  /// Entries of one category, mapped into the unified shape.
  pub async fn fetch_category(
    &self,
    member_id: &str,
    category_id: u32,
    take: u32,
  ) -> Result<Vec<InterestEntry>> {
    let url = self.category_url(member_id, category_id, take)?;
    let payload = get_json(self.client.get(url)).await?;
    let entries: Vec<InterestEntry> =
      extract_rows(payload).iter().map(map_parliament_item).collect();
    tracing::debug!(category_id, count = entries.len(), "category fetched");
    Ok(entries)
  }

  /// Entries across all `categories`, fetched in parallel. Order of the
  /// joined list is unspecified; callers sort afterwards.
  pub async fn fetch_member(
    &self,
    member_id: &str,
    categories: &[u32],
    take: u32,
  ) -> Result<Vec<InterestEntry>> {
    let per_category = try_join_all(
      categories
        .iter()
        .map(|c| self.fetch_category(member_id, *c, take)),
    )
    .await?;
    let entries: Vec<InterestEntry> = per_category.into_iter().flatten().collect();
    tracing::info!(member_id, count = entries.len(), "register fetched");
    Ok(entries)
  }
}

#[cfg(test)]
mod tests {
  use std::{collections::HashMap, time::Duration};

  use axum::{Json, Router, extract::Query, http::StatusCode, routing::get};
  use serde_json::json;

  use super::*;
  use crate::{http_client, stub};

  async fn category(Query(q): Query<HashMap<String, String>>) -> (StatusCode, Json<serde_json::Value>) {
    let cat: u32 = q["CategoryId"].parse().unwrap();
    if cat == 99 {
      return (StatusCode::BAD_GATEWAY, Json(json!({ "error": "boom" })));
    }
    (StatusCode::OK, Json(json!({
      "totalResults": 1,
      "items": [{
        "id": cat * 100,
        "category": { "name": format!("Category {cat}"), "number": cat.to_string() },
        "member": { "id": q["MemberId"].parse::<u32>().unwrap() },
        "fields": [
          { "name": "PayerName", "value": format!("Payer {cat} Ltd") },
          { "name": "Value", "value": 10 * cat }
        ]
      }]
    })))
  }

  #[tokio::test]
  async fn fans_out_across_categories() {
    let base = stub::serve(Router::new().route("/Interests", get(category))).await;
    let client = ParliamentClient::new(http_client(Duration::from_secs(5)).unwrap(), base);

    let mut entries = client.fetch_member("5091", &[1, 2, 3], 20).await.unwrap();
    entries.sort_by(|a, b| a.id.cmp(&b.id));
    let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["100", "200", "300"]);
    assert_eq!(entries[1].payer, "Payer 2 Ltd");
    assert_eq!(entries[2].amount, Some(30.0));
    assert_eq!(entries[0].person_id.as_deref(), Some("5091"));
  }

  #[tokio::test]
  async fn one_failed_category_fails_the_fetch() {
    let base = stub::serve(Router::new().route("/Interests", get(category))).await;
    let client = ParliamentClient::new(http_client(Duration::from_secs(5)).unwrap(), base);

    let err = client.fetch_member("5091", &[1, 99], 20).await.unwrap_err();
    assert!(matches!(err, UpstreamError::Status { status: 502, .. }));
  }
}
