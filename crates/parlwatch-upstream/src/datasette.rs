//! Client for a Datasette instance serving the `register_interests` table.
//!
//! Queries are sent as a SQL template with named bind parameters:
//! `GET {base}/{db}.json?sql=...&_params.<name>=<value>&_shape=objects`.

use parlwatch_core::query::InterestQuery;
use reqwest::{Client, Url};
use serde_json::{Map, Value};

use crate::{
  error::{Result, UpstreamError},
  get_json,
  payload::{extract_rows, object_rows},
};

#[derive(Clone)]
pub struct DatasetteClient {
  client:   Client,
  base_url: String,
  db:       String,
  token:    Option<String>,
}

impl DatasetteClient {
  pub fn new(
    client: Client,
    base_url: impl Into<String>,
    db: impl Into<String>,
    token: Option<String>,
  ) -> Self {
    Self {
      client,
      base_url: base_url.into().trim_end_matches('/').to_string(),
      db: db.into(),
      token,
    }
  }

  pub fn db(&self) -> &str {
    &self.db
  }

  /// The full request URL for `query`. Carries no secrets; the token travels
  /// in the `Authorization` header.
  pub fn query_url(&self, query: &InterestQuery) -> Result<Url> {
    let mut url = Url::parse(&format!("{}/{}.json", self.base_url, self.db))
      .map_err(|e| UpstreamError::Url(e.to_string()))?;
    {
      let mut pairs = url.query_pairs_mut();
      pairs.append_pair("sql", &query.to_sql());
      for (name, value) in query.bind_params() {
        pairs.append_pair(&format!("_params.{name}"), &value);
      }
      pairs.append_pair("_shape", "objects");
    }
    Ok(url)
  }

  /// Run `query` and return the raw row objects, in upstream order.
  pub async fn fetch(&self, query: &InterestQuery) -> Result<Vec<Map<String, Value>>> {
    let url = self.query_url(query)?;
    tracing::debug!(%url, "querying datasette");

    let mut req = self.client.get(url);
    if let Some(token) = &self.token {
      req = req.bearer_auth(token);
    }
    let rows = object_rows(extract_rows(get_json(req).await?));
    tracing::info!(count = rows.len(), "datasette rows received");
    Ok(rows)
  }
}

#[cfg(test)]
mod tests {
  use std::{collections::HashMap, time::Duration};

  use axum::{
    Json, Router,
    extract::Query,
    http::{HeaderMap, StatusCode},
    routing::get,
  };
  use parlwatch_core::query::InterestParams;
  use serde_json::json;

  use super::*;
  use crate::{http_client, stub};

  fn query(pairs: &[(&str, &str)]) -> InterestQuery {
    let params = InterestParams {
      payer: pairs.iter().find(|(k, _)| *k == "payer").map(|(_, v)| v.to_string()),
      limit: pairs.iter().find(|(k, _)| *k == "limit").map(|(_, v)| v.to_string()),
      ..InterestParams::default()
    };
    InterestQuery::try_from(params).unwrap()
  }

  #[test]
  fn url_carries_sql_params_and_shape() {
    let client = DatasetteClient::new(
      http_client(Duration::from_secs(1)).unwrap(),
      "https://data.example.org/",
      "parlparse",
      None,
    );
    let url = client.query_url(&query(&[("payer", "GB News")])).unwrap();
    assert_eq!(url.path(), "/parlparse.json");
    let pairs: HashMap<String, String> = url.query_pairs().into_owned().collect();
    assert!(pairs["sql"].contains("FROM register_interests"));
    assert_eq!(pairs["_params.payer"], "%GB News%");
    assert_eq!(pairs["_params.limit"], "100");
    assert_eq!(pairs["_shape"], "objects");
    assert!(!pairs.contains_key("_params.start"));
  }

  #[tokio::test]
  async fn fetch_sends_token_and_reads_rows() {
    let app = Router::new().route(
      "/parlparse.json",
      get(|headers: HeaderMap, Query(q): Query<HashMap<String, String>>| async move {
        let authorised = headers
          .get("authorization")
          .and_then(|v| v.to_str().ok())
          == Some("Bearer s3cret");
        if !authorised || q.get("_shape").map(String::as_str) != Some("objects") {
          return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "no" })));
        }
        (StatusCode::OK, Json(json!({ "rows": [{ "payer": "Acme Ltd" }, { "payer": "Beta LLP" }] })))
      }),
    );
    let base = stub::serve(app).await;
    let client = DatasetteClient::new(
      http_client(Duration::from_secs(5)).unwrap(),
      base,
      "parlparse",
      Some("s3cret".into()),
    );
    let rows = client.fetch(&query(&[])).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["payer"], "Beta LLP");
  }

  #[tokio::test]
  async fn error_status_keeps_body() {
    let app = Router::new().route(
      "/parlparse.json",
      get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance window") }),
    );
    let base = stub::serve(app).await;
    let client = DatasetteClient::new(
      http_client(Duration::from_secs(5)).unwrap(),
      base,
      "parlparse",
      None,
    );
    match client.fetch(&query(&[])).await {
      Err(UpstreamError::Status { status, body }) => {
        assert_eq!(status, 503);
        assert_eq!(body, "maintenance window");
      }
      other => panic!("expected status error, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn slow_upstream_times_out() {
    let app = Router::new().route(
      "/parlparse.json",
      get(|| async {
        tokio::time::sleep(Duration::from_secs(2)).await;
        Json(json!([]))
      }),
    );
    let base = stub::serve(app).await;
    let client = DatasetteClient::new(
      http_client(Duration::from_millis(100)).unwrap(),
      base,
      "parlparse",
      None,
    );
    assert!(matches!(
      client.fetch(&query(&[])).await,
      Err(UpstreamError::Timeout)
    ));
  }
}
