//! Key-injecting proxy client for the TheyWorkForYou API.
//!
//! Only the read endpoints in [`ALLOWED_ENDPOINTS`] may be called. The API key
//! is appended server-side and redacted from anything that is logged or
//! returned to callers.

use reqwest::{Client, Url};
use serde_json::Value;

use crate::{
  error::{Result, UpstreamError},
  get_json,
};

pub const DEFAULT_BASE_URL: &str = "https://www.theyworkforyou.com/api";

pub const ALLOWED_ENDPOINTS: &[&str] = &[
  "getMP",
  "getMPs",
  "getDebates",
  "getWrans",
  "getWMS",
  "getCommittees",
];

const REDACTED: &str = "HIDDEN";

pub fn is_allowed(endpoint: &str) -> bool {
  ALLOWED_ENDPOINTS.contains(&endpoint)
}

#[derive(Clone)]
pub struct TwfyClient {
  client:   Client,
  base_url: String,
  api_key:  String,
}

impl TwfyClient {
  pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
    Self {
      client,
      base_url: base_url.into().trim_end_matches('/').to_string(),
      api_key: api_key.into(),
    }
  }

  /// `{base}/{endpoint}?key=..&output=json&<params>`; empty params are dropped
  /// and callers cannot override `key` or `output`.
  pub fn endpoint_url(&self, endpoint: &str, params: &[(String, String)]) -> Result<Url> {
    let mut url = Url::parse(&format!("{}/{endpoint}", self.base_url))
      .map_err(|e| UpstreamError::Url(e.to_string()))?;
    {
      let mut pairs = url.query_pairs_mut();
      pairs.append_pair("key", &self.api_key);
      pairs.append_pair("output", "json");
      for (k, v) in params {
        if v.is_empty() || k == "key" || k == "output" {
          continue;
        }
        pairs.append_pair(k, v);
      }
    }
    Ok(url)
  }

  /// `url` with the API key replaced, safe to log or echo.
  pub fn redact(&self, url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs.iter().map(|(k, v)| {
      if k == "key" { (k.as_str(), REDACTED) } else { (k.as_str(), v.as_str()) }
    }));
    redacted.into()
  }

  pub async fn call(&self, endpoint: &str, params: &[(String, String)]) -> Result<Value> {
    let url = self.endpoint_url(endpoint, params)?;
    tracing::debug!(url = %self.redact(&url), "calling theyworkforyou");
    get_json(self.client.get(url)).await
  }
}
