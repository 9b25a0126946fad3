//! Handler for `GET /twfy`, a key-injecting proxy to TheyWorkForYou.
//!
//! `endpoint` selects the TWFY method and must be on the allowlist; every
//! other non-empty parameter is forwarded unchanged.

use axum::{
  extract::{Query, State},
  response::Response,
};
use parlwatch_upstream::twfy::is_allowed;

use crate::{AppState, cached_json_for, error::ApiError};

/// `GET /twfy?endpoint=<getMP|getMPs|getDebates|...>[&<param>=<value>...]`
pub async fn proxy(
  State(state): State<AppState>,
  Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
  let endpoint = params
    .iter()
    .find(|(k, _)| k == "endpoint")
    .map(|(_, v)| v.as_str())
    .unwrap_or_default();
  if !is_allowed(endpoint) {
    return Err(ApiError::BadRequest(format!("invalid endpoint: {endpoint:?}")));
  }
  let client = state.twfy()?;
  let diagnostics = state.diagnostics(params.iter().any(|(k, v)| k == "diag" && v == "1"));

  let forwarded: Vec<(String, String)> = params
    .iter()
    .filter(|(k, _)| k != "endpoint" && k != "diag")
    .cloned()
    .collect();

  let data = client.call(endpoint, &forwarded).await.map_err(|e| {
    let url = client
      .endpoint_url(endpoint, &forwarded)
      .ok()
      .map(|u| client.redact(&u));
    state
      .upstream_error(e)
      .with_upstream_url(url.filter(|_| diagnostics))
  })?;

  Ok(cached_json_for(&data, state.config.twfy_cache_ttl_secs, None))
}
