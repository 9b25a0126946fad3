//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! | Kind | Status | Body |
//! |------|--------|------|
//! | missing configuration | 500 | `{ error, hint }` |
//! | bad caller input | 400 | `{ error }` |
//! | upstream error status | 502 | `{ error, status, detailSnippet }` |
//! | upstream timeout | 504 | `{ error }` |
//! | other upstream failure | 502 | `{ error }` |
//! | anything else | 500 | `{ error }` |
//!
//! In diagnostic mode the body also carries `constructedUrl`.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use parlwatch_upstream::UpstreamError;
use serde_json::{Map, Value, json};
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("missing configuration: {setting}")]
  MissingConfig {
    setting: &'static str,
    hint:    &'static str,
  },

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("{error}")]
  Upstream {
    #[source]
    error:       UpstreamError,
    snippet_len: usize,
    /// Set only in diagnostic mode.
    upstream_url: Option<String>,
  },

  #[error("internal error: {0}")]
  Internal(String),
}

impl ApiError {
  pub fn upstream(error: UpstreamError, snippet_len: usize) -> Self {
    ApiError::Upstream { error, snippet_len, upstream_url: None }
  }

  /// Attach the upstream URL; callers only do so in diagnostic mode.
  pub fn with_upstream_url(self, url: Option<String>) -> Self {
    match self {
      ApiError::Upstream { error, snippet_len, .. } => {
        ApiError::Upstream { error, snippet_len, upstream_url: url }
      }
      other => other,
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::MissingConfig { .. } | ApiError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Upstream { error: UpstreamError::Timeout, .. } => {
        StatusCode::GATEWAY_TIMEOUT
      }
      ApiError::Upstream { error: UpstreamError::Url(_), .. } => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
      ApiError::Upstream { .. } => StatusCode::BAD_GATEWAY,
    }
  }
}

impl From<parlwatch_core::Error> for ApiError {
  fn from(e: parlwatch_core::Error) -> Self {
    ApiError::BadRequest(e.to_string())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let mut body = Map::new();
    match &self {
      ApiError::MissingConfig { setting, hint } => {
        body.insert("error".into(), json!(format!("Missing {setting}")));
        body.insert("hint".into(), json!(hint));
      }
      ApiError::Upstream { error, snippet_len, upstream_url } => {
        tracing::warn!(%error, "upstream failure");
        body.insert("error".into(), json!(error.to_string()));
        if let UpstreamError::Status { status, .. } = error {
          body.insert("status".into(), json!(status));
        }
        if let Some(snippet) = error.detail_snippet(*snippet_len) {
          body.insert("detailSnippet".into(), json!(snippet));
        }
        if let Some(url) = upstream_url {
          body.insert("constructedUrl".into(), json!(url));
        }
      }
      ApiError::BadRequest(_) | ApiError::Internal(_) => {
        body.insert("error".into(), json!(self.to_string()));
      }
    }
    (status, Json(Value::Object(body))).into_response()
  }
}
