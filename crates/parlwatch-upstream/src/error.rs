//! Upstream failure kinds.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
  /// The upstream answered with a non-success status.
  #[error("upstream returned {status}")]
  Status { status: u16, body: String },

  /// No answer within the configured request timeout.
  #[error("upstream timed out")]
  Timeout,

  #[error("upstream request failed: {0}")]
  Transport(#[source] reqwest::Error),

  #[error("upstream sent an unreadable body: {0}")]
  Decode(String),

  #[error("invalid upstream url: {0}")]
  Url(String),
}

impl From<reqwest::Error> for UpstreamError {
  fn from(e: reqwest::Error) -> Self {
    if e.is_timeout() {
      UpstreamError::Timeout
    } else {
      UpstreamError::Transport(e)
    }
  }
}

impl UpstreamError {
  /// First `max` characters of the upstream error body, for [`Self::Status`].
  pub fn detail_snippet(&self, max: usize) -> Option<String> {
    match self {
      UpstreamError::Status { body, .. } => Some(truncate_chars(body, max)),
      _ => None,
    }
  }
}

/// Truncate on a character boundary.
pub fn truncate_chars(s: &str, max: usize) -> String {
  s.chars().take(max).collect()
}

pub type Result<T, E = UpstreamError> = std::result::Result<T, E>;
