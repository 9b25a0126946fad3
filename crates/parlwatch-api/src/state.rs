//! Shared handler state, built once from [`ServerConfig`].

use std::sync::Arc;

use parlwatch_upstream::{
  DatasetteClient, ParliamentClient, TwfyClient, UpstreamError, VotesClient,
  http_client,
};

use crate::{config::ServerConfig, error::ApiError};

/// Shared state threaded through all axum handlers.
///
/// An upstream whose base URL (or key) is not configured has no client; its
/// endpoints answer with a configuration error instead of calling out.
#[derive(Clone)]
pub struct AppState {
  pub config:     Arc<ServerConfig>,
  pub datasette:  Option<DatasetteClient>,
  pub parliament: Option<ParliamentClient>,
  pub votes:      Option<VotesClient>,
  pub twfy:       Option<TwfyClient>,
}

fn configured(v: &Option<String>) -> Option<&str> {
  v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl AppState {
  pub fn new(config: ServerConfig) -> Result<Self, UpstreamError> {
    let http = http_client(config.request_timeout())?;

    let datasette = configured(&config.datasette_base_url).map(|base| {
      DatasetteClient::new(
        http.clone(),
        base,
        config.datasette_db.clone(),
        configured(&config.datasette_token).map(str::to_string),
      )
    });
    let parliament = configured(&config.parliament_base_url)
      .map(|base| ParliamentClient::new(http.clone(), base));
    let votes = configured(&config.votes_base_url)
      .map(|base| VotesClient::new(http.clone(), base));
    let twfy = configured(&config.twfy_api_key)
      .map(|key| TwfyClient::new(http.clone(), config.twfy_base_url.clone(), key));

    Ok(Self {
      config: Arc::new(config),
      datasette,
      parliament,
      votes,
      twfy,
    })
  }

  /// Whether this request may see diagnostic detail.
  pub fn diagnostics(&self, requested: bool) -> bool {
    requested && self.config.allow_diagnostics
  }

  pub fn datasette(&self) -> Result<&DatasetteClient, ApiError> {
    self.datasette.as_ref().ok_or(ApiError::MissingConfig {
      setting: "datasette_base_url",
      hint:    "set PARLWATCH_DATASETTE_BASE_URL or datasette_base_url in config.toml",
    })
  }

  pub fn parliament(&self) -> Result<&ParliamentClient, ApiError> {
    self.parliament.as_ref().ok_or(ApiError::MissingConfig {
      setting: "parliament_base_url",
      hint:    "set PARLWATCH_PARLIAMENT_BASE_URL or parliament_base_url in config.toml",
    })
  }

  pub fn votes(&self) -> Result<&VotesClient, ApiError> {
    self.votes.as_ref().ok_or(ApiError::MissingConfig {
      setting: "votes_base_url",
      hint:    "set PARLWATCH_VOTES_BASE_URL or votes_base_url in config.toml",
    })
  }

  pub fn twfy(&self) -> Result<&TwfyClient, ApiError> {
    self.twfy.as_ref().ok_or(ApiError::MissingConfig {
      setting: "twfy_api_key",
      hint:    "set PARLWATCH_TWFY_API_KEY or twfy_api_key in config.toml",
    })
  }

  /// Wrap an upstream failure with the configured snippet length.
  pub fn upstream_error(&self, error: UpstreamError) -> ApiError {
    ApiError::upstream(error, self.config.snippet_len)
  }
}
