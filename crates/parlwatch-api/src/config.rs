//! Runtime configuration, deserialised from `config.toml` and `PARLWATCH_*`
//! environment variables by the server binary.

use std::time::Duration;

use serde::Deserialize;

fn default_host() -> String {
  "127.0.0.1".to_string()
}
fn default_port() -> u16 {
  3000
}
fn default_datasette_db() -> String {
  "parlparse".to_string()
}
fn default_parliament_base_url() -> Option<String> {
  Some(parlwatch_upstream::parliament::DEFAULT_BASE_URL.to_string())
}
fn default_parliament_categories() -> Vec<u32> {
  (1..=10).collect()
}
fn default_votes_base_url() -> Option<String> {
  Some(parlwatch_upstream::votes::DEFAULT_BASE_URL.to_string())
}
fn default_twfy_base_url() -> String {
  parlwatch_upstream::twfy::DEFAULT_BASE_URL.to_string()
}
fn default_request_timeout_secs() -> u64 {
  10
}
fn default_cache_ttl_secs() -> u32 {
  60
}
fn default_stale_while_revalidate_secs() -> u32 {
  300
}
fn default_twfy_cache_ttl_secs() -> u32 {
  300
}
fn default_snippet_len() -> usize {
  500
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                        String,
  #[serde(default = "default_port")]
  pub port:                        u16,

  /// Datasette instance, e.g. `https://parlparse.example.org`. Required by
  /// `/api/interests`.
  #[serde(default)]
  pub datasette_base_url:          Option<String>,
  #[serde(default = "default_datasette_db")]
  pub datasette_db:                String,
  #[serde(default)]
  pub datasette_token:             Option<String>,

  #[serde(default = "default_parliament_base_url")]
  pub parliament_base_url:         Option<String>,
  /// Category partitions queried concurrently by `/api/register`.
  #[serde(default = "default_parliament_categories")]
  pub parliament_categories:       Vec<u32>,

  #[serde(default = "default_votes_base_url")]
  pub votes_base_url:              Option<String>,

  #[serde(default = "default_twfy_base_url")]
  pub twfy_base_url:               String,
  #[serde(default)]
  pub twfy_api_key:                Option<String>,

  /// Member used when a request names none.
  #[serde(default)]
  pub default_member_id:           Option<u32>,

  #[serde(default = "default_request_timeout_secs")]
  pub request_timeout_secs:        u64,
  #[serde(default = "default_cache_ttl_secs")]
  pub cache_ttl_secs:              u32,
  #[serde(default = "default_stale_while_revalidate_secs")]
  pub stale_while_revalidate_secs: u32,
  #[serde(default = "default_twfy_cache_ttl_secs")]
  pub twfy_cache_ttl_secs:         u32,
  /// Upper bound on the upstream error body echoed to callers.
  #[serde(default = "default_snippet_len")]
  pub snippet_len:                 usize,
  /// Lets `?diag=1` add upstream URLs and internals to responses.
  /// Never enable on a public deployment.
  #[serde(default)]
  pub allow_diagnostics:           bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                        default_host(),
      port:                        default_port(),
      datasette_base_url:          None,
      datasette_db:                default_datasette_db(),
      datasette_token:             None,
      parliament_base_url:         default_parliament_base_url(),
      parliament_categories:       default_parliament_categories(),
      votes_base_url:              default_votes_base_url(),
      twfy_base_url:               default_twfy_base_url(),
      twfy_api_key:                None,
      default_member_id:           None,
      request_timeout_secs:        default_request_timeout_secs(),
      cache_ttl_secs:              default_cache_ttl_secs(),
      stale_while_revalidate_secs: default_stale_while_revalidate_secs(),
      twfy_cache_ttl_secs:         default_twfy_cache_ttl_secs(),
      snippet_len:                 default_snippet_len(),
      allow_diagnostics:           false,
    }
  }
}

impl ServerConfig {
  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs)
  }
}
