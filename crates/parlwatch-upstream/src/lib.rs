//! HTTP clients for the upstream parliamentary data services.
//!
//! | Client | Service | Payload |
//! |--------|---------|---------|
//! | [`DatasetteClient`] | Datasette SQL API over `register_interests` | array or `rows` |
//! | [`ParliamentClient`] | Parliament Register of Interests REST API | `items` |
//! | [`VotesClient`] | Commons Votes API | array |
//! | [`TwfyClient`] | TheyWorkForYou legacy API | passed through |
//!
//! Every client shares one [`reqwest::Client`] built by [`http_client`], so
//! the request timeout is uniform and surfaces as [`UpstreamError::Timeout`].

pub mod datasette;
pub mod error;
pub mod parliament;
pub mod payload;
pub mod twfy;
pub mod votes;

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde_json::Value;

pub use datasette::DatasetteClient;
pub use error::{Result, UpstreamError};
pub use parliament::ParliamentClient;
pub use twfy::TwfyClient;
pub use votes::VotesClient;

/// Build the shared HTTP client with an explicit request timeout.
pub fn http_client(timeout: Duration) -> Result<Client> {
  Client::builder()
    .timeout(timeout)
    .user_agent(concat!("parlwatch/", env!("CARGO_PKG_VERSION")))
    .build()
    .map_err(UpstreamError::Transport)
}

/// Send `req` and decode a JSON body.
///
/// Non-success statuses become [`UpstreamError::Status`] carrying the body
/// text, so callers can show a snippet of what went wrong.
pub(crate) async fn get_json(req: RequestBuilder) -> Result<Value> {
  let resp = req.header("accept", "application/json").send().await?;
  let status = resp.status();
  if !status.is_success() {
    let body = resp.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), "upstream returned an error status");
    return Err(UpstreamError::Status {
      status: status.as_u16(),
      body,
    });
  }
  let bytes = resp.bytes().await?;
  serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Decode(e.to_string()))
}

#[cfg(test)]
pub(crate) mod stub {
  //! Minimal axum upstream for client tests.

  use axum::Router;
  use tokio::net::TcpListener;

  /// Serve `app` on an ephemeral local port and return its base URL.
  pub async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
  }
}
