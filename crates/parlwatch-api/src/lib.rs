//! JSON API for parlwatch.
//!
//! Exposes an axum [`Router`] that proxies the upstream parliamentary data
//! services and serves their rows in one normalised shape. CORS, caching
//! headers and panic recovery are applied by [`app`].
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = parlwatch_api::app(AppState::new(config)?);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod interests;
pub mod register;
pub mod state;
pub mod twfy;
pub mod votes;

use std::any::Any;

use axum::{
  Json, Router,
  http::{HeaderValue, Method, header},
  response::{IntoResponse, Response},
  routing::get,
};
use serde::Serialize;
use serde_json::json;
use tower_http::{
  catch_panic::CatchPanicLayer,
  cors::{Any as AnyOrigin, CorsLayer},
  trace::TraceLayer,
};

pub use config::ServerConfig;
pub use error::ApiError;
pub use state::AppState;

// ─── Router ───────────────────────────────────────────────────────────────────

/// Routes relative to the `/api` mount point.
pub fn api_router(state: AppState) -> Router<()> {
  Router::new()
    .route("/interests", get(interests::list))
    .route("/interests/summary", get(interests::summary))
    .route("/register", get(register::list))
    .route("/votes", get(votes::list))
    .route("/twfy", get(twfy::proxy))
    .route("/health", get(health))
    .with_state(state)
}

/// The complete application: `/api` routes plus CORS, tracing and panic
/// recovery.
pub fn app(state: AppState) -> Router {
  let cors = CorsLayer::new()
    .allow_origin(AnyOrigin)
    .allow_methods([Method::GET, Method::OPTIONS])
    .allow_headers([header::CONTENT_TYPE]);

  Router::new()
    .nest("/api", api_router(state))
    .layer(cors)
    .layer(TraceLayer::new_for_http())
    .layer(CatchPanicLayer::custom(panic_response))
}

async fn health() -> Json<serde_json::Value> {
  Json(json!({ "ok": true }))
}

/// A panicking handler never sees its request's `diag` flag here, so the
/// panic message is only logged.
fn panic_response(panic: Box<dyn Any + Send>) -> Response {
  let detail = panic
    .downcast_ref::<String>()
    .cloned()
    .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
    .unwrap_or_else(|| "unknown panic".to_string());
  tracing::error!(%detail, "handler panicked");
  ApiError::Internal("handler panicked".to_string()).into_response()
}

// ─── Responses ────────────────────────────────────────────────────────────────

/// JSON response with the configured CDN caching hint.
pub(crate) fn cached_json<T: Serialize>(state: &AppState, body: &T) -> Response {
  cached_json_for(
    body,
    state.config.cache_ttl_secs,
    Some(state.config.stale_while_revalidate_secs),
  )
}

pub(crate) fn cached_json_for<T: Serialize>(
  body: &T,
  ttl_secs: u32,
  stale_while_revalidate: Option<u32>,
) -> Response {
  let value = match stale_while_revalidate {
    Some(swr) => format!("public, s-maxage={ttl_secs}, stale-while-revalidate={swr}"),
    None => format!("public, s-maxage={ttl_secs}"),
  };
  let mut resp = Json(body).into_response();
  if let Ok(v) = HeaderValue::from_str(&value) {
    resp.headers_mut().insert(header::CACHE_CONTROL, v);
  }
  resp
}

// ─── Integration tests ────────────────────────────────────────────────────────
