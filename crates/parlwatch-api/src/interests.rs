//! Handlers for `/interests` endpoints, backed by Datasette.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/interests` | filters and paging per [`InterestParams`] |
//! | `GET`  | `/interests/summary` | same filters; payer groups and monthly totals |

use axum::{
  extract::{Query, State},
  response::Response,
};
use chrono::Utc;
use parlwatch_core::{
  Filters, InterestEntry, InterestsPage, Page,
  entry::dedup,
  mapping::map_datasette_row,
  query::{InterestParams, InterestQuery},
  summary::{InterestSummary, summarize},
};
use serde::Serialize;

use crate::{AppState, cached_json, error::ApiError};

/// Extra detail returned with `?diag=1` when diagnostics are allowed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
  pub have_base_url:   bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub db:              Option<String>,
  pub constructed_url: String,
  pub upstream_count:  usize,
}

struct Fetched {
  query:   InterestQuery,
  entries: Vec<InterestEntry>,
  page:    Page,
  diag:    Option<Diagnostics>,
}

async fn fetch(state: &AppState, params: InterestParams) -> Result<Fetched, ApiError> {
  let diagnostics = state.diagnostics(params.wants_diagnostics());
  let client = state.datasette()?;
  let query = InterestQuery::try_from(params)?;

  let url = client
    .query_url(&query)
    .map_err(|e| state.upstream_error(e))?
    .to_string();
  let rows = client.fetch(&query).await.map_err(|e| {
    state
      .upstream_error(e)
      .with_upstream_url(diagnostics.then(|| url.clone()))
  })?;

  let upstream_count = rows.len();
  let entries = dedup(rows.iter().map(map_datasette_row).collect());
  tracing::info!(upstream_count, results = entries.len(), "interests mapped");

  Ok(Fetched {
    page: Page::new(query.limit, query.offset, upstream_count),
    diag: diagnostics.then(|| Diagnostics {
      have_base_url: true,
      db: Some(client.db().to_string()),
      constructed_url: url,
      upstream_count,
    }),
    query,
    entries,
  })
}

#[derive(Debug, Serialize)]
pub struct InterestsBody {
  #[serde(flatten)]
  pub page: InterestsPage,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub diag: Option<Diagnostics>,
}

/// `GET /interests[?start=..][&end=..][&payer=..][&category=..][&limit=..][&offset=..]`
pub async fn list(
  State(state): State<AppState>,
  Query(params): Query<InterestParams>,
) -> Result<Response, ApiError> {
  let fetched = fetch(&state, params).await?;
  let body = InterestsBody {
    page: InterestsPage {
      results: fetched.entries,
      page:    fetched.page,
      filters: fetched.query.filters(),
    },
    diag: fetched.diag,
  };
  Ok(cached_json(&state, &body))
}

#[derive(Debug, Serialize)]
pub struct SummaryBody {
  #[serde(flatten)]
  pub summary: InterestSummary,
  pub page:    Page,
  pub filters: Filters,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub diag:    Option<Diagnostics>,
}

/// `GET /interests/summary`; same parameters as [`list`].
pub async fn summary(
  State(state): State<AppState>,
  Query(params): Query<InterestParams>,
) -> Result<Response, ApiError> {
  let fetched = fetch(&state, params).await?;
  let body = SummaryBody {
    summary: summarize(&fetched.entries, Utc::now()),
    page:    fetched.page,
    filters: fetched.query.filters(),
    diag:    fetched.diag,
  };
  Ok(cached_json(&state, &body))
}
