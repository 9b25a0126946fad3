//! Handler for `GET /register`, backed by the Parliament interests API.
//!
//! The member's register is fetched across every configured category in
//! parallel, then filtered, sorted newest first, deduplicated and paged in
//! memory. Accepts the same parameters as `/interests`.

use axum::{
  extract::{Query, State},
  response::Response,
};
use parlwatch_core::{
  Error::MissingParam,
  InterestsPage, Page,
  entry::{dedup, sort_by_received_desc},
  query::{InterestParams, InterestQuery},
};

use crate::{
  AppState, cached_json,
  error::ApiError,
  interests::{Diagnostics, InterestsBody},
};

/// `GET /register?memberId=<id>[&payer=..][&start=..][&end=..][&limit=..][&offset=..]`
pub async fn list(
  State(state): State<AppState>,
  Query(params): Query<InterestParams>,
) -> Result<Response, ApiError> {
  let diagnostics = state.diagnostics(params.wants_diagnostics());
  let client = state.parliament()?;
  let query = InterestQuery::try_from(params)?;

  let member_id = query
    .member_id
    .clone()
    .or_else(|| query.person_id.clone())
    .or_else(|| state.config.default_member_id.map(|id| id.to_string()))
    .ok_or(MissingParam("memberId"))?;

  let per_category = query.offset.saturating_add(query.limit);
  let sample_url = state
    .config
    .parliament_categories
    .first()
    .and_then(|c| client.category_url(&member_id, *c, per_category).ok())
    .map(String::from)
    .filter(|_| diagnostics);

  let fetched = client
    .fetch_member(&member_id, &state.config.parliament_categories, per_category)
    .await
    .map_err(|e| state.upstream_error(e).with_upstream_url(sample_url.clone()))?;
  let upstream_count = fetched.len();

  // The member id was already applied upstream; the entry's own person id
  // may be absent, so it must not filter again here.
  let filter = InterestQuery { person_id: None, ..query.clone() };
  let mut entries: Vec<_> = fetched.into_iter().filter(|e| filter.matches(e)).collect();
  sort_by_received_desc(&mut entries);
  let entries = dedup(entries);

  let total = entries.len();
  let results = entries
    .into_iter()
    .skip(query.offset as usize)
    .take(query.limit as usize)
    .collect();

  let body = InterestsBody {
    page: InterestsPage {
      results,
      page: Page::in_memory(query.limit, query.offset, total),
      filters: query.filters(),
    },
    diag: sample_url.map(|url| Diagnostics {
      have_base_url: true,
      db: None,
      constructed_url: url,
      upstream_count,
    }),
  };
  Ok(cached_json(&state, &body))
}
