//! Handler for `GET /votes`, backed by the Commons Votes API.

use axum::{
  extract::{Query, State},
  response::Response,
};
use parlwatch_core::{
  Error::MissingParam,
  votes::{VoteRecord, VoteTally, tally_votes},
};
use serde::{Deserialize, Serialize};

use crate::{AppState, cached_json, error::ApiError};

const DEFAULT_TAKE: u32 = 50;
const MAX_TAKE: u32 = 500;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VotesParams {
  #[serde(alias = "MemberId")]
  pub member_id: Option<String>,
  #[serde(alias = "Take")]
  pub take:      Option<String>,
  #[serde(alias = "Skip")]
  pub skip:      Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VotesBody {
  pub member_id: u32,
  pub tally:     VoteTally,
  pub votes:     Vec<VoteRecord>,
}

/// `GET /votes[?memberId=<id>][&take=..][&skip=..]`
pub async fn list(
  State(state): State<AppState>,
  Query(params): Query<VotesParams>,
) -> Result<Response, ApiError> {
  let client = state.votes()?;

  let member_id = match params.member_id.as_deref().map(str::trim) {
    Some(raw) if !raw.is_empty() => raw
      .parse::<u32>()
      .map_err(|_| ApiError::BadRequest(format!("memberId is not a number: {raw:?}")))?,
    _ => state
      .config
      .default_member_id
      .ok_or(MissingParam("memberId"))?,
  };
  let take = params
    .take
    .and_then(|s| s.trim().parse::<u32>().ok())
    .filter(|n| *n > 0)
    .map_or(DEFAULT_TAKE, |n| n.min(MAX_TAKE));
  let skip = params
    .skip
    .and_then(|s| s.trim().parse::<u32>().ok())
    .unwrap_or(0);

  let votes = client
    .member_votes(member_id, take, skip)
    .await
    .map_err(|e| state.upstream_error(e))?;

  let body = VotesBody {
    member_id,
    tally: tally_votes(&votes),
    votes,
  };
  Ok(cached_json(&state, &body))
}
