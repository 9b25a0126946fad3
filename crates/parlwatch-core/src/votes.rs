//! Division voting records for a single member.

use serde::{Deserialize, Serialize};

/// How the member took part in a division.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberVote {
  Aye,
  No,
  Teller,
  /// The record carries no vote for the member.
  Absent,
}

impl MemberVote {
  /// Tellers count the votes rather than cast one, so they win over the
  /// aye/no flag.
  pub fn from_flags(voted_aye: Option<bool>, was_teller: bool) -> Self {
    match (was_teller, voted_aye) {
      (true, _) => MemberVote::Teller,
      (false, Some(true)) => MemberVote::Aye,
      (false, Some(false)) => MemberVote::No,
      (false, None) => MemberVote::Absent,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRecord {
  pub division_id: Option<i64>,
  pub number:      Option<i64>,
  pub title:       String,
  pub date:        Option<String>,
  pub aye_count:   Option<i64>,
  pub no_count:    Option<i64>,
  pub vote:        MemberVote,
  pub link:        Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
  pub total:  usize,
  pub aye:    usize,
  pub no:     usize,
  pub teller: usize,
}

pub fn tally_votes(records: &[VoteRecord]) -> VoteTally {
  records.iter().fold(
    VoteTally { total: records.len(), ..VoteTally::default() },
    |mut t, r| {
      match r.vote {
        MemberVote::Aye => t.aye += 1,
        MemberVote::No => t.no += 1,
        MemberVote::Teller => t.teller += 1,
        MemberVote::Absent => {}
      }
      t
    },
  )
}
