//! Error types for `parlwatch-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("parameter {name} is not a number: {value:?}")]
  InvalidNumber { name: &'static str, value: String },

  #[error("parameter {name} is not a YYYY-MM-DD date: {value:?}")]
  InvalidDate { name: &'static str, value: String },

  #[error("missing required parameter: {0}")]
  MissingParam(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
