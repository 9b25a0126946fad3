//! Core types and pure logic for parlwatch.
//!
//! This crate is deliberately free of HTTP dependencies. It turns the loosely
//! shaped JSON rows served by the various parliamentary data sources into
//! [`InterestEntry`] records, and holds the narrative text heuristics used
//! when a source only provides prose.

pub mod date;
pub mod entry;
pub mod error;
pub mod extract;
pub mod mapping;
pub mod query;
pub mod summary;
pub mod votes;

pub use entry::{Filters, InterestEntry, InterestsPage, Page};
pub use error::{Error, Result};
