//! Error types for request execution and stub declaration.
//!
//! # Design
//! An unmatched expectation and a dispatch without a response are normal
//! paths, not errors. What remains is a callback that failed (surfaced as-is
//! with where it sat in the dispatch order), a real connection attempted
//! while connections are blocked, and malformed stub declarations.

use thiserror::Error;

use crate::callbacks::{Scope, Slot};
use crate::http::HttpMethod;

#[derive(Debug, Error)]
pub enum Error {
    /// A registered callback returned an error. Callbacks after it in the
    /// dispatch order did not run.
    #[error("{scope} {slot} callback #{position} failed")]
    Callback {
        scope: Scope,
        slot: Slot,
        /// Index of the callback within its own scope and slot.
        position: usize,
        #[source]
        source: anyhow::Error,
    },

    /// No expectation matched and real connections are disabled.
    #[error("real connections are blocked and no expectation matches {method} {url}")]
    BlockedConnection { method: HttpMethod, url: String },

    #[error("failed to parse fixtures: {0}")]
    Fixture(#[from] serde_json::Error),

    #[error("invalid fixture: {0}")]
    InvalidFixture(String),

    #[error("invalid url pattern: {0}")]
    Pattern(#[from] regex::Error),
}
