//! # Error Types
//!
//! Errors shared across crates.

use thiserror::Error;

/// Failure to parse a caller-supplied identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    /// Input was not a well-formed UUID.
    #[error("malformed {kind} id: {input:?}")]
    Malformed {
        /// Which identifier was being parsed.
        kind: &'static str,
        /// The offending input (truncated to 64 chars).
        input: String,
    },

    /// Input parsed as the nil UUID, which never identifies anything.
    #[error("nil {kind} id")]
    Nil {
        /// Which identifier was being parsed.
        kind: &'static str,
    },
}
