//! Errors raised to callers of the compressors

use thiserror::Error;

/// Validation and input failures. Each variant is a distinct, stable kind.
#[derive(Debug, Error)]
pub enum CompressError {
    #[error("invalid method '{0}': must be one of auto, relevant, summary, strip")]
    InvalidMethod(String),

    #[error("method 'relevant' requires a non-empty query")]
    MissingQuery,

    #[error("input too large ({size} > {limit})")]
    InputTooLarge { size: u64, limit: u64 },

    #[error("query too long ({len} chars, max {limit})")]
    QueryTooLong { len: usize, limit: usize },

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

impl CompressError {
    /// Stable short name for the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            CompressError::InvalidMethod(_) => "invalid_method",
            CompressError::MissingQuery => "missing_query",
            CompressError::InputTooLarge { .. } => "input_too_large",
            CompressError::QueryTooLong { .. } => "query_too_long",
            CompressError::Io(_) => "io",
        }
    }
}
