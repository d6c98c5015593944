//! Errors surfaced at the searcher boundary.
//!
//! A searcher never panics or throws on a bad backend: every failure ends up as a
//! `SearchError`, which callers treat as "no data" (distinct from an empty result).

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SearchError {
    /// The request never produced a usable response (connect, timeout, body read)
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The payload could not be parsed into the expected shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The backend has no way to locate this file
    #[error("unknown file: {0}")]
    UnknownFile(String),

    /// The backend does not implement this operation
    #[error("operation not supported by this backend: {0}")]
    Unsupported(&'static str),

    /// A scheduled task panicked or was torn down before producing a value
    #[error("search task failed: {0}")]
    TaskFailed(String),
}

impl SearchError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse(reason.into())
    }

    pub fn transport(reason: impl std::fmt::Display) -> Self {
        Self::Transport(reason.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
