//! Test client errors.

use thiserror::Error;

/// Errors surfaced by the in-memory test client.
#[derive(Debug, Error)]
pub enum TestError {
    /// The dispatcher finished without producing a response — a deliberately
    /// incomplete handler chain.
    #[error("handler chain produced no response")]
    NoResponse,

    /// A request part (header name/value, method) failed to parse.
    #[error("invalid request part: {0}")]
    InvalidRequest(String),

    /// The response body was not valid UTF-8.
    #[error("response body was not valid UTF-8")]
    NotUtf8,

    /// The request or response body failed JSON (de)serialization.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
