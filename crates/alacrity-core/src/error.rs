//! Error types for Alacrity.
//!
//! One tagged-variant [`Error`] covers the whole dispatch path. Every variant
//! maps to an HTTP status code; the default message for a bare status comes
//! from the static reason-phrase table (via
//! [`StatusCode::canonical_reason`]), so no error types are minted at
//! runtime.
//!
//! The halt signal is deliberately *not* part of this taxonomy — stopping a
//! pipeline early without an error is expressed through
//! [`Flow::Halt`](crate::Flow), so cache-style middleware that already sent a
//! response never trips error handling.

use alacrity_router::PatternError;
use http::StatusCode;
use thiserror::Error;

/// Standard error type for Alacrity.
///
/// # Example
///
/// ```
/// use alacrity_core::Error;
/// use http::StatusCode;
///
/// let err = Error::bad_request("missing `id` parameter");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// ```
#[derive(Debug, Error)]
pub enum Error {
    /// No route was registered for this method + path combination.
    #[error("{method} {path}: route not mapped")]
    NotRouted {
        /// The request method.
        method: String,
        /// The request path (without query).
        path: String,
    },

    /// A pipeline handler failed, either by returning an error or by
    /// panicking.
    #[error("middleware stage failed: {source}")]
    Stage {
        /// The handler-supplied failure.
        #[source]
        source: anyhow::Error,
    },

    /// The request body could not be read from the transport.
    #[error("error reading request body: {message}")]
    BodyRead {
        /// Description of the transport failure.
        message: String,
    },

    /// A route template failed to compile at registration time.
    #[error(transparent)]
    PatternCompile(#[from] PatternError),

    /// An error with an explicit HTTP status, raised by application code.
    #[error("{message}")]
    Http {
        /// The response status to send.
        status: StatusCode,
        /// Human-readable message.
        message: String,
    },
}

impl Error {
    /// Creates a not-routed error for a method + path pair.
    #[must_use]
    pub fn not_routed(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self::NotRouted {
            method: method.into(),
            path: path.into(),
        }
    }

    /// Wraps a handler failure.
    pub fn stage(source: impl Into<anyhow::Error>) -> Self {
        Self::Stage {
            source: source.into(),
        }
    }

    /// Creates a body-read error.
    #[must_use]
    pub fn body_read(message: impl Into<String>) -> Self {
        Self::BodyRead {
            message: message.into(),
        }
    }

    /// Creates an error from a bare status code, using the status's
    /// canonical reason phrase as the message.
    #[must_use]
    pub fn with_status(status: StatusCode) -> Self {
        Self::Http {
            status,
            message: status
                .canonical_reason()
                .unwrap_or("unrecognized status")
                .to_string(),
        }
    }

    /// Creates an error with an explicit status and message.
    #[must_use]
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::http(StatusCode::BAD_REQUEST, message)
    }

    /// Creates a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::http(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Returns the HTTP status code this error responds with.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotRouted { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::Stage { .. } | Self::BodyRead { .. } | Self::PatternCompile(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Http { status, .. } => *status,
        }
    }
}
