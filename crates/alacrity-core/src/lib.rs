//! # Alacrity Core
//!
//! Core types and traits for the Alacrity framework:
//!
//! - [`RequestContext`] — per-request state threaded through the pipeline
//! - [`Handler`] / [`Flow`] — the stage contract (continue / halt / error)
//! - [`Error`] — the single tagged error type with HTTP status mapping
//! - [`RequestId`] — UUID v7 identifier for log correlation

#![doc(html_root_url = "https://docs.rs/alacrity-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod handler;

pub use context::{BasicCredentials, BodySource, RequestContext, RequestId, Response};
pub use error::Error;
pub use handler::{boxed, handler_fn, BoxFuture, BoxedHandler, Flow, FnHandler, Handler, HandlerResult};
