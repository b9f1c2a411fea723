//! # Alacrity Test
//!
//! In-memory testing for Alacrity apps: build an [`App`](alacrity_server::App),
//! wrap it in a [`TestClient`], and dispatch requests without opening a
//! socket. `send()` resolving doubles as the request-completion signal for
//! embedding and mocking scenarios.

#![doc(html_root_url = "https://docs.rs/alacrity-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::TestClient;
pub use error::TestError;
pub use request::TestRequest;
pub use response::TestResponse;
