//! # Alacrity Server
//!
//! The request dispatcher and the HTTP serving glue.
//!
//! [`App`] composes the route table, the global middleware stacks, and the
//! error responder into the per-request pipeline; [`Server`] feeds it from a
//! Hyper HTTP/1 connection loop.
//!
//! # Example
//!
//! ```rust,ignore
//! use alacrity_core::{boxed, handler_fn, BoxFuture, Flow, HandlerResult, RequestContext};
//! use alacrity_middleware::stages::ParseQueryParams;
//! use alacrity_middleware::Stage;
//! use alacrity_server::{App, Server, ServerConfig};
//! use http::StatusCode;
//!
//! fn hello(ctx: &mut RequestContext) -> BoxFuture<'_, HandlerResult> {
//!     Box::pin(async move {
//!         let name = ctx.param("name").unwrap_or("world").to_string();
//!         ctx.send(StatusCode::OK, format!("hello, {name}"));
//!         Ok(Flow::Continue)
//!     })
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut app = App::new();
//!     app.add_stage(Stage::Pre, ParseQueryParams);
//!     app.get("/hello/:name", vec![boxed(handler_fn(hello))])?;
//!
//!     let config = ServerConfig::builder().http_addr("127.0.0.1:8080").build();
//!     Server::new(app, config).run().await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/alacrity-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
mod config;
mod logging;
mod responder;
mod server;

pub use app::{App, RouteTarget};
pub use config::{ServerConfig, ServerConfigBuilder, DEFAULT_HTTP_ADDR};
pub use logging::init_logging;
pub use responder::{DefaultErrorResponder, ErrorResponder};
pub use server::{Server, ServerError};
