//! # Alacrity
//!
//! A lightweight request-routing and middleware-dispatch layer for REST
//! micro-services, sitting atop a generic HTTP server primitive.
//!
//! Two pieces do the real work:
//!
//! - the **route matcher** — literal templates hit a hash map, `/:name`
//!   templates compile to capturing patterns matched in registration order;
//! - the **pipeline executor** — per request, an ordered run of
//!   `setup → use → route handlers → after → finally`, where errors skip to
//!   the error responder, the halt signal ends the run successfully, and
//!   `finally` always executes.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use alacrity::prelude::*;
//! use http::StatusCode;
//!
//! fn get_user(ctx: &mut RequestContext) -> BoxFuture<'_, HandlerResult> {
//!     Box::pin(async move {
//!         let id = ctx.param("id").unwrap_or("?").to_string();
//!         ctx.send_json(StatusCode::OK, &serde_json::json!({ "id": id }))?;
//!         Ok(Flow::Continue)
//!     })
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut app = App::new();
//!     app.add_stage(Stage::Pre, ParseQueryParams);
//!     app.get("/users/:id", vec![boxed(handler_fn(get_user))])?;
//!
//!     let config = ServerConfig::builder().http_addr("0.0.0.0:8080").build();
//!     Server::new(app, config).run().await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/alacrity/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use alacrity_core as core;

// Re-export router types
pub use alacrity_router as router;

// Re-export middleware types
pub use alacrity_middleware as middleware;

// Re-export server types
pub use alacrity_server as server;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use alacrity_core::{
        boxed, handler_fn, BasicCredentials, BoxFuture, BoxedHandler, Error, Flow, FnHandler,
        Handler, HandlerResult, RequestContext, RequestId, Response,
    };
    pub use alacrity_middleware::stages::{
        CloseResponse, DecodeRouteParams, ParseBasicAuth, ParseBody, ParseBodyParams,
        ParseQueryParams, ParseRouteParams, ReadBody, SkipBody,
    };
    pub use alacrity_middleware::{run_stack, Stage, StackOutcome};
    pub use alacrity_router::{Params, RouteHandle, RouteMatch, RouteTable};
    pub use alacrity_server::{
        App, DefaultErrorResponder, ErrorResponder, Server, ServerConfig,
    };
}
