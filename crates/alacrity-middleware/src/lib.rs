//! # Alacrity Middleware
//!
//! The middleware pipeline executor and the stock stage library.
//!
//! ## Pipeline Stages
//!
//! ```text
//! Request → setup → use (pre-route) → route handlers → after → finally
//! ```
//!
//! `setup` runs before routing. `use` handlers are frozen per route at
//! registration time. `after` is skipped on error. `finally` always runs,
//! exactly once — guaranteed cleanup lives there.
//!
//! ## Handler Outcomes
//!
//! A handler resolves to one of three outcomes, and the executor maps them
//! onto the stack's terminal state:
//!
//! | handler result       | stack outcome                    |
//! |----------------------|----------------------------------|
//! | `Ok(Flow::Continue)` | next handler runs                |
//! | `Ok(Flow::Halt)`     | `HaltedEarly` — success, no error handling |
//! | `Err(e)` / panic     | `Failed(e)` — error responder path |
//!
//! ## Example
//!
//! ```
//! use alacrity_core::{boxed, RequestContext};
//! use alacrity_middleware::{run_stack, StackOutcome};
//! use alacrity_middleware::stages::ParseQueryParams;
//! use http::{HeaderMap, Method};
//!
//! # tokio_test::block_on(async {
//! let stack = vec![boxed(ParseQueryParams)];
//! let mut ctx = RequestContext::new(Method::GET, "/find?q=kid", HeaderMap::new());
//!
//! let outcome = run_stack(&stack, &mut ctx).await;
//! assert!(matches!(outcome, StackOutcome::Completed));
//! assert_eq!(ctx.param("q"), Some("kid"));
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/alacrity-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod executor;
mod stage;
pub mod stages;

pub use executor::{run_stack, StackOutcome};
pub use stage::{Stage, StageStacks};
