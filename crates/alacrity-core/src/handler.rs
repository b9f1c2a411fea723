//! The handler contract.
//!
//! Every pipeline stage — setup middleware, pre-route middleware, route
//! handlers, after and finally stages — implements the same [`Handler`]
//! trait: an async function over the mutable [`RequestContext`] that resolves
//! to exactly one of three outcomes:
//!
//! - `Ok(Flow::Continue)` — proceed to the next handler,
//! - `Ok(Flow::Halt)` — stop the pipeline early, successfully,
//! - `Err(error)` — abort with an error.
//!
//! A handler signals completion exactly once: resolving its future *is* that
//! single signal, so double-completion is unrepresentable rather than merely
//! discouraged.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::RequestContext;
use crate::error::Error;

/// A boxed future, as returned by handler implementations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a handler wants the pipeline to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Proceed to the next handler in the stack.
    Continue,
    /// Stop the pipeline without an error. Remaining handlers in the current
    /// and later normal stages are skipped; `finally` still runs.
    Halt,
}

/// The result of one handler invocation.
pub type HandlerResult = Result<Flow, Error>;

/// A single pipeline stage.
///
/// # Example
///
/// ```
/// use alacrity_core::{BoxFuture, Flow, Handler, HandlerResult, RequestContext};
///
/// struct RequireJson;
///
/// impl Handler for RequireJson {
///     fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, HandlerResult> {
///         Box::pin(async move {
///             match ctx.header("content-type") {
///                 Some(ct) if ct.starts_with("application/json") => Ok(Flow::Continue),
///                 _ => Err(alacrity_core::Error::bad_request("expected JSON body")),
///             }
///         })
///     }
/// }
/// ```
pub trait Handler: Send + Sync + 'static {
    /// Runs this stage against the request.
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, HandlerResult>;
}

/// A shareable, type-erased handler as stored in middleware stacks.
pub type BoxedHandler = Arc<dyn Handler>;

/// Boxes a handler for storage in a stack.
pub fn boxed<H: Handler>(handler: H) -> BoxedHandler {
    Arc::new(handler)
}

/// Adapter turning a plain function into a [`Handler`].
///
/// Works best with named functions returning a boxed future:
///
/// ```
/// use alacrity_core::{handler_fn, BoxFuture, Flow, HandlerResult, RequestContext};
///
/// fn tag_request(ctx: &mut RequestContext) -> BoxFuture<'_, HandlerResult> {
///     Box::pin(async move {
///         ctx.set_param("tagged", "yes");
///         Ok(Flow::Continue)
///     })
/// }
///
/// let handler = handler_fn(tag_request);
/// ```
pub struct FnHandler<F> {
    func: F,
}

/// Wraps a function in a [`FnHandler`].
pub fn handler_fn<F>(func: F) -> FnHandler<F>
where
    F: for<'a> Fn(&'a mut RequestContext) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
{
    FnHandler { func }
}

impl<F> Handler for FnHandler<F>
where
    F: for<'a> Fn(&'a mut RequestContext) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
{
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, HandlerResult> {
        (self.func)(ctx)
    }
}
