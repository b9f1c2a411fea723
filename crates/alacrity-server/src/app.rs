//! The request dispatcher.
//!
//! [`App`] is the composition root: it owns the route table, the global
//! stage stacks, and the error responder, and runs the per-request flow:
//!
//! 1. run `setup` (a failure here skips routing entirely),
//! 2. resolve the route (a miss is a 405-class error),
//! 3. transcribe captured variables into the parameter map, raw,
//! 4. run the composed stack — pre-route middleware truncated to the
//!    route's frozen step count, the route's own handlers, then `after`,
//! 5. run `finally`, exactly once, no matter what,
//! 6. on failure, give the error responder one shot at the context.
//!
//! Route registration is a configuration-time activity. The table and the
//! per-route composed-stack caches are read-only once traffic flows;
//! registering routes concurrently with live traffic is not supported.

use std::sync::{Arc, OnceLock};

use http::Method;
use http_body_util::BodyExt;
use tracing::Instrument;

use alacrity_core::{BodySource, BoxedHandler, Error, Handler, RequestContext, Response};
use alacrity_middleware::{run_stack, Stage, StageStacks, StackOutcome};
use alacrity_router::{RouteHandle, RouteTable};

use crate::responder::{DefaultErrorResponder, ErrorResponder};

/// Per-route dispatch record: the handler chain, the frozen pre-route step
/// count, and the lazily composed execution stack.
pub struct RouteTarget {
    handlers: Arc<[BoxedHandler]>,
    /// Number of pre-route handlers registered when this route was added.
    /// Never rewritten afterwards — middleware registered later is ignored
    /// by this route.
    steps: usize,
    /// Composed stack cache, built on first dispatch.
    stack: OnceLock<Arc<[BoxedHandler]>>,
}

impl RouteTarget {
    /// The frozen pre-route step count.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }
}

/// The request-routing and middleware-dispatch layer.
///
/// # Example
///
/// ```
/// use alacrity_core::{boxed, BoxFuture, Flow, HandlerResult, RequestContext, handler_fn};
/// use alacrity_server::App;
/// use http::StatusCode;
///
/// fn hello(ctx: &mut RequestContext) -> BoxFuture<'_, HandlerResult> {
///     Box::pin(async move {
///         ctx.send(StatusCode::OK, "hello");
///         Ok(Flow::Continue)
///     })
/// }
///
/// let mut app = App::new();
/// app.get("/hello", vec![boxed(handler_fn(hello))]).unwrap();
/// ```
pub struct App {
    routes: RouteTable<RouteTarget>,
    stacks: StageStacks,
    responder: Arc<dyn ErrorResponder>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Creates an app with no routes, no middleware, and the default error
    /// responder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            routes: RouteTable::new(),
            stacks: StageStacks::new(),
            responder: Arc::new(DefaultErrorResponder::new(false)),
        }
    }

    /// Appends a handler to a global stage.
    pub fn add_stage<H: Handler>(&mut self, stage: Stage, handler: H) {
        self.stacks.add(stage, handler);
    }

    /// Appends an already-boxed handler to a global stage.
    pub fn add_stage_boxed(&mut self, stage: Stage, handler: BoxedHandler) {
        self.stacks.add_boxed(stage, handler);
    }

    /// Registers a handler chain for `method` + `template`.
    ///
    /// The number of pre-route handlers in effect right now is frozen into
    /// the route; `use` middleware added later will not run for it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PatternCompile`] when the template does not compile.
    pub fn add_route(
        &mut self,
        method: &Method,
        template: &str,
        handlers: Vec<BoxedHandler>,
    ) -> Result<RouteHandle, Error> {
        let target = RouteTarget {
            handlers: handlers.into(),
            steps: self.stacks.pre_len(),
            stack: OnceLock::new(),
        };
        self.routes
            .add_route(method, template, target)
            .map_err(Error::from)
    }

    /// Registers a route with the method given as a string, normalized to
    /// uppercase.
    pub fn route(
        &mut self,
        method: &str,
        template: &str,
        handlers: Vec<BoxedHandler>,
    ) -> Result<RouteHandle, Error> {
        let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
            .map_err(|_| Error::internal(format!("invalid request method {method:?}")))?;
        self.add_route(&method, template, handlers)
    }

    /// Registers a GET route.
    pub fn get(&mut self, template: &str, handlers: Vec<BoxedHandler>) -> Result<RouteHandle, Error> {
        self.add_route(&Method::GET, template, handlers)
    }

    /// Registers a POST route.
    pub fn post(&mut self, template: &str, handlers: Vec<BoxedHandler>) -> Result<RouteHandle, Error> {
        self.add_route(&Method::POST, template, handlers)
    }

    /// Registers a PUT route.
    pub fn put(&mut self, template: &str, handlers: Vec<BoxedHandler>) -> Result<RouteHandle, Error> {
        self.add_route(&Method::PUT, template, handlers)
    }

    /// Registers a DELETE route.
    pub fn del(&mut self, template: &str, handlers: Vec<BoxedHandler>) -> Result<RouteHandle, Error> {
        self.add_route(&Method::DELETE, template, handlers)
    }

    /// Reverses a registration. Returns `true` when the handle matched a
    /// live route.
    pub fn remove_route(&mut self, handle: &RouteHandle) -> bool {
        self.routes.remove_route(handle).is_some()
    }

    /// Installs a custom error responder.
    pub fn set_error_responder<R: ErrorResponder>(&mut self, responder: R) {
        self.responder = Arc::new(responder);
    }

    /// Toggles debug detail in the default error responder.
    ///
    /// Replaces whatever responder is installed with a default one.
    pub fn set_debug(&mut self, debug: bool) {
        self.responder = Arc::new(DefaultErrorResponder::new(debug));
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Dispatches one request through the full pipeline.
    ///
    /// Returns `None` when the handler chain finished without sending a
    /// response and without error — a deliberately incomplete chain. The
    /// transport glue is expected to leave such a connection to its own
    /// timeout rather than force-closing it.
    pub async fn dispatch<B>(&self, request: http::Request<B>) -> Option<Response>
    where
        B: hyper::body::Body + Send + 'static,
        B::Data: Send,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let (parts, body) = request.into_parts();
        let target = parts
            .uri
            .path_and_query()
            .map_or_else(|| parts.uri.path().to_string(), |pq| pq.as_str().to_string());

        let source: BodySource = Box::pin(async move {
            match body.collect().await {
                Ok(collected) => Ok(collected.to_bytes()),
                Err(e) => {
                    let e: Box<dyn std::error::Error + Send + Sync> = e.into();
                    Err(Error::body_read(e.to_string()))
                }
            }
        });

        let mut ctx = RequestContext::new(parts.method, &target, parts.headers)
            .with_body_source(source);

        let span = tracing::debug_span!(
            "request",
            id = %ctx.request_id(),
            method = %ctx.method(),
            path = %ctx.path(),
        );
        async {
            self.run_pipeline(&mut ctx).await;
            ctx.take_response()
        }
        .instrument(span)
        .await
    }

    async fn run_pipeline(&self, ctx: &mut RequestContext) {
        // Setup runs before anything else, routing included.
        if let StackOutcome::Failed(err) = run_stack(self.stacks.setup(), ctx).await {
            self.run_finalizers(ctx).await;
            self.finish_with_error(ctx, &err).await;
            return;
        }

        let method = ctx.method().clone();
        let lookup = match ctx.query() {
            Some(query) => format!("{}?{}", ctx.path(), query),
            None => ctx.path().to_string(),
        };

        let outcome = match self.routes.map_route(&method, &lookup) {
            Some(matched) => {
                tracing::debug!(route = matched.name(), "route resolved");
                let stack = composed_stack(&self.stacks, matched.payload());
                ctx.set_matched_route(matched.name(), matched.vars());
                run_stack(&stack, ctx).await
            }
            None => StackOutcome::Failed(Error::not_routed(method.as_str(), ctx.path())),
        };

        self.run_finalizers(ctx).await;

        match outcome {
            StackOutcome::Failed(err) => self.finish_with_error(ctx, &err).await,
            StackOutcome::Completed | StackOutcome::HaltedEarly => self.finish(ctx).await,
        }
    }

    /// Runs the `finally` stack. A finalizer failure ends the stack but
    /// never changes the request outcome.
    async fn run_finalizers(&self, ctx: &mut RequestContext) {
        if let StackOutcome::Failed(err) = run_stack(self.stacks.finalizers(), ctx).await {
            tracing::warn!(error = %err, "finalizer failed");
        }
    }

    async fn finish(&self, ctx: &mut RequestContext) {
        drain_body(ctx).await;
    }

    async fn finish_with_error(&self, ctx: &mut RequestContext, error: &Error) {
        drain_body(ctx).await;
        if ctx.response_sent() {
            tracing::debug!(error = %error, "response already sent, skipping error responder");
            return;
        }
        self.responder.respond(ctx, error).await;
    }
}

/// Builds (or fetches) the cached composed stack for a route: the pre-route
/// middleware truncated to the frozen step count, the route's handlers, then
/// `after`.
fn composed_stack(stacks: &StageStacks, target: &RouteTarget) -> Arc<[BoxedHandler]> {
    target
        .stack
        .get_or_init(|| {
            let pre = stacks.pre();
            let steps = target.steps.min(pre.len());
            let after = stacks.after();

            let mut composed: Vec<BoxedHandler> =
                Vec::with_capacity(steps + target.handlers.len() + after.len());
            composed.extend_from_slice(&pre[..steps]);
            composed.extend_from_slice(&target.handlers);
            composed.extend_from_slice(after);
            Arc::from(composed)
        })
        .clone()
}

/// Consumes any unread body so the connection can be reused, even on the
/// error path.
async fn drain_body(ctx: &mut RequestContext) {
    if !ctx.body_consumed() {
        if let Err(err) = ctx.read_body().await {
            tracing::debug!(error = %err, "failed to drain request body");
        }
    }
}
