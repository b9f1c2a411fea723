//! Stage-list execution.
//!
//! [`run_stack`] drives an ordered list of handlers against one request
//! context: single-threaded, cooperative, one handler awaited at a time.
//! Each handler resolves to continue, halt, or error, and the first non-
//! continue outcome terminates the list.
//!
//! A panicking handler is caught and folded into the error outcome — a bad
//! handler must not take the dispatcher down with it.

use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;

use alacrity_core::{BoxedHandler, Error, Flow, RequestContext};

/// Terminal state of one stage-list execution.
#[derive(Debug)]
pub enum StackOutcome {
    /// Every handler ran and asked to continue.
    Completed,
    /// A handler raised the halt signal: early, successful termination.
    HaltedEarly,
    /// A handler returned an error or panicked.
    Failed(Error),
}

impl StackOutcome {
    /// Returns `true` for the error outcome.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Unwraps the error, if this is the error outcome.
    #[must_use]
    pub fn into_error(self) -> Option<Error> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Runs `handlers` in order against `ctx`.
///
/// Handlers after the first halt or error are not invoked. The halt signal
/// is not an error: callers proceed to their next phase exactly as they
/// would after [`StackOutcome::Completed`].
pub async fn run_stack(handlers: &[BoxedHandler], ctx: &mut RequestContext) -> StackOutcome {
    for (index, handler) in handlers.iter().enumerate() {
        match AssertUnwindSafe(handler.call(ctx)).catch_unwind().await {
            Ok(Ok(Flow::Continue)) => {}
            Ok(Ok(Flow::Halt)) => {
                tracing::trace!(index, "stack halted early");
                return StackOutcome::HaltedEarly;
            }
            Ok(Err(err)) => {
                tracing::debug!(index, error = %err, "stage failed");
                return StackOutcome::Failed(err);
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(index, message, "stage panicked");
                return StackOutcome::Failed(Error::stage(anyhow::anyhow!(
                    "handler panicked: {message}"
                )));
            }
        }
    }
    StackOutcome::Completed
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
