//! Response finalization.

use alacrity_core::{BoxFuture, Flow, Handler, HandlerResult, RequestContext};

/// Flushes the pending response if no handler has sent one.
///
/// Handlers that only stash a status/body pair (through
/// [`RequestContext::set_status`] and [`RequestContext::set_body`]) rely on
/// this stage — usually installed in `finally` — to emit the response. When
/// nothing was stashed either, an empty 200 goes out. A response that was
/// already sent is left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct CloseResponse;

impl Handler for CloseResponse {
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            ctx.send_pending();
            Ok(Flow::Continue)
        })
    }
}
