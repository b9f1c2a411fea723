//! Pluggable error responses.

use http::HeaderValue;

use alacrity_core::{BoxFuture, Error, RequestContext};

/// Produces the response for a failed or unrouted request.
///
/// Invoked at most once per request, and only when no response has been
/// sent yet. Returning from `respond` signals completion back to the
/// dispatcher, so the connection is never left hanging by the error path
/// itself.
pub trait ErrorResponder: Send + Sync + 'static {
    /// Writes an error response into the context.
    fn respond<'a>(&'a self, ctx: &'a mut RequestContext, error: &'a Error) -> BoxFuture<'a, ()>;
}

/// The built-in responder: a plain-text body with the error's status code.
///
/// In debug mode, the error's full debug representation is appended so the
/// failure chain is visible to the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorResponder {
    debug: bool,
}

impl DefaultErrorResponder {
    /// Creates a responder; `debug` controls whether error detail is
    /// appended to the body.
    #[must_use]
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }
}

impl ErrorResponder for DefaultErrorResponder {
    fn respond<'a>(&'a self, ctx: &'a mut RequestContext, error: &'a Error) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            let status = error.status_code();
            let mut message = error.to_string();
            if self.debug {
                message.push('\n');
                message.push_str(&format!("{error:?}"));
            }

            tracing::debug!(%status, "sending default error response");
            ctx.set_header(
                http::header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            );
            ctx.send(status, message);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, Method, StatusCode};

    fn ctx() -> RequestContext {
        RequestContext::new(Method::GET, "/oops", HeaderMap::new())
    }

    #[tokio::test]
    async fn test_default_responder_uses_error_status() {
        let responder = DefaultErrorResponder::new(false);
        let mut ctx = ctx();
        let error = Error::not_routed("GET", "/oops");

        responder.respond(&mut ctx, &error).await;
        let response = ctx.take_response().expect("error response sent");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_debug_mode_appends_detail() {
        let responder = DefaultErrorResponder::new(true);
        let mut ctx = ctx();
        let error = Error::internal("kaboom");

        responder.respond(&mut ctx, &error).await;
        let response = ctx.take_response().expect("error response sent");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_responder_respects_already_sent_response() {
        let responder = DefaultErrorResponder::new(false);
        let mut ctx = ctx();
        ctx.send(StatusCode::OK, "cached");

        responder.respond(&mut ctx, &Error::internal("late")).await;
        let response = ctx.take_response().expect("original response");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
