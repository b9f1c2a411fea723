//! Basic authorization header parsing.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use alacrity_core::{
    BasicCredentials, BoxFuture, Error, Flow, Handler, HandlerResult, RequestContext,
};

/// Decodes an `Authorization: Basic` header into credentials on the context.
///
/// A missing header or a non-Basic scheme passes through untouched; only a
/// present-but-malformed Basic header is an error. Verifying the credentials
/// is the application's business.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseBasicAuth;

impl Handler for ParseBasicAuth {
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let Some(auth) = ctx.header("authorization").map(ToString::to_string) else {
                return Ok(Flow::Continue);
            };

            let (scheme, rest) = auth.split_once(' ').unwrap_or((auth.as_str(), ""));
            if !scheme.eq_ignore_ascii_case("basic") {
                return Ok(Flow::Continue);
            }

            let decoded = STANDARD
                .decode(rest.trim())
                .map_err(|_| Error::bad_request("malformed Basic authorization header"))?;
            let text = String::from_utf8(decoded)
                .map_err(|_| Error::bad_request("malformed Basic authorization header"))?;

            let (username, password) = text.split_once(':').unwrap_or((text.as_str(), ""));
            ctx.set_basic_auth(BasicCredentials {
                username: username.to_string(),
                password: password.to_string(),
            });
            Ok(Flow::Continue)
        })
    }
}
