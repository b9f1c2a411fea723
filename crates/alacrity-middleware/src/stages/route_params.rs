//! Route variable transcription and decoding.
//!
//! The dispatcher copies captured variables into the parameter map raw;
//! percent-decoding is never implicit. Applications that want decoded
//! variables install [`DecodeRouteParams`] explicitly.

use alacrity_core::{BoxFuture, Error, Flow, Handler, HandlerResult, RequestContext};

/// Transcribes the matched route's raw captured variables into the
/// parameter map.
///
/// The dispatcher already does this once at routing time; the stage exists
/// for pipelines built by hand around the bare executor.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseRouteParams;

impl Handler for ParseRouteParams {
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let vars: Vec<(String, String)> = ctx
                .route_vars()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            ctx.merge_params(vars);
            Ok(Flow::Continue)
        })
    }
}

/// Percent-decodes the captured route variables into the parameter map.
///
/// Malformed percent sequences are a 400-class error.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeRouteParams;

impl Handler for DecodeRouteParams {
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let vars: Vec<(String, String)> = ctx
                .route_vars()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            for (name, raw) in vars {
                match urlencoding::decode(&raw) {
                    Ok(decoded) => ctx.set_param(name, decoded.into_owned()),
                    Err(_) => {
                        return Err(Error::bad_request(format!(
                            "malformed percent-encoding in path variable {name:?}"
                        )))
                    }
                }
            }
            Ok(Flow::Continue)
        })
    }
}
