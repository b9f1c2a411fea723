//! Body reading and decoding stages.
//!
//! Reading is separated from decoding: [`ReadBody`] only drives the
//! transport's body source (through the context's once-only latch), while
//! [`ParseBody`] and [`ParseBodyParams`] decode the captured bytes by
//! Content-Type. The decoder table lives in [`decode_params`]; the core
//! never grows codec logic of its own.

use std::collections::HashMap;

use alacrity_core::{BoxFuture, Error, Flow, Handler, HandlerResult, RequestContext};

/// Reads the request body into the context.
///
/// Safe to install more than once: the second read resolves immediately with
/// the already-captured bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadBody;

impl Handler for ReadBody {
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            ctx.read_body().await?;
            Ok(Flow::Continue)
        })
    }
}

/// Marks the body consumed without reading it.
///
/// Only for strictly controlled environments where the caller can guarantee
/// no body was sent.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipBody;

impl Handler for SkipBody {
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            ctx.skip_body();
            Ok(Flow::Continue)
        })
    }
}

/// Reads the body and decodes it by Content-Type into the decoded-body slot.
///
/// Without a Content-Type header, a body starting with `{` or `[` is treated
/// as JSON; anything else is treated as a urlencoded/plain payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseBody;

impl Handler for ParseBody {
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let bytes = ctx.read_body().await?.clone();
            if bytes.is_empty() {
                return Ok(Flow::Continue);
            }

            let content_type =
                effective_content_type(ctx.header("content-type"), &bytes).to_string();
            match content_type.as_str() {
                "application/json" => {
                    let value: serde_json::Value = serde_json::from_slice(&bytes)
                        .map_err(|_| Error::bad_request("error decoding body"))?;
                    ctx.set_decoded_body(value);
                }
                "application/x-www-form-urlencoded" | "text/plain" => {
                    let map: serde_json::Map<String, serde_json::Value> =
                        url::form_urlencoded::parse(&bytes)
                            .into_owned()
                            .map(|(k, v)| (k, serde_json::Value::String(v)))
                            .collect();
                    ctx.set_decoded_body(serde_json::Value::Object(map));
                }
                // Unrecognized types (octet-stream included) stay raw.
                _ => {}
            }
            Ok(Flow::Continue)
        })
    }
}

/// Reads the body and decodes it by Content-Type into the parameter map.
///
/// Body params are merged last, so they overwrite route and query values on
/// key collision.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseBodyParams;

impl Handler for ParseBodyParams {
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let bytes = ctx.read_body().await?.clone();
            if bytes.is_empty() {
                return Ok(Flow::Continue);
            }

            let content_type = effective_content_type(ctx.header("content-type"), &bytes).to_string();
            let decoded = decode_params(&content_type, &bytes)?;
            ctx.merge_params(decoded);
            Ok(Flow::Continue)
        })
    }
}

/// Decodes `raw` into a flat parameter mapping according to `content_type`.
///
/// JSON payloads must be objects; scalar members are stringified. Types with
/// no registered decoder yield an empty mapping rather than an error.
pub fn decode_params(
    content_type: &str,
    raw: &[u8],
) -> Result<HashMap<String, String>, Error> {
    match normalize(content_type) {
        "application/json" => {
            let value: serde_json::Value = serde_json::from_slice(raw)
                .map_err(|_| Error::bad_request("error decoding body params"))?;
            let serde_json::Value::Object(map) = value else {
                return Err(Error::bad_request("body params must be a JSON object"));
            };
            Ok(map
                .into_iter()
                .map(|(k, v)| match v {
                    serde_json::Value::String(s) => (k, s),
                    other => (k, other.to_string()),
                })
                .collect())
        }
        "application/x-www-form-urlencoded" | "text/plain" => Ok(url::form_urlencoded::parse(raw)
            .into_owned()
            .collect()),
        _ => Ok(HashMap::new()),
    }
}

/// Strips parameters (`; charset=...`) off a Content-Type value.
fn normalize(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
}

/// Resolves the Content-Type to decode with, sniffing JSON when the header
/// is absent.
fn effective_content_type<'a>(header: Option<&'a str>, body: &[u8]) -> &'a str {
    match header {
        Some(value) => normalize(value),
        None => match body.first() {
            Some(b'{' | b'[') => "application/json",
            _ => "text/plain",
        },
    }
}
