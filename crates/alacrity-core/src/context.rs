//! Per-request context.
//!
//! A [`RequestContext`] is created when a request arrives, threaded by
//! mutable reference through every pipeline stage, and destroyed once the
//! response is finalized. It owns all per-request state: the decoded
//! parameter union, the (at-most-once) body read latch, the matched-route
//! record, and the accumulated response.
//!
//! Nothing here is shared between requests; per-request state lives on
//! this value, never on a shared transport type.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use http_body_util::Full;
use serde::Serialize;
use uuid::Uuid;

use crate::error::Error;

/// The HTTP response type produced by a dispatch.
pub type Response = http::Response<Full<Bytes>>;

/// Deferred body producer installed by the transport glue.
///
/// Driven at most once, by [`RequestContext::read_body`].
pub type BodySource = Pin<Box<dyn Future<Output = Result<Bytes, Error>> + Send>>;

/// A unique identifier for each request, used for log correlation.
///
/// UUID v7 is time-ordered, which keeps ids sortable in log streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Credentials decoded from an `Authorization: Basic` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    /// The username part (before the first `:`).
    pub username: String,
    /// The password part (after the first `:`).
    pub password: String,
}

/// Accumulated response state.
///
/// Handlers either send eagerly through [`RequestContext::send`] or stash a
/// status/body pair for a finalizer stage to flush.
#[derive(Debug)]
struct ResponseState {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    sent: bool,
}

impl Default for ResponseState {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            sent: false,
        }
    }
}

/// Per-request state threaded through the middleware pipeline.
///
/// # Parameter Union
///
/// The parameter map is the union of route variables, query params, and body
/// params. Sources merged later overwrite earlier keys on collision. Route
/// variables arrive raw (not percent-decoded); decoding is an explicit stage.
///
/// # Body Read Latch
///
/// The body may be read at most once. The first [`read_body`] call consumes
/// the installed [`BodySource`]; any later call resolves immediately with the
/// already-captured bytes. Taking the source out of its slot before awaiting
/// doubles as the re-entrancy guard.
///
/// [`read_body`]: RequestContext::read_body
pub struct RequestContext {
    request_id: RequestId,
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    params: HashMap<String, String>,
    route_name: Option<String>,
    route_vars: HashMap<String, String>,
    body: Option<Bytes>,
    decoded_body: Option<serde_json::Value>,
    body_source: Option<BodySource>,
    basic_auth: Option<BasicCredentials>,
    response: ResponseState,
    started_at: Instant,
}

impl RequestContext {
    /// Creates a context for `method` and a request target.
    ///
    /// `target` is the path with an optional `?query`, which is split and
    /// retained here.
    #[must_use]
    pub fn new(method: Method, target: &str, headers: HeaderMap) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (target.to_string(), None),
        };

        Self {
            request_id: RequestId::new(),
            method,
            path,
            query,
            headers,
            params: HashMap::new(),
            route_name: None,
            route_vars: HashMap::new(),
            body: None,
            decoded_body: None,
            body_source: None,
            basic_auth: None,
            response: ResponseState::default(),
            started_at: Instant::now(),
        }
    }

    /// Installs the deferred body producer.
    #[must_use]
    pub fn with_body_source(mut self, source: BodySource) -> Self {
        self.body_source = Some(source);
        self
    }

    /// Returns the request id.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path, query excluded.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns everything after `?` in the request target, if present.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value as a string, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the decoded parameter union.
    #[must_use]
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Returns one parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Inserts a parameter, overwriting any earlier value for the key.
    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.insert(name.into(), value.into());
    }

    /// Merges a batch of parameters, overwriting on collision.
    pub fn merge_params<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in pairs {
            self.params.insert(k.into(), v.into());
        }
    }

    /// Returns the matched route template, once routing has resolved.
    #[must_use]
    pub fn route_name(&self) -> Option<&str> {
        self.route_name.as_deref()
    }

    /// Returns the raw variables captured by the route match.
    #[must_use]
    pub fn route_vars(&self) -> &HashMap<String, String> {
        &self.route_vars
    }

    /// Records the resolved route and transcribes its captured variables
    /// into the parameter map, raw.
    pub fn set_matched_route(&mut self, name: impl Into<String>, vars: &alacrity_router::Params) {
        self.route_name = Some(name.into());
        for (k, v) in vars {
            self.route_vars.insert(k.to_string(), v.to_string());
            self.params.insert(k.to_string(), v.to_string());
        }
    }

    /// Returns the raw body, if it has been read.
    #[must_use]
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Returns `true` once the body has been consumed (read or skipped).
    #[must_use]
    pub fn body_consumed(&self) -> bool {
        self.body.is_some()
    }

    /// Reads the request body, at most once.
    ///
    /// The second and later calls resolve immediately with the captured
    /// bytes; the underlying source is never driven twice. A context with no
    /// installed source yields an empty body.
    pub async fn read_body(&mut self) -> Result<&Bytes, Error> {
        if self.body.is_none() {
            let bytes = match self.body_source.take() {
                Some(source) => source.await?,
                None => Bytes::new(),
            };
            self.body = Some(bytes);
        }
        Ok(self.body.as_ref().expect("body captured above"))
    }

    /// Marks the body consumed without reading it.
    ///
    /// Only safe when the caller can guarantee there is no body to drain.
    pub fn skip_body(&mut self) {
        self.body_source = None;
        if self.body.is_none() {
            self.body = Some(Bytes::new());
        }
    }

    /// Returns the decoded body, if a body-parsing stage ran.
    #[must_use]
    pub fn decoded_body(&self) -> Option<&serde_json::Value> {
        self.decoded_body.as_ref()
    }

    /// Stores the decoded body.
    pub fn set_decoded_body(&mut self, value: serde_json::Value) {
        self.decoded_body = Some(value);
    }

    /// Returns decoded Basic credentials, if an auth stage ran.
    #[must_use]
    pub fn basic_auth(&self) -> Option<&BasicCredentials> {
        self.basic_auth.as_ref()
    }

    /// Stores decoded Basic credentials.
    pub fn set_basic_auth(&mut self, credentials: BasicCredentials) {
        self.basic_auth = Some(credentials);
    }

    /// Sets the pending response status without sending.
    pub fn set_status(&mut self, status: StatusCode) {
        self.response.status = status;
    }

    /// Sets a response header.
    pub fn set_header(&mut self, name: http::header::HeaderName, value: http::HeaderValue) {
        self.response.headers.insert(name, value);
    }

    /// Stashes a pending response body without sending.
    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.response.body = body.into();
    }

    /// Sends a response.
    ///
    /// The first send wins; later calls are ignored so a finalizer cannot
    /// clobber what a handler already produced.
    pub fn send(&mut self, status: StatusCode, body: impl Into<Bytes>) {
        if self.response.sent {
            tracing::debug!(request_id = %self.request_id, "response already sent, ignoring");
            return;
        }
        self.response.status = status;
        self.response.body = body.into();
        self.response.sent = true;
    }

    /// Serializes `value` as JSON and sends it.
    pub fn send_json<T: Serialize>(&mut self, status: StatusCode, value: &T) -> Result<(), Error> {
        let body = serde_json::to_vec(value)
            .map_err(|e| Error::internal(format!("response encoding failed: {e}")))?;
        self.set_header(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/json"),
        );
        self.send(status, body);
        Ok(())
    }

    /// Flushes the pending status/body pair if nothing has been sent yet.
    pub fn send_pending(&mut self) {
        if !self.response.sent {
            let status = self.response.status;
            let body = std::mem::take(&mut self.response.body);
            self.send(status, body);
        }
    }

    /// Returns `true` once a response has been sent.
    #[must_use]
    pub fn response_sent(&self) -> bool {
        self.response.sent
    }

    /// Consumes the accumulated response, if one was sent.
    #[must_use]
    pub fn take_response(&mut self) -> Option<Response> {
        if !self.response.sent {
            return None;
        }
        self.response.sent = false;

        let mut response = http::Response::new(Full::new(std::mem::take(&mut self.response.body)));
        *response.status_mut() = self.response.status;
        *response.headers_mut() = std::mem::take(&mut self.response.headers);
        Some(response)
    }

    /// Returns the elapsed time since the context was created.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.request_id)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("route_name", &self.route_name)
            .field("body_consumed", &self.body_consumed())
            .field("response_sent", &self.response.sent)
            .finish_non_exhaustive()
    }
}
