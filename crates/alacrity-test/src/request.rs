//! Request builder for the test client.

use std::sync::Arc;

use bytes::Bytes;
use http::Method;
use http_body_util::Full;
use serde::Serialize;

use alacrity_server::App;

use crate::error::TestError;
use crate::response::TestResponse;

/// A request under construction.
///
/// Built by [`TestClient`](crate::TestClient) verb methods; finished with
/// [`send`](TestRequest::send).
pub struct TestRequest {
    app: Arc<App>,
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl TestRequest {
    pub(crate) fn new(app: Arc<App>, method: Method, path: &str) -> Self {
        Self {
            app,
            method,
            path: path.to_string(),
            query: Vec::new(),
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// Appends a query pair, percent-encoding both halves.
    #[must_use]
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query.push((
            urlencoding::encode(key).into_owned(),
            urlencoding::encode(value).into_owned(),
        ));
        self
    }

    /// Adds a request header.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a JSON body and the matching Content-Type.
    pub fn json<T: Serialize>(self, value: &T) -> Result<Self, TestError> {
        let body = serde_json::to_vec(value)?;
        Ok(self.header("content-type", "application/json").body(body))
    }

    /// Dispatches the request.
    ///
    /// Resolves once the request has been fully processed — this is the
    /// embedding surface for tests that need a completion signal. A handler
    /// chain that deliberately never responds yields
    /// [`TestError::NoResponse`].
    pub async fn send(self) -> Result<TestResponse, TestError> {
        let mut target = self.path.clone();
        for (i, (key, value)) in self.query.iter().enumerate() {
            target.push(if i == 0 && !self.path.contains('?') { '?' } else { '&' });
            target.push_str(key);
            target.push('=');
            target.push_str(value);
        }

        let mut builder = http::Request::builder().method(self.method).uri(&target);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let request = builder
            .body(Full::new(self.body))
            .map_err(|e| TestError::InvalidRequest(e.to_string()))?;

        match self.app.dispatch(request).await {
            Some(response) => Ok(TestResponse::from_response(response).await),
            None => Err(TestError::NoResponse),
        }
    }
}
