//! The in-memory test client.

use std::sync::Arc;

use http::Method;

use alacrity_server::App;

use crate::request::TestRequest;

/// Dispatches requests straight into an [`App`], no sockets involved.
///
/// # Example
///
/// ```rust,ignore
/// use alacrity_server::App;
/// use alacrity_test::TestClient;
/// use http::StatusCode;
///
/// let mut app = App::new();
/// // ... register routes ...
/// let client = TestClient::new(app);
///
/// let response = client.get("/users/42").send().await?;
/// response.assert_status(StatusCode::OK);
/// ```
pub struct TestClient {
    app: Arc<App>,
}

impl TestClient {
    /// Wraps a configured app.
    #[must_use]
    pub fn new(app: App) -> Self {
        Self { app: Arc::new(app) }
    }

    /// Wraps an app that is already shared.
    #[must_use]
    pub fn from_arc(app: Arc<App>) -> Self {
        Self { app }
    }

    /// Starts a request with an arbitrary method.
    #[must_use]
    pub fn request(&self, method: Method, path: &str) -> TestRequest {
        TestRequest::new(Arc::clone(&self.app), method, path)
    }

    /// Starts a GET request.
    #[must_use]
    pub fn get(&self, path: &str) -> TestRequest {
        self.request(Method::GET, path)
    }

    /// Starts a POST request.
    #[must_use]
    pub fn post(&self, path: &str) -> TestRequest {
        self.request(Method::POST, path)
    }

    /// Starts a PUT request.
    #[must_use]
    pub fn put(&self, path: &str) -> TestRequest {
        self.request(Method::PUT, path)
    }

    /// Starts a DELETE request.
    #[must_use]
    pub fn delete(&self, path: &str) -> TestRequest {
        self.request(Method::DELETE, path)
    }
}
