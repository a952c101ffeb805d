//! In-memory client over a sealed dispatch table.

use std::sync::Arc;

use bytes::Bytes;
use http::Method;
use serde::Serialize;
use trellis_router::DispatchTable;

use crate::error::TestError;
use crate::request::TestRequestBuilder;
use crate::response::TestResponse;

/// Sends requests straight into [`DispatchTable::dispatch`].
///
/// No socket is bound; requests run through the full middleware chain,
/// the request deadline and error mapping exactly as the server would run
/// them.
///
/// ```rust
/// use http::StatusCode;
/// use trellis_core::{Handler, RequestContext, Response, ResponseExt};
/// use trellis_router::Router;
/// use trellis_test::TestClient;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut router = Router::new();
/// router
///     .get("ping", "/ping", Handler::new(|_ctx: RequestContext| async {
///         Ok(Response::text(StatusCode::OK, "pong"))
///     }))
///     .unwrap();
///
/// let client = TestClient::new(router.seal());
/// let response = client.get("/ping").send().await;
/// assert_eq!(response.text().unwrap(), "pong");
/// # }
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct TestClient {
    table: Arc<DispatchTable>,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates a client for `table`.
    pub fn new(table: DispatchTable) -> Self {
        Self::from_shared(Arc::new(table))
    }

    /// Creates a client sharing an existing table.
    pub fn from_shared(table: Arc<DispatchTable>) -> Self {
        Self {
            table,
            default_headers: Vec::new(),
        }
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Returns the table under test.
    #[must_use]
    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    /// Starts a `GET` request.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::GET, uri)
    }

    /// Starts a `POST` request.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::POST, uri)
    }

    /// Starts a `PUT` request.
    pub fn put(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PUT, uri)
    }

    /// Starts a `PATCH` request.
    pub fn patch(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PATCH, uri)
    }

    /// Starts a `DELETE` request.
    pub fn delete(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::DELETE, uri)
    }

    /// Starts a request with any method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        let builder = self
            .default_headers
            .iter()
            .fold(TestRequestBuilder::new(method, uri), |builder, (name, value)| {
                builder.header(name, value)
            });
        TestClientRequest {
            client: self,
            builder,
        }
    }
}

/// A request bound to a [`TestClient`].
#[derive(Debug)]
#[must_use]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl TestClientRequest<'_> {
    /// Sets a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets the raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets a JSON body.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Dispatches the request.
    ///
    /// # Panics
    ///
    /// Panics if the request could not be built.
    pub async fn send(self) -> TestResponse {
        match self.try_send().await {
            Ok(response) => response,
            Err(e) => panic!("test request failed: {e}"),
        }
    }

    /// Dispatches the request, returning build errors.
    ///
    /// # Errors
    ///
    /// Returns a [`TestError`] if the request could not be built or the
    /// response body could not be read.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?;
        let response = self.client.table.dispatch(request).await;
        TestResponse::from_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use trellis_core::{Handler, RequestContext, Response, ResponseExt};
    use trellis_router::{Router, REQUEST_ID_HEADER};

    fn echo_method() -> Handler {
        Handler::new(|ctx: RequestContext| async move {
            Ok(Response::text(StatusCode::OK, ctx.method().as_str()))
        })
    }

    fn client() -> TestClient {
        let mut router = Router::new();
        router.get("get", "/echo", echo_method()).unwrap();
        router.post("post", "/echo", echo_method()).unwrap();
        router.put("put", "/echo", echo_method()).unwrap();
        router.patch("patch", "/echo", echo_method()).unwrap();
        router.delete("delete", "/echo", echo_method()).unwrap();
        router
            .get(
                "header",
                "/header",
                Handler::new(|ctx: RequestContext| async move {
                    let value = ctx
                        .headers()
                        .get("x-tenant")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("none")
                        .to_string();
                    Ok(Response::text(StatusCode::OK, value))
                }),
            )
            .unwrap();
        TestClient::new(router.seal())
    }

    #[tokio::test]
    async fn test_all_verbs() {
        let client = client();

        assert_eq!(client.get("/echo").send().await.text().unwrap(), "GET");
        assert_eq!(client.post("/echo").send().await.text().unwrap(), "POST");
        assert_eq!(client.put("/echo").send().await.text().unwrap(), "PUT");
        assert_eq!(client.patch("/echo").send().await.text().unwrap(), "PATCH");
        assert_eq!(client.delete("/echo").send().await.text().unwrap(), "DELETE");
    }

    #[tokio::test]
    async fn test_default_and_request_headers() {
        let client = client().with_default_header("x-tenant", "default");

        let response = client.get("/header").send().await;
        assert_eq!(response.text().unwrap(), "default");

        let response = client.get("/header").header("x-tenant", "acme").send().await;
        assert_eq!(response.text().unwrap(), "acme");
    }

    #[tokio::test]
    async fn test_not_found_carries_request_id() {
        let response = client().get("/missing").send().await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert!(response.header(REQUEST_ID_HEADER.as_str()).is_some());
    }

    #[tokio::test]
    async fn test_try_send_reports_build_errors() {
        let result = client().get("/echo").header("bad header", "x").try_send().await;
        assert!(matches!(result, Err(TestError::InvalidHeader(_))));
    }
}
