//! Request context types.
//!
//! The [`RequestContext`] is created by the dispatcher for every request and
//! handed through the middleware chain into the terminal handler. Cloning is
//! cheap: the request head and body are shared, so a middleware may invoke
//! the wrapped handler more than once.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::params::{Params, PathValue, PathValues};
use crate::scope::CancelScope;
use crate::types::Request;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which keeps log lines for one request easy to
/// correlate and sort.
///
/// # Example
///
/// ```
/// use trellis_core::RequestId;
///
/// let id = RequestId::new();
/// assert_eq!(id.to_string().len(), 36);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
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

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

#[derive(Debug)]
struct RequestHead {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
}

/// Per-request context passed to middleware and handlers.
///
/// Carries:
/// - the request id
/// - the request method, URI, headers and collected body
/// - raw and typed path parameters of the matched route
/// - the request's [`CancelScope`]
///
/// # Example
///
/// ```
/// use trellis_core::RequestContext;
///
/// let ctx = RequestContext::mock();
/// assert_eq!(ctx.path(), "/");
/// assert!(!ctx.scope().is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    head: Arc<RequestHead>,
    body: Bytes,
    params: Params,
    path_values: PathValues,
    route_name: Option<Arc<str>>,
    scope: CancelScope,
    started_at: Instant,
}

impl RequestContext {
    /// Creates a context for `request`, bound to `scope`.
    #[must_use]
    pub fn new(request: Request, scope: CancelScope) -> Self {
        let (parts, body) = request.into_parts();
        Self {
            request_id: RequestId::new(),
            head: Arc::new(RequestHead {
                method: parts.method,
                uri: parts.uri,
                headers: parts.headers,
            }),
            body,
            params: Params::new(),
            path_values: PathValues::new(),
            route_name: None,
            scope,
            started_at: Instant::now(),
        }
    }

    /// Creates a context for `GET /` with an unbounded scope, for tests.
    #[must_use]
    pub fn mock() -> Self {
        Self::new(Request::new(Bytes::new()), CancelScope::new())
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.head.method
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.head.uri
    }

    /// Returns the request path as received, still percent-encoded.
    ///
    /// Matching decodes segments; decoded values are available through
    /// [`param`](Self::param).
    #[must_use]
    pub fn path(&self) -> &str {
        self.head.uri.path()
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.head.headers
    }

    /// Returns the collected request body.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Deserializes the request body as JSON.
    ///
    /// # Errors
    ///
    /// Returns a bad request error if the body is not valid JSON for `T`.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, crate::HandlerError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| crate::HandlerError::bad_request(format!("invalid JSON body: {e}")))
    }

    /// Returns the raw path parameters.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }

    /// Returns a raw path parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// Returns the typed path values.
    #[must_use]
    pub const fn path_values(&self) -> &PathValues {
        &self.path_values
    }

    /// Returns a typed path value by name.
    #[must_use]
    pub fn path_value(&self, name: &str) -> Option<&PathValue> {
        self.path_values.get(name)
    }

    /// Returns an `int` path variable by name.
    #[must_use]
    pub fn int_param(&self, name: &str) -> Option<i64> {
        self.path_value(name).and_then(PathValue::as_int)
    }

    /// Returns a `uuid` path variable by name.
    #[must_use]
    pub fn uuid_param(&self, name: &str) -> Option<Uuid> {
        self.path_value(name).and_then(PathValue::as_uuid)
    }

    /// Attaches the parameters extracted by route matching.
    pub fn set_params(&mut self, params: Params, path_values: PathValues) {
        self.params = params;
        self.path_values = path_values;
    }

    /// Returns the name of the matched route, if any.
    #[must_use]
    pub fn route_name(&self) -> Option<&str> {
        self.route_name.as_deref()
    }

    /// Records the name of the matched route.
    pub fn set_route_name(&mut self, name: Arc<str>) {
        self.route_name = Some(name);
    }

    /// Returns the request's cancel scope.
    #[must_use]
    pub const fn scope(&self) -> &CancelScope {
        &self.scope
    }

    /// Returns the elapsed time since the context was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}
