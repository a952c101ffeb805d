//! The route registry.
//!
//! [`Router`] is the mutable registration phase. Routes are appended in
//! order and never removed. [`Router::seal`] turns the registry into an
//! immutable [`DispatchTable`] that serves requests.

use std::time::Duration;

use http::Method;
use trellis_core::{Handler, HandlerError, DEFAULT_REQUEST_TIMEOUT};
use trellis_middleware::{compose, Chain, Middleware};

use crate::dispatch::{DispatchTable, SealedRoute};
use crate::error::RouteError;
use crate::route::Route;
use crate::template::Template;

/// Builder for a [`DispatchTable`].
///
/// # Example
///
/// ```rust
/// use http::{Method, StatusCode};
/// use trellis_core::{Handler, RequestContext, Response, ResponseExt};
/// use trellis_router::Router;
///
/// # fn main() -> Result<(), trellis_router::RouteError> {
/// let mut router = Router::new();
/// router.get("get-user", "/users/{id:int}", Handler::new(|ctx: RequestContext| async move {
///     let id = ctx.int_param("id").unwrap_or_default();
///     Ok(Response::text(StatusCode::OK, format!("user {id}")))
/// }))?;
///
/// let table = router.seal();
/// assert!(table.match_route(&Method::GET, "/users/7").is_some());
/// assert!(table.match_route(&Method::GET, "/users/seven").is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Router {
    routes: Vec<Route>,
    middleware: Chain,
    not_found: Handler,
    request_timeout: Duration,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Creates an empty router with the default not-found handler and the
    /// default 60 second request timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            middleware: Chain::new(),
            not_found: default_not_found(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Sets the per-request deadline.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the per-request deadline in place.
    pub fn set_request_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.request_timeout = timeout;
        self
    }

    /// Registers a route.
    ///
    /// The template is parsed up front. On success the route is appended
    /// and returned so more middleware can be attached with
    /// [`Route::with`].
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] if the template is malformed. Callers
    /// should treat it as fatal and abort startup.
    pub fn register(
        &mut self,
        name: &str,
        method: Method,
        path: &str,
        handler: Handler,
        middleware: Chain,
    ) -> Result<&mut Route, RouteError> {
        let template = Template::parse(path)?;
        tracing::debug!(
            route = name,
            method = %method,
            path,
            vars = template.vars().len(),
            "registered route"
        );

        let index = self.routes.len();
        self.routes
            .push(Route::new(name, method, template, handler, middleware));
        Ok(&mut self.routes[index])
    }

    /// Registers a `GET` route.
    pub fn get(
        &mut self,
        name: &str,
        path: &str,
        handler: Handler,
    ) -> Result<&mut Route, RouteError> {
        self.register(name, Method::GET, path, handler, Chain::new())
    }

    /// Registers a `POST` route.
    pub fn post(
        &mut self,
        name: &str,
        path: &str,
        handler: Handler,
    ) -> Result<&mut Route, RouteError> {
        self.register(name, Method::POST, path, handler, Chain::new())
    }

    /// Registers a `PUT` route.
    pub fn put(
        &mut self,
        name: &str,
        path: &str,
        handler: Handler,
    ) -> Result<&mut Route, RouteError> {
        self.register(name, Method::PUT, path, handler, Chain::new())
    }

    /// Registers a `PATCH` route.
    pub fn patch(
        &mut self,
        name: &str,
        path: &str,
        handler: Handler,
    ) -> Result<&mut Route, RouteError> {
        self.register(name, Method::PATCH, path, handler, Chain::new())
    }

    /// Registers a `DELETE` route.
    pub fn delete(
        &mut self,
        name: &str,
        path: &str,
        handler: Handler,
    ) -> Result<&mut Route, RouteError> {
        self.register(name, Method::DELETE, path, handler, Chain::new())
    }

    /// Appends router-wide middleware.
    ///
    /// Global middleware wraps every route and the not-found handler. The
    /// first one added is the outermost layer.
    pub fn use_middleware<M: Middleware>(&mut self, middleware: M) -> &mut Self {
        self.middleware.push(middleware);
        self
    }

    /// Replaces the not-found handler.
    pub fn not_found(&mut self, handler: Handler) -> &mut Self {
        self.not_found = handler;
        self
    }

    /// Returns the registered routes in registration order.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Returns the first route registered under `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.name() == name)
    }

    /// Returns the router-wide middleware chain.
    #[must_use]
    pub const fn middleware(&self) -> &Chain {
        &self.middleware
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no route is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Ends the registration phase.
    ///
    /// Every route handler is composed with the global and route-local
    /// chains here, once. The not-found handler is wrapped by the global
    /// chain only.
    #[must_use]
    pub fn seal(self) -> DispatchTable {
        let Self {
            routes,
            middleware,
            not_found,
            request_timeout,
        } = self;

        let routes: Vec<SealedRoute> = routes
            .into_iter()
            .map(|route| SealedRoute {
                handler: compose(route.handler, &middleware, &route.middleware),
                name: route.name,
                method: route.method,
                template: route.template,
            })
            .collect();
        let not_found = compose(not_found, &middleware, &Chain::new());

        tracing::info!(
            routes = routes.len(),
            middleware = ?middleware.names(),
            timeout_secs = request_timeout.as_secs_f64(),
            "router sealed"
        );

        DispatchTable::new(routes, not_found, request_timeout)
    }
}

fn default_not_found() -> Handler {
    Handler::new(|ctx| async move {
        let error =
            HandlerError::not_found(format!("no route for {} {}", ctx.method(), ctx.path()));
        Ok(error.into_response(Some(&ctx.request_id().to_string())))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use trellis_core::{Response, ResponseExt};
    use trellis_middleware::FnMiddleware;

    fn ok() -> Handler {
        Handler::new(|_ctx| async { Ok(Response::empty(StatusCode::OK)) })
    }

    #[test]
    fn test_register_appends_in_order() {
        let mut router = Router::new();
        router.get("a", "/a", ok()).unwrap();
        router.post("b", "/b", ok()).unwrap();
        router.delete("c", "/c/{id:int}", ok()).unwrap();

        let names: Vec<_> = router.routes().iter().map(Route::name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(router.len(), 3);
        assert_eq!(router.routes()[2].path_vars().len(), 1);
    }

    #[test]
    fn test_verbs_map_to_methods() {
        let mut router = Router::new();
        router.get("g", "/", ok()).unwrap();
        router.post("p", "/", ok()).unwrap();
        router.put("u", "/", ok()).unwrap();
        router.patch("pa", "/", ok()).unwrap();
        router.delete("d", "/", ok()).unwrap();

        let methods: Vec<_> = router.routes().iter().map(|r| r.method().clone()).collect();
        assert_eq!(
            methods,
            vec![Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE]
        );
    }

    #[test]
    fn test_register_rejects_malformed_template() {
        let mut router = Router::new();
        let err = router.get("bad", "/users/{id:flot}", ok()).unwrap_err();
        assert!(matches!(err, RouteError::InvalidType { .. }));
        assert!(router.is_empty());
    }

    #[test]
    fn test_with_appends_route_middleware() {
        let mut router = Router::new();
        router
            .get("a", "/a", ok())
            .unwrap()
            .with(FnMiddleware::new("first", |next: Handler| next))
            .with(FnMiddleware::new("second", |next: Handler| next));

        assert_eq!(router.routes()[0].middleware().names(), vec!["first", "second"]);
    }

    #[test]
    fn test_register_with_initial_middleware() {
        let mut chain = Chain::new();
        chain.push(FnMiddleware::new("auth", |next: Handler| next));

        let mut router = Router::new();
        router
            .register("r", Method::GET, "/r", ok(), chain)
            .unwrap()
            .with(FnMiddleware::new("audit", |next: Handler| next));

        assert_eq!(router.routes()[0].middleware().names(), vec!["auth", "audit"]);
    }

    #[test]
    fn test_find_returns_first_by_name() {
        let mut router = Router::new();
        router.get("dup", "/one", ok()).unwrap();
        router.get("dup", "/two", ok()).unwrap();

        assert_eq!(router.find("dup").unwrap().path(), "/one");
        assert!(router.find("missing").is_none());
    }

    #[test]
    fn test_use_middleware_keeps_order() {
        let mut router = Router::new();
        router
            .use_middleware(FnMiddleware::new("a", |next: Handler| next))
            .use_middleware(FnMiddleware::new("b", |next: Handler| next));
        assert_eq!(router.middleware().names(), vec!["a", "b"]);
    }

    #[test]
    fn test_request_timeout() {
        let router = Router::new();
        assert_eq!(router.request_timeout, DEFAULT_REQUEST_TIMEOUT);

        let router = Router::new().with_request_timeout(Duration::from_secs(5));
        assert_eq!(router.seal().request_timeout(), Duration::from_secs(5));
    }
}
