//! Registered routes.

use std::sync::Arc;

use http::Method;
use trellis_core::Handler;
use trellis_middleware::{Chain, Middleware};

use crate::path_var::PathVar;
use crate::template::Template;

/// A registered route.
///
/// Everything but the route-local middleware chain is fixed at
/// registration. Middleware can be appended with [`Route::with`] until the
/// router is sealed.
#[derive(Debug)]
pub struct Route {
    pub(crate) name: Arc<str>,
    pub(crate) method: Method,
    pub(crate) template: Template,
    pub(crate) handler: Handler,
    pub(crate) middleware: Chain,
}

impl Route {
    pub(crate) fn new(
        name: &str,
        method: Method,
        template: Template,
        handler: Handler,
        middleware: Chain,
    ) -> Self {
        Self {
            name: Arc::from(name),
            method,
            template,
            handler,
            middleware,
        }
    }

    /// Appends route-local middleware.
    ///
    /// Route middleware runs inside every global middleware, in the order
    /// it was added.
    ///
    /// # Example
    ///
    /// ```
    /// use http::StatusCode;
    /// use trellis_core::{Handler, Response, ResponseExt};
    /// use trellis_middleware::FnMiddleware;
    /// use trellis_router::Router;
    ///
    /// let mut router = Router::new();
    /// router
    ///     .get("health", "/health", Handler::new(|_ctx| async {
    ///         Ok(Response::empty(StatusCode::OK))
    ///     }))
    ///     .unwrap()
    ///     .with(FnMiddleware::new("audit", |next: Handler| next));
    ///
    /// assert_eq!(router.routes()[0].middleware().names(), vec!["audit"]);
    /// ```
    pub fn with<M: Middleware>(&mut self, middleware: M) -> &mut Self {
        self.middleware.push(middleware);
        self
    }

    /// Returns the route name. Names need not be unique.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the path template as registered.
    #[must_use]
    pub fn path(&self) -> &str {
        self.template.as_str()
    }

    /// Returns the declared path variables.
    #[must_use]
    pub fn path_vars(&self) -> &[PathVar] {
        self.template.vars()
    }

    /// Returns the route-local middleware chain.
    #[must_use]
    pub const fn middleware(&self) -> &Chain {
        &self.middleware
    }
}
