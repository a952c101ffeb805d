//! Request dispatch.
//!
//! Per request:
//!
//! ```text
//! Received ─▶ Matching ─┬─▶ Matched ─▶ Executing ─────────▶ Done
//!                       └─▶ Unmatched ─▶ NotFoundHandling ─▶ Done
//! ```
//!
//! Every request runs inside a [`CancelScope`] whose deadline is the
//! table's request timeout, counted from dispatch or from the instant given
//! to [`DispatchTable::dispatch_at`]. The scope is closed as soon as the
//! handler returns.

use std::sync::Arc;
use std::time::Duration;

use http::header::{HeaderName, HeaderValue};
use http::Method;
use tokio::time::Instant;
use tracing::Instrument;
use trellis_core::{
    CancelScope, Handler, HandlerError, HandlerResult, Params, PathValues, Request,
    RequestContext, RequestId, Response,
};

use crate::template::Template;

/// Response header carrying the request id.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

#[derive(Debug)]
pub(crate) struct SealedRoute {
    pub(crate) name: Arc<str>,
    pub(crate) method: Method,
    pub(crate) template: Template,
    pub(crate) handler: Handler,
}

/// The route a request resolved to.
///
/// Borrowed from the [`DispatchTable`]; lives for one request.
#[derive(Debug)]
pub struct MatchedRoute<'a> {
    route: &'a SealedRoute,
    params: Params,
    path_values: PathValues,
}

impl<'a> MatchedRoute<'a> {
    /// Returns the route name.
    #[must_use]
    pub fn name(&self) -> &'a str {
        &self.route.name
    }

    /// Returns the path template of the route.
    #[must_use]
    pub fn path(&self) -> &'a str {
        self.route.template.as_str()
    }

    /// Returns the route method.
    #[must_use]
    pub fn method(&self) -> &'a Method {
        &self.route.method
    }

    /// Returns the fully composed handler.
    #[must_use]
    pub fn handler(&self) -> &'a Handler {
        &self.route.handler
    }

    /// Returns the raw path parameters.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }

    /// Returns the typed path values.
    #[must_use]
    pub const fn path_values(&self) -> &PathValues {
        &self.path_values
    }
}

/// A sealed, immutable router.
///
/// Produced by [`Router::seal`](crate::Router::seal). It is `Send + Sync`
/// and is shared across connection tasks behind an `Arc`.
#[derive(Debug)]
pub struct DispatchTable {
    routes: Vec<SealedRoute>,
    not_found: Handler,
    request_timeout: Duration,
}

impl DispatchTable {
    pub(crate) fn new(
        routes: Vec<SealedRoute>,
        not_found: Handler,
        request_timeout: Duration,
    ) -> Self {
        Self {
            routes,
            not_found,
            request_timeout,
        }
    }

    /// Finds the first route matching `method` and `path`.
    ///
    /// Routes are scanned in registration order.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<MatchedRoute<'_>> {
        self.routes
            .iter()
            .filter(|route| &route.method == method)
            .find_map(|route| {
                route
                    .template
                    .matches(path)
                    .map(|(params, path_values)| MatchedRoute {
                        route,
                        params,
                        path_values,
                    })
            })
    }

    /// Runs a request and returns the handler's result.
    ///
    /// Unmatched requests go to the not-found handler.
    ///
    /// # Errors
    ///
    /// Returns the error reported by the handler or its middleware.
    pub async fn handle(&self, request: Request) -> HandlerResult {
        self.execute(request, self.deadline_from_now()).await.1
    }

    /// Runs a request and always produces a response.
    ///
    /// Handler errors are rendered through [`HandlerError::into_response`].
    /// Every response carries the `x-request-id` header.
    pub async fn dispatch(&self, request: Request) -> Response {
        self.dispatch_at(request, self.deadline_from_now()).await
    }

    /// Like [`dispatch`](Self::dispatch), with the deadline already fixed.
    ///
    /// Transports that spend part of the request timeout before dispatch,
    /// such as reading the body, pass the deadline taken on arrival.
    pub async fn dispatch_at(&self, request: Request, deadline: Instant) -> Response {
        let (request_id, result) = self.execute(request, deadline).await;
        let request_id = request_id.to_string();

        let mut response = match result {
            Ok(response) => response,
            Err(err) => err.into_response(Some(&request_id)),
        };
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }

    /// Returns the deadline for a request arriving now.
    #[must_use]
    pub fn deadline_from_now(&self) -> Instant {
        Instant::now() + self.request_timeout
    }

    async fn execute(&self, request: Request, deadline: Instant) -> (RequestId, HandlerResult) {
        let (scope, guard) = CancelScope::with_deadline(deadline);
        let mut ctx = RequestContext::new(request, scope);
        let request_id = ctx.request_id();

        let span = tracing::info_span!(
            "request",
            request_id = %request_id,
            http.method = %ctx.method(),
            http.path = %ctx.path(),
            route = tracing::field::Empty,
        );

        let handler = match self.match_route(ctx.method(), ctx.path()) {
            Some(matched) => {
                span.record("route", matched.name());
                tracing::debug!(parent: &span, route = matched.name(), "route matched");
                ctx.set_route_name(Arc::clone(&matched.route.name));
                let handler = matched.route.handler.clone();
                ctx.set_params(matched.params, matched.path_values);
                handler
            }
            None => {
                tracing::debug!(parent: &span, "no route matched");
                self.not_found.clone()
            }
        };

        let result = handler.call(ctx).instrument(span.clone()).await;
        let timed_out = guard.scope().timed_out();
        drop(guard);

        let _entered = span.enter();
        match &result {
            Ok(response) => {
                tracing::debug!(status = response.status().as_u16(), "request completed");
            }
            Err(err) if err.is_timeout() => {
                tracing::warn!(error = %err, "request timed out");
            }
            Err(err @ HandlerError::Internal { .. }) => {
                tracing::error!(error = %err, timed_out, "handler failed");
            }
            Err(err) => {
                tracing::debug!(
                    error = %err,
                    status = err.status_code().as_u16(),
                    "handler rejected request"
                );
            }
        }

        (request_id, result)
    }

    /// Returns the per-request deadline.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns the number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if the table has no routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterates `(name, method, path)` for every route in order.
    pub fn routes(&self) -> impl Iterator<Item = (&str, &Method, &str)> {
        self.routes
            .iter()
            .map(|route| (&*route.name, &route.method, route.template.as_str()))
    }
}
