//! Core middleware trait and types.
//!
//! A [`Middleware`] receives the handler it wraps and returns a new
//! handler. The returned handler may call the wrapped one zero, one or many
//! times and may run logic before and after each call.
//!
//! # Example
//!
//! ```
//! use std::time::Instant;
//! use trellis_core::{Handler, RequestContext};
//! use trellis_middleware::Middleware;
//!
//! struct Timing;
//!
//! impl Middleware for Timing {
//!     fn name(&self) -> &str {
//!         "timing"
//!     }
//!
//!     fn wrap(&self, next: Handler) -> Handler {
//!         Handler::new(move |ctx: RequestContext| {
//!             let next = next.clone();
//!             async move {
//!                 let start = Instant::now();
//!                 let result = next.call(ctx).await;
//!                 tracing::debug!(elapsed_us = start.elapsed().as_micros() as u64, "handled");
//!                 result
//!             }
//!         })
//!     }
//! }
//! ```

use std::sync::Arc;

use trellis_core::Handler;

/// A shareable, type-erased middleware.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// The core middleware trait.
///
/// Wrapping is pure: `wrap` must not depend on per-request state, because
/// the router composes each route's handler once when it is sealed.
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this middleware, used in logs and introspection.
    fn name(&self) -> &str;

    /// Wraps `next`, returning the handler that runs in its place.
    fn wrap(&self, next: Handler) -> Handler;
}

/// A middleware built from a closure.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use trellis_core::{Handler, HandlerError, RequestContext};
/// use trellis_middleware::FnMiddleware;
///
/// let require_auth = FnMiddleware::new("require-auth", |next: Handler| {
///     Handler::new(move |ctx: RequestContext| {
///         let next = next.clone();
///         async move {
///             if ctx.headers().contains_key(http::header::AUTHORIZATION) {
///                 next.call(ctx).await
///             } else {
///                 Err(HandlerError::unauthorized("missing credentials"))
///             }
///         }
///     })
/// });
/// # let _ = require_auth;
/// ```
pub struct FnMiddleware<F> {
    name: String,
    func: F,
}

impl<F> FnMiddleware<F>
where
    F: Fn(Handler) -> Handler + Send + Sync + 'static,
{
    /// Creates a new function-based middleware.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(Handler) -> Handler + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn wrap(&self, next: Handler) -> Handler {
        (self.func)(next)
    }
}

impl<F> std::fmt::Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnMiddleware")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use trellis_core::{HandlerError, RequestContext, Response, ResponseExt};

    fn ok_handler() -> Handler {
        Handler::new(|_ctx| async { Ok(Response::empty(StatusCode::OK)) })
    }

    #[test]
    fn test_fn_middleware_name() {
        let mw = FnMiddleware::new("noop", |next: Handler| next);
        assert_eq!(mw.name(), "noop");
    }

    #[tokio::test]
    async fn test_middleware_can_short_circuit() {
        let deny = FnMiddleware::new("deny", |_next: Handler| {
            Handler::new(|_ctx| async { Err(HandlerError::forbidden("denied")) })
        });

        let handler = deny.wrap(ok_handler());
        let err = handler.call(RequestContext::mock()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_middleware_can_retry() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let attempts = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&attempts);
        let flaky = Handler::new(move |_ctx| {
            let seen = Arc::clone(&seen);
            async move {
                if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(HandlerError::internal("first attempt fails"))
                } else {
                    Ok(Response::empty(StatusCode::OK))
                }
            }
        });

        let retry = FnMiddleware::new("retry", |next: Handler| {
            Handler::new(move |ctx: RequestContext| {
                let next = next.clone();
                async move {
                    match next.call(ctx.clone()).await {
                        Ok(response) => Ok(response),
                        Err(_) => next.call(ctx).await,
                    }
                }
            })
        });

        let response = retry.wrap(flaky).call(RequestContext::mock()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }
}
