//! Type-erased request handlers.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::RequestContext;
use crate::error::HandlerError;
use crate::types::Response;

/// A boxed future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What every handler resolves to.
pub type HandlerResult = Result<Response, HandlerError>;

type HandlerFn = dyn Fn(RequestContext) -> BoxFuture<'static, HandlerResult> + Send + Sync;

/// An async request handler.
///
/// Terminal route handlers, not-found handlers and every middleware layer
/// share this one shape, so wrapping a handler yields another handler.
/// Cloning is cheap.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use trellis_core::{Handler, RequestContext, Response, ResponseExt};
///
/// let hello = Handler::new(|ctx: RequestContext| async move {
///     Ok(Response::text(StatusCode::OK, format!("hello from {}", ctx.path())))
/// });
/// # let _ = hello;
/// ```
#[derive(Clone)]
pub struct Handler {
    inner: Arc<HandlerFn>,
}

impl Handler {
    /// Wraps an async function as a handler.
    pub fn new<F, Fut>(func: F) -> Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self {
            inner: Arc::new(move |ctx| Box::pin(func(ctx))),
        }
    }

    /// Invokes the handler.
    pub fn call(&self, ctx: RequestContext) -> BoxFuture<'static, HandlerResult> {
        (self.inner)(ctx)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResponseExt;
    use http::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_handler_call() {
        let handler = Handler::new(|ctx: RequestContext| async move {
            Ok(Response::text(StatusCode::OK, ctx.path().to_string()))
        });

        let response = handler.call(RequestContext::mock()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_handler_error() {
        let handler =
            Handler::new(|_ctx| async { Err(HandlerError::forbidden("not yours")) });

        let err = handler.call(RequestContext::mock()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_clone_shares_function() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let handler = Handler::new(move |_ctx| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Response::empty(StatusCode::NO_CONTENT))
            }
        });

        let clone = handler.clone();
        handler.call(RequestContext::mock()).await.unwrap();
        clone.call(RequestContext::mock()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
