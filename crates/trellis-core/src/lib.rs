//! # Trellis Core
//!
//! Core types shared by every Trellis crate:
//!
//! - [`RequestContext`] - Per-request context handed to handlers
//! - [`CancelScope`] - Deadline-bounded cancellation signal for one request
//! - [`Handler`] - Type-erased async request handler
//! - [`HandlerError`] - Per-request error taxonomy with HTTP mapping
//! - [`Params`] / [`PathValues`] - Raw and typed path parameters

#![doc(html_root_url = "https://docs.rs/trellis-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod handler;
mod params;
mod scope;
pub mod types;

pub use context::{RequestContext, RequestId};
pub use error::{ErrorCategory, ErrorDetail, ErrorEnvelope, HandlerError};
pub use handler::{BoxFuture, Handler, HandlerResult};
pub use params::{Params, PathValue, PathValues};
pub use scope::{CancelReason, CancelScope, ScopeGuard, DEFAULT_REQUEST_TIMEOUT};
pub use types::{Request, Response, ResponseExt};
