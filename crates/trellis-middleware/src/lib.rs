//! # Trellis Middleware
//!
//! Middleware in Trellis is a transformation from one [`Handler`] to
//! another. Two ordered chains exist for every dispatched request:
//!
//! - the **global** chain, owned by the router, and
//! - the **local** chain, owned by the matched route.
//!
//! [`compose`] layers both around the terminal handler so that the first
//! registered global middleware is the outermost layer:
//!
//! ```text
//! global [A, B]  local [C, D]
//!
//! A ─▶ B ─▶ C ─▶ D ─▶ handler
//! A ◀─ B ◀─ C ◀─ D ◀──────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use http::StatusCode;
//! use trellis_core::{Handler, Response, ResponseExt};
//! use trellis_middleware::{compose, Chain, FnMiddleware};
//!
//! let mut global = Chain::new();
//! global.push(FnMiddleware::new("passthrough", |next: Handler| next));
//!
//! let terminal = Handler::new(|_ctx| async { Ok(Response::empty(StatusCode::OK)) });
//! let handler = compose(terminal, &global, &Chain::new());
//! # let _ = handler;
//! ```
//!
//! [`Handler`]: trellis_core::Handler

#![doc(html_root_url = "https://docs.rs/trellis-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod chain;
pub mod compose;
pub mod middleware;

pub use chain::Chain;
pub use compose::compose;
pub use middleware::{BoxedMiddleware, FnMiddleware, Middleware};
