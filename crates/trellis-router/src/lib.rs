//! # Trellis Router
//!
//! Route registration and request dispatch.
//!
//! - [`parse_path_vars`] parses `{name:type}` declarations in a template
//! - [`Router`] is the append-only registry used during startup
//! - [`DispatchTable`] is the sealed registry that serves requests
//!
//! A route matches a request when the methods are equal and the path
//! either equals the template string or fits the template segment by
//! segment, with every variable parsing as its declared type. Routes are
//! tried in registration order and the first match wins.
//!
//! ## Example
//!
//! ```rust
//! use bytes::Bytes;
//! use http::{Method, StatusCode};
//! use trellis_core::{Handler, RequestContext, Response, ResponseExt};
//! use trellis_router::Router;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), trellis_router::RouteError> {
//! let mut router = Router::new();
//! router.get("hello", "/hello/{name:string}", Handler::new(|ctx: RequestContext| async move {
//!     let name = ctx.param("name").unwrap_or("world").to_string();
//!     Ok(Response::text(StatusCode::OK, format!("hello, {name}")))
//! }))?;
//!
//! let table = router.seal();
//! let request = http::Request::builder()
//!     .method(Method::GET)
//!     .uri("/hello/ada")
//!     .body(Bytes::new())
//!     .unwrap();
//! let response = table.dispatch(request).await;
//! assert_eq!(response.status(), StatusCode::OK);
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/trellis-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod dispatch;
mod error;
mod path_var;
mod route;
mod router;
mod template;

pub use dispatch::{DispatchTable, MatchedRoute, REQUEST_ID_HEADER};
pub use error::RouteError;
pub use path_var::{parse_path_vars, PathVar, PathVarType, UnknownPathVarType};
pub use route::Route;
pub use router::Router;
pub use template::Template;
