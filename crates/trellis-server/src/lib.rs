//! # Trellis Server
//!
//! HTTP/1.1 transport for the Trellis router.
//!
//! - [`App`] - registration conveniences over a [`Router`](trellis_router::Router)
//! - [`Server`] - hyper accept loop over a sealed dispatch table
//! - [`ShutdownSignal`] / [`ConnectionTracker`] - graceful shutdown
//!
//! ## Example
//!
//! ```rust,no_run
//! use trellis_core::{Handler, RequestContext, Response, ResponseExt};
//! use trellis_server::{App, ServerConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::builder().http_addr("127.0.0.1:8080").build();
//! let mut app = App::with_config(config);
//!
//! app.get("get-user", "/users/{id:int}", Handler::new(|ctx: RequestContext| async move {
//!     let id = ctx.int_param("id").unwrap_or_default();
//!     Ok(Response::text(http::StatusCode::OK, format!("user {id}")))
//! }))?;
//!
//! app.run().await?;
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/trellis-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
mod config;
mod error;
mod server;
pub mod shutdown;

pub use app::App;
pub use config::{
    ServerConfig, ServerConfigBuilder, DEFAULT_HTTP_ADDR, DEFAULT_SHUTDOWN_TIMEOUT_SECS,
};
pub use error::ServerError;
pub use server::{bind, Server};
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownSignal};
