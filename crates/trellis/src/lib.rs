//! # Trellis
//!
//! A minimal HTTP router: routes are matched by method and path template,
//! wrapped in router-wide then route-local middleware, and run against a
//! request context bounded by a per-request deadline.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use trellis::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new()
//!         .with_optional_file("trellis.toml")?
//!         .with_env_prefix("TRELLIS")
//!         .load()?;
//!
//!     let mut app = trellis::bootstrap(&config)?;
//!     app.get("get-user", "/users/{id:int}", Handler::new(|ctx: RequestContext| async move {
//!         let id = ctx.int_param("id").unwrap_or_default();
//!         Ok(Response::text(StatusCode::OK, format!("user {id}")))
//!     }))?;
//!
//!     app.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Request flow
//!
//! ```text
//! dispatch → match route → global middleware → route middleware → handler
//!         ↘ no match     → global middleware → not-found handler
//! ```

#![doc(html_root_url = "https://docs.rs/trellis/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use trellis_config as config;
pub use trellis_core as core;
pub use trellis_middleware as middleware;
pub use trellis_router as router;
pub use trellis_server as server;
pub use trellis_telemetry as telemetry;

use trellis_config::TrellisConfig;
use trellis_server::{App, ServerConfig};
use trellis_telemetry::{RequestMetrics, TelemetryError};

/// Builds an [`App`] from loaded configuration without touching global
/// state.
///
/// Request metrics middleware is installed when metrics are enabled.
#[must_use]
pub fn configure(config: &TrellisConfig) -> App {
    let mut app = App::with_config(ServerConfig::from(config));
    if config.metrics.enabled {
        app.use_middleware(RequestMetrics);
    }
    app
}

/// Initializes logging and metrics, then calls [`configure`].
///
/// # Errors
///
/// Returns an error if a subscriber or recorder is already installed or the
/// metrics address is invalid.
pub fn bootstrap(config: &TrellisConfig) -> Result<App, TelemetryError> {
    trellis_telemetry::init_telemetry(&config.telemetry())?;
    Ok(configure(config))
}

/// Common imports.
///
/// ```rust
/// use trellis::prelude::*;
/// ```
pub mod prelude {
    pub use http::{Method, StatusCode};

    pub use trellis_config::{ConfigLoader, TrellisConfig};
    pub use trellis_core::{
        CancelScope, Handler, HandlerError, HandlerResult, PathValue, Request, RequestContext,
        Response, ResponseExt,
    };
    pub use trellis_middleware::{Chain, FnMiddleware, Middleware};
    pub use trellis_router::{DispatchTable, Route, RouteError, Router};
    pub use trellis_server::{App, ServerConfig, ShutdownSignal};
    pub use trellis_telemetry::RequestMetrics;
}
