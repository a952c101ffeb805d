//! Application builder.

use http::Method;
use tokio::net::TcpListener;
use trellis_core::Handler;
use trellis_middleware::{Chain, Middleware};
use trellis_router::{DispatchTable, Route, RouteError, Router};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::server::Server;
use crate::shutdown::ShutdownSignal;

/// A router plus the settings to serve it.
///
/// Routes and middleware are registered on the app; `run` seals the router
/// with the configured request timeout and serves it.
///
/// ```rust,no_run
/// use trellis_core::{Handler, Response, ResponseExt, RequestContext};
/// use trellis_server::App;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut app = App::new();
/// app.get("health", "/health", Handler::new(|_ctx: RequestContext| async {
///     Ok(Response::text(http::StatusCode::OK, "ok"))
/// }))?;
///
/// app.run().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct App {
    router: Router,
    config: ServerConfig,
}

impl App {
    /// Creates an app with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an app with the given settings.
    #[must_use]
    pub fn with_config(config: ServerConfig) -> Self {
        Self {
            router: Router::new(),
            config,
        }
    }

    /// Returns the settings.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the router being built.
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Returns the router being built, mutably.
    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    /// See [`Router::register`].
    pub fn register(
        &mut self,
        name: &str,
        method: Method,
        path: &str,
        handler: Handler,
        middleware: Chain,
    ) -> Result<&mut Route, RouteError> {
        self.router.register(name, method, path, handler, middleware)
    }

    /// Registers a `GET` route.
    pub fn get(
        &mut self,
        name: &str,
        path: &str,
        handler: Handler,
    ) -> Result<&mut Route, RouteError> {
        self.router.get(name, path, handler)
    }

    /// Registers a `POST` route.
    pub fn post(
        &mut self,
        name: &str,
        path: &str,
        handler: Handler,
    ) -> Result<&mut Route, RouteError> {
        self.router.post(name, path, handler)
    }

    /// Registers a `PUT` route.
    pub fn put(
        &mut self,
        name: &str,
        path: &str,
        handler: Handler,
    ) -> Result<&mut Route, RouteError> {
        self.router.put(name, path, handler)
    }

    /// Registers a `PATCH` route.
    pub fn patch(
        &mut self,
        name: &str,
        path: &str,
        handler: Handler,
    ) -> Result<&mut Route, RouteError> {
        self.router.patch(name, path, handler)
    }

    /// Registers a `DELETE` route.
    pub fn delete(
        &mut self,
        name: &str,
        path: &str,
        handler: Handler,
    ) -> Result<&mut Route, RouteError> {
        self.router.delete(name, path, handler)
    }

    /// Appends router-wide middleware.
    pub fn use_middleware<M: Middleware>(&mut self, middleware: M) -> &mut Self {
        self.router.use_middleware(middleware);
        self
    }

    /// Replaces the not-found handler.
    pub fn not_found(&mut self, handler: Handler) -> &mut Self {
        self.router.not_found(handler);
        self
    }

    /// Seals the router with the configured request timeout.
    #[must_use]
    pub fn into_table(self) -> DispatchTable {
        self.into_parts().1
    }

    /// Serves until SIGTERM or SIGINT.
    ///
    /// # Errors
    ///
    /// Returns an error if the bind address is invalid or unavailable.
    pub async fn run(self) -> Result<(), ServerError> {
        self.into_server().run().await
    }

    /// Serves until `shutdown` fires.
    ///
    /// # Errors
    ///
    /// Returns an error if the bind address is invalid or unavailable.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        self.into_server().run_with_shutdown(shutdown).await
    }

    /// Serves on an existing listener until `shutdown` fires.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener's address is unavailable.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), ServerError> {
        self.into_server().serve(listener, shutdown).await
    }

    fn into_server(self) -> Server {
        let (config, table) = self.into_parts();
        Server::new(config, table)
    }

    fn into_parts(self) -> (ServerConfig, DispatchTable) {
        let table = self
            .router
            .with_request_timeout(self.config.request_timeout())
            .seal();
        (self.config, table)
    }
}
