//! HTTP/1.1 transport over a sealed dispatch table.
//!
//! Each accepted connection is served by hyper on its own task. Request
//! bodies are collected to `Bytes` and handed to
//! [`DispatchTable::dispatch_at`], which owns routing and error mapping.
//! The request deadline is taken when the request head arrives, so body
//! upload counts against it.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use trellis_core::{HandlerError, Request, Response};
use trellis_router::DispatchTable;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Serves a [`DispatchTable`] over TCP.
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    table: Arc<DispatchTable>,
}

impl Server {
    /// Creates a server for an already sealed table.
    #[must_use]
    pub fn new(config: ServerConfig, table: DispatchTable) -> Self {
        Self {
            config,
            table: Arc::new(table),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the dispatch table.
    #[must_use]
    pub fn table(&self) -> &Arc<DispatchTable> {
        &self.table
    }

    /// Binds the configured address and serves until SIGTERM or SIGINT.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(ShutdownSignal::with_os_signals())
            .await
    }

    /// Binds the configured address and serves until `shutdown` fires.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self
            .config
            .socket_addr()
            .map_err(|e| ServerError::InvalidAddress {
                addr: self.config.http_addr().to_string(),
                reason: e.to_string(),
            })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        self.serve(listener, shutdown).await
    }

    /// Serves connections from `listener` until `shutdown` fires, then
    /// waits up to the shutdown timeout for open connections.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener's local address is unavailable.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), ServerError> {
        let local_addr = listener.local_addr()?;
        tracing::info!(
            addr = %local_addr,
            routes = self.table.len(),
            request_timeout = ?self.table.request_timeout(),
            "server listening"
        );

        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote_addr)) => {
                        let table = Arc::clone(&self.table);
                        let token = tracker.acquire();
                        let shutdown = shutdown.clone();

                        tokio::spawn(async move {
                            if let Err(e) = serve_connection(table, stream, shutdown).await {
                                tracing::debug!(%remote_addr, error = %e, "connection error");
                            }
                            drop(token);
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to accept connection");
                    }
                },
                () = shutdown.recv() => {
                    tracing::info!("shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }

        let timeout = self.config.shutdown_timeout();
        tracing::info!(
            open = tracker.active_connections(),
            ?timeout,
            "waiting for connections to close"
        );

        if tokio::time::timeout(timeout, tracker.wait_idle())
            .await
            .is_err()
        {
            tracing::warn!(
                open = tracker.active_connections(),
                "shutdown timeout reached with connections still open"
            );
        }

        tracing::info!("server stopped");
        Ok(())
    }
}

async fn serve_connection(
    table: Arc<DispatchTable>,
    stream: TcpStream,
    shutdown: ShutdownSignal,
) -> Result<(), hyper::Error> {
    let io = TokioIo::new(stream);
    let service = service_fn(move |req: http::Request<Incoming>| {
        let table = Arc::clone(&table);
        async move { Ok::<_, Infallible>(handle_request(&table, req).await) }
    });

    let conn = http1::Builder::new().serve_connection(io, service);
    tokio::pin!(conn);

    tokio::select! {
        result = conn.as_mut() => result,
        () = shutdown.recv() => {
            conn.as_mut().graceful_shutdown();
            conn.await
        }
    }
}

async fn handle_request(table: &DispatchTable, req: http::Request<Incoming>) -> Response {
    let deadline = table.deadline_from_now();
    let (parts, body) = req.into_parts();

    let body = match tokio::time::timeout_at(deadline, body.collect()).await {
        Ok(Ok(collected)) => collected.to_bytes(),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "failed to read request body");
            return HandlerError::bad_request(format!("failed to read request body: {e}"))
                .into_response(None);
        }
        Err(_) => {
            tracing::warn!(path = %parts.uri.path(), "request body not received before deadline");
            return HandlerError::timeout("request body not received before deadline")
                .into_response(None);
        }
    };

    table.dispatch_at(Request::from_parts(parts, body), deadline).await
}

/// Returns the bound address of a listener for `addr`.
///
/// Useful with port `0` in tests.
///
/// # Errors
///
/// Returns an error if the address cannot be bound.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, ServerError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}
