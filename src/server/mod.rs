//! Metrics Server Module
//!
//! HTTP server exposing a Prometheus scrape endpoint.
//!
//! # Endpoints
//! - `GET /metrics` - All metrics in the registry, in text format
//! - Any extra routes supplied by the application

pub mod handlers;
pub mod routes;

use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use prometheus::Registry;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::error::Result;

pub use handlers::{health_handler, ServerState, HTTP_DURATION_METRIC};
pub use routes::create_router;

/// How long [`MetricsServer::run`] waits for open connections after shutdown.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

// == Metrics Server ==
/// A bound scrape server, ready to run.
pub struct MetricsServer {
    port: u16,
    listener: TcpListener,
    router: Router,
    shutdown_timeout: Duration,
}

impl MetricsServer {
    /// Binds a server on `port` serving only `/metrics`.
    ///
    /// Port 0 picks a free port; [`MetricsServer::port`] reports the one chosen.
    pub async fn bind(port: u16, registry: &Registry) -> Result<Self> {
        Self::bind_with_routes(port, registry, Router::new()).await
    }

    /// Binds a server on `port` serving `/metrics` plus the routes in `extra`.
    pub async fn bind_with_routes(port: u16, registry: &Registry, extra: Router) -> Result<Self> {
        let listener = TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port))).await?;
        let port = listener.local_addr()?.port();
        let router = create_router(registry.clone(), extra)?;

        Ok(Self {
            port,
            listener,
            router,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        })
    }

    /// Sets how long to wait for open connections once shutdown starts.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serves requests until `shutdown` resolves, then drains open connections.
    ///
    /// The drain is bounded by the shutdown timeout. Connections still open
    /// when it elapses are left to be dropped with the runtime.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("Metrics server listening on port {}", self.port);

        let (started_tx, started_rx) = oneshot::channel::<()>();
        let signal = async move {
            shutdown.await;
            let _ = started_tx.send(());
        };
        let serve = axum::serve(self.listener, self.router)
            .with_graceful_shutdown(signal)
            .into_future();
        tokio::pin!(serve);

        let timeout = self.shutdown_timeout;
        let drain_deadline = async move {
            match started_rx.await {
                Ok(()) => tokio::time::sleep(timeout).await,
                // Serve ended without a shutdown signal; its own branch finishes first
                Err(_) => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            result = &mut serve => result?,
            _ = drain_deadline => {
                warn!("Connections still open after {:?}, stopping anyway", timeout);
            }
        }

        info!("Metrics server stopped");
        Ok(())
    }
}
