//! API Cacher - caching and instrumentation for outbound HTTP calls
//!
//! Runs a caching API client against `TARGET_URL` and exposes its metrics
//! for Prometheus to scrape.

use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Json, Router};
use bytes::Bytes;
use prometheus::Registry;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_cacher::cache::Cache;
use api_cacher::models::HealthResponse;
use api_cacher::{BaseClient, Cacher, Caller, ClientMetrics, Config, InstrumentedClient, MetricsServer};

/// Main entry point for the caching client.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Register client metrics and build the caller chain
/// 4. Start polling the target URL, if configured
/// 5. Serve /metrics and /health until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_cacher=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting API Cacher");

    let config = Config::from_env().context("failed to load configuration")?;
    info!(
        "Configuration loaded: application={}, default_expiry={:?}, cleanup_interval={:?}, metrics_port={}, rules={}",
        config.application,
        config.default_expiry,
        config.cleanup_interval,
        config.metrics_port,
        config.rules.len()
    );

    // Fail at startup on a malformed rule table rather than on the first request
    let table = config.cache_table().context("invalid cache rules")?;

    let registry = Registry::new();
    let metrics = ClientMetrics::new(&registry).context("failed to register client metrics")?;

    // BaseClient -> InstrumentedClient -> Cacher: cache hits are not reported as API calls
    let caller = Arc::new(Cacher::with_caller(
        InstrumentedClient::new(BaseClient::new(reqwest::Client::new()), metrics, &config.application),
        table,
        Cache::new(config.default_expiry, config.cleanup_interval),
    ));
    info!("Caller chain initialized");

    let poll_handle = config
        .target_url
        .clone()
        .map(|url| spawn_poll_task(caller.clone(), url, &config));

    let health_caller = caller.clone();
    let health = Router::new().route(
        "/health",
        get(move || async move {
            Json(HealthResponse::healthy().with_cache(health_caller.cache().stats().await))
        }),
    );

    let server = MetricsServer::bind_with_routes(config.metrics_port, &registry, health)
        .await
        .context("failed to bind metrics server")?
        .with_shutdown_timeout(config.shutdown_timeout);
    info!("Metrics available on http://0.0.0.0:{}/metrics", server.port());

    server.run(shutdown_signal(poll_handle)).await?;

    info!("Shutdown complete");
    Ok(())
}

/// Polls `url` through the caller chain at the configured interval.
fn spawn_poll_task<C>(caller: Arc<C>, url: String, config: &Config) -> JoinHandle<()>
where
    C: Caller + 'static,
{
    let interval = config.poll_interval;

    tokio::spawn(async move {
        info!("Polling {} every {:?}", url, interval);
        let mut ticker = tokio::time::interval(interval);

        loop {
            ticker.tick().await;

            let request = match http::Request::get(url.as_str()).body(Bytes::new()) {
                Ok(request) => request,
                Err(err) => {
                    warn!("Invalid target URL {}: {}", url, err);
                    return;
                }
            };

            match caller.call(request).await {
                Ok(response) => info!(
                    "GET {}: {} ({} bytes)",
                    url,
                    response.status(),
                    response.body().len()
                ),
                Err(err) => warn!("GET {} failed: {}", url, err),
            }
        }
    })
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the poll task and allows graceful shutdown.
async fn shutdown_signal(poll_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = poll_handle {
        handle.abort();
        warn!("Poll task aborted");
    }
}
