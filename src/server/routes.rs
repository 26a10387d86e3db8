//! Metrics Server Routes
//!
//! Configures the Axum router with the scrape endpoint and any extra routes.

use axum::{middleware, routing::get, Router};
use prometheus::Registry;
use tower_http::trace::TraceLayer;

use super::handlers::{metrics_handler, track_duration, ServerState};
use crate::error::Result;

/// Creates a router serving `GET /metrics` from `registry`, merged with `extra`.
///
/// Use this to add the scrape endpoint to an existing application server
/// instead of running a [`super::MetricsServer`]:
///
/// ```ignore
/// let app = create_router(registry, Router::new().route("/health", get(health_handler)))?;
/// axum::serve(listener, app).await?;
/// ```
///
/// # Middleware
/// - Duration: records `http_duration_seconds` for every routed request
/// - Tracing: logs all requests for debugging
pub fn create_router(registry: Registry, extra: Router) -> Result<Router> {
    let state = ServerState::new(registry)?;

    Ok(Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(state.clone())
        .merge(extra)
        .route_layer(middleware::from_fn_with_state(state, track_duration))
        .layer(TraceLayer::new_for_http()))
}
