//! Metrics Server Handlers
//!
//! HTTP request handlers and middleware for the scrape endpoint.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use prometheus::{histogram_opts, Encoder, HistogramVec, Registry, TextEncoder};
use tracing::warn;

use crate::error::Result;
use crate::models::HealthResponse;

/// Name of the histogram recording the duration of each server request.
pub const HTTP_DURATION_METRIC: &str = "http_duration_seconds";

/// State shared by the scrape handler and the duration middleware.
#[derive(Clone)]
pub struct ServerState {
    /// Registry rendered by `GET /metrics`
    pub registry: Registry,
    /// Duration of each request, by route template, method and status code
    pub http_duration: HistogramVec,
}

impl ServerState {
    /// Creates the state and registers the request duration histogram with `registry`.
    pub fn new(registry: Registry) -> Result<Self> {
        let http_duration = HistogramVec::new(
            histogram_opts!(HTTP_DURATION_METRIC, "Duration of HTTP requests"),
            &["path", "method", "status_code"],
        )?;
        registry.register(Box::new(http_duration.clone()))?;

        Ok(Self {
            registry,
            http_duration,
        })
    }
}

/// Handler for GET /metrics
///
/// Renders every metric in the registry in the Prometheus text format.
pub async fn metrics_handler(State(state): State<ServerState>) -> Response {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    if let Err(err) = encoder.encode(&state.registry.gather(), &mut buffer) {
        warn!("Failed to encode metrics: {}", err);
        return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
    }

    (
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    )
        .into_response()
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Records the duration of each routed request.
///
/// Requests are labelled with the route template rather than the raw path,
/// so path parameters don't create a series each.
pub async fn track_duration(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let method = request.method().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    state
        .http_duration
        .with_label_values(&[path.as_str(), method.as_str(), response.status().as_str()])
        .observe(start.elapsed().as_secs_f64());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_metrics_handler_renders_registry() {
        let state = ServerState::new(Registry::new()).unwrap();
        state
            .http_duration
            .with_label_values(&["/hello", "GET", "200"])
            .observe(0.1);

        let response = metrics_handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("# HELP http_duration_seconds"));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[test]
    fn test_state_registers_once_per_registry() {
        let registry = Registry::new();
        assert!(ServerState::new(registry.clone()).is_ok());
        assert!(ServerState::new(registry).is_err());
    }
}
