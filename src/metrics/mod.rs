//! Metrics Module
//!
//! Explicit Prometheus metric sinks. Metrics are registered on a caller-supplied
//! `Registry` at startup and handed to the components that record them.

mod client;

pub use client::{ClientMetrics, CLIENT_METRIC_LABELS, ERRORS_METRIC, LATENCY_METRIC};
