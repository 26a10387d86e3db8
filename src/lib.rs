//! API Cacher - caching and instrumentation for outbound HTTP calls
//!
//! Decorates an API client with a rule-driven, time-bounded response cache
//! and Prometheus latency/error metrics.

pub mod cache;
pub mod caller;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod server;
pub mod tasks;
pub mod tools;

pub use caller::{
    ApiRequest, ApiResponse, BaseClient, CacheRule, CacheTable, Cacher, Caller,
    InstrumentedClient,
};
pub use config::Config;
pub use error::{CallerError, Result};
pub use metrics::ClientMetrics;
pub use server::MetricsServer;
