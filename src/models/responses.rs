//! Response DTOs for the metrics server

use serde::Serialize;

use crate::cache::CacheStats;

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// RFC 3339
    pub timestamp: String,
    /// Response cache counters, when the server fronts a cacher
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hit_rate: Option<f64>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            cache: None,
            hit_rate: None,
        }
    }

    /// Attaches a snapshot of the cache counters.
    pub fn with_cache(mut self, stats: CacheStats) -> Self {
        self.hit_rate = Some(stats.hit_rate());
        self.cache = Some(stats);
        self
    }
}
