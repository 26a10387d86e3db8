//! Cacher
//!
//! Serves repeated requests from a local, time-bounded cache.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, StatusCode, Version};
use tracing::{debug, warn};

use super::{
    ApiRequest, ApiResponse, BaseClient, CacheRule, CacheTable, Caller, InstrumentedClient,
};
use crate::cache::Cache;
use crate::error::{CallerError, Result};
use crate::metrics::ClientMetrics;

// == Cached Response ==
/// The parts of a response needed to rebuild it on a cache hit.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResponse {
    pub status: StatusCode,
    pub version: Version,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl CachedResponse {
    pub fn from_response(response: &ApiResponse) -> Self {
        Self {
            status: response.status(),
            version: response.version(),
            headers: response.headers().clone(),
            body: response.body().clone(),
        }
    }

    pub fn to_response(&self) -> Result<ApiResponse> {
        let mut builder = http::Response::builder()
            .status(self.status)
            .version(self.version);
        if let Some(headers) = builder.headers_mut() {
            headers.extend(self.headers.clone());
        }
        builder
            .body(self.body.clone())
            .map_err(|e| CallerError::InvalidResponse(e.to_string()))
    }
}

/// Cache key for a request: method and full URI.
///
/// Scheme and authority are kept so one cacher fronting several upstreams
/// never serves one host's response for another. The method is part of the
/// key so a rule without a method filter never mixes methods either.
pub fn cache_key(request: &ApiRequest) -> String {
    format!("{} {}", request.method(), request.uri())
}

// == Cacher ==
/// Caches responses of an inner caller for requests selected by a [`CacheTable`].
///
/// Failed calls are never cached. Concurrent misses on the same key each call
/// the inner caller; the last one to finish wins.
pub struct Cacher<C> {
    inner: C,
    table: CacheTable,
    cache: Cache<CachedResponse>,
}

impl Cacher<InstrumentedClient<BaseClient>> {
    /// Creates a cacher that forwards misses to an instrumented reqwest client.
    ///
    /// Responses matching `rules` are cached for `default_expiry`, unless the
    /// rule sets its own expiry. An empty rule list caches every request.
    /// A non-zero `cleanup_interval` sweeps expired entries in the background,
    /// so this must be called from within a tokio runtime.
    pub fn new(
        http_client: reqwest::Client,
        application: impl Into<String>,
        metrics: ClientMetrics,
        rules: Vec<CacheRule>,
        default_expiry: Duration,
        cleanup_interval: Duration,
    ) -> Self {
        let inner = InstrumentedClient::new(BaseClient::new(http_client), metrics, application);
        Self::with_caller(
            inner,
            CacheTable::new(rules, default_expiry),
            Cache::new(default_expiry, cleanup_interval),
        )
    }
}

impl<C: Caller> Cacher<C> {
    /// Creates a cacher around an arbitrary inner caller.
    pub fn with_caller(inner: C, table: CacheTable, cache: Cache<CachedResponse>) -> Self {
        Self {
            inner,
            table,
            cache,
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn table(&self) -> &CacheTable {
        &self.table
    }

    pub fn cache(&self) -> &Cache<CachedResponse> {
        &self.cache
    }
}

#[async_trait]
impl<C: Caller> Caller for Cacher<C> {
    async fn call(&self, request: ApiRequest) -> Result<ApiResponse> {
        let Some(expiry) = self.table.should_cache(&request) else {
            debug!("Not caching {} {}", request.method(), request.uri().path());
            return self.inner.call(request).await;
        };

        let key = cache_key(&request);
        if let Some(cached) = self.cache.get(&key).await {
            debug!("Cache hit: {}", key);
            return cached.to_response();
        }

        debug!("Cache miss: {}", key);
        let response = match self.inner.call(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!("Call failed, not caching {}: {}", key, err);
                return Err(err);
            }
        };

        self.cache
            .set(key, CachedResponse::from_response(&response), Some(expiry))
            .await;
        Ok(response)
    }
}
