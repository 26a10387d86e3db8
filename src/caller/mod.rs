//! Caller Module
//!
//! A standard way of writing API clients. Every layer implements [`Caller`]
//! and most wrap another one, so chains are built by explicit composition:
//!
//! ```ignore
//! let registry = prometheus::Registry::new();
//! let metrics = ClientMetrics::new(&registry)?;
//!
//! // BaseClient -> InstrumentedClient -> Cacher
//! let caller = Cacher::new(
//!     reqwest::Client::new(),
//!     "foo",
//!     metrics,
//!     vec![CacheRule::path("/foo")],
//!     Duration::from_millis(50),
//!     Duration::ZERO,
//! );
//! let response = caller.call(request).await?;
//! ```
//!
//! Cache hits short-circuit before the instrumented layer, so only real
//! network calls are reported as API calls. Build the chain by hand with
//! [`Cacher::with_caller`] to change the order or drop instrumentation.

mod base;
mod cacher;
mod instrumented;
mod table;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

pub use base::BaseClient;
pub use cacher::{cache_key, CachedResponse, Cacher};
pub use instrumented::InstrumentedClient;
pub use table::{CacheRule, CacheTable};

/// An outbound request with a fully buffered body.
pub type ApiRequest = http::Request<Bytes>;

/// A response with a fully buffered body.
pub type ApiResponse = http::Response<Bytes>;

// == Caller Trait ==
/// Performs one HTTP request.
#[async_trait]
pub trait Caller: Send + Sync {
    async fn call(&self, request: ApiRequest) -> Result<ApiResponse>;
}

#[async_trait]
impl<C: Caller + ?Sized> Caller for Arc<C> {
    async fn call(&self, request: ApiRequest) -> Result<ApiResponse> {
        (**self).call(request).await
    }
}

#[async_trait]
impl<C: Caller + ?Sized> Caller for Box<C> {
    async fn call(&self, request: ApiRequest) -> Result<ApiResponse> {
        (**self).call(request).await
    }
}
