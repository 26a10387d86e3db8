//! Instrumented Client
//!
//! Records latency and error metrics around every call to an inner caller.

use async_trait::async_trait;

use super::{ApiRequest, ApiResponse, Caller};
use crate::error::Result;
use crate::metrics::ClientMetrics;

/// Collects performance metrics of the API calls made through `inner`.
///
/// Metrics are labelled with the application name and the request path.
pub struct InstrumentedClient<C> {
    inner: C,
    metrics: ClientMetrics,
    application: String,
}

impl<C: Caller> InstrumentedClient<C> {
    pub fn new(inner: C, metrics: ClientMetrics, application: impl Into<String>) -> Self {
        Self {
            inner,
            metrics,
            application: application.into(),
        }
    }

    pub fn application(&self) -> &str {
        &self.application
    }
}

#[async_trait]
impl<C: Caller> Caller for InstrumentedClient<C> {
    async fn call(&self, request: ApiRequest) -> Result<ApiResponse> {
        let endpoint = request.uri().path().to_string();
        let labels = [self.application.as_str(), endpoint.as_str()];
        let timer = self.metrics.start_latency_timer(&labels);

        let result = self.inner.call(request).await;

        if let Some(timer) = timer {
            timer.observe_duration();
        }
        self.metrics.report_errors(result.is_err(), &labels);
        result
    }
}
