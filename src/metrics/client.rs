//! API Client Metrics
//!
//! Prometheus latency and error metrics recorded around outbound API calls.

use prometheus::{histogram_opts, opts, CounterVec, HistogramTimer, HistogramVec, Registry};

use crate::error::Result;

/// Labels carried by every client metric: the calling application and the request path.
pub const CLIENT_METRIC_LABELS: [&str; 2] = ["application", "request"];

/// Name of the latency histogram registered by [`ClientMetrics::new`].
pub const LATENCY_METRIC: &str = "api_request_duration_seconds";

/// Name of the error counter registered by [`ClientMetrics::new`].
pub const ERRORS_METRIC: &str = "api_request_errors_total";

// == Client Metrics ==
/// Metric sinks for API calls.
///
/// Each metric is optional; a missing metric turns the matching operation
/// into a no-op. Cloning shares the underlying series.
#[derive(Clone, Default)]
pub struct ClientMetrics {
    latency: Option<HistogramVec>,
    errors: Option<CounterVec>,
}

impl ClientMetrics {
    /// Creates latency and error metrics and registers them with `registry`.
    pub fn new(registry: &Registry) -> Result<Self> {
        let latency = HistogramVec::new(
            histogram_opts!(LATENCY_METRIC, "Duration of API requests."),
            &CLIENT_METRIC_LABELS,
        )?;
        let errors = CounterVec::new(
            opts!(ERRORS_METRIC, "Errors returned by API requests."),
            &CLIENT_METRIC_LABELS,
        )?;

        registry.register(Box::new(latency.clone()))?;
        registry.register(Box::new(errors.clone()))?;

        Ok(Self {
            latency: Some(latency),
            errors: Some(errors),
        })
    }

    /// Metrics that record nothing.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: HistogramVec) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn with_errors(mut self, errors: CounterVec) -> Self {
        self.errors = Some(errors);
        self
    }

    // == Latency ==
    /// Starts a timer measuring the latency of one call.
    ///
    /// Returns None if no latency metric is configured. The duration is
    /// recorded when the timer is observed or dropped:
    ///
    /// ```ignore
    /// let timer = metrics.start_latency_timer(&["app", "/foo"]);
    /// call_api().await;
    /// if let Some(timer) = timer {
    ///     timer.observe_duration();
    /// }
    /// ```
    pub fn start_latency_timer(&self, label_values: &[&str]) -> Option<HistogramTimer> {
        self.latency
            .as_ref()
            .map(|latency| latency.with_label_values(label_values).start_timer())
    }

    // == Errors ==
    /// Counts one call outcome: +1 on failure, +0 on success.
    ///
    /// Adding zero on success makes the series exist before the first error.
    pub fn report_errors(&self, failed: bool, label_values: &[&str]) {
        if let Some(errors) = &self.errors {
            let value = if failed { 1.0 } else { 0.0 };
            errors.with_label_values(label_values).inc_by(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools;
    use std::time::Duration;

    #[test]
    fn test_latency_timer_without_metric() {
        let metrics = ClientMetrics::disabled();
        assert!(metrics.start_latency_timer(&["foo", "/foo"]).is_none());
    }

    #[test]
    fn test_report_errors_without_metric() {
        // Doesn't panic when no errors metric is set
        ClientMetrics::disabled().report_errors(true, &["foo", "/foo"]);
    }

    #[test]
    fn test_latency_timer_records_sample() {
        let registry = Registry::new();
        let metrics = ClientMetrics::new(&registry).unwrap();

        let timer = metrics.start_latency_timer(&["foo", "/foo"]).unwrap();
        std::thread::sleep(Duration::from_millis(10));
        timer.observe_duration();

        let labels = [("application", "foo"), ("request", "/foo")];
        assert_eq!(
            tools::histogram_sample_count(&registry, LATENCY_METRIC, &labels),
            Some(1)
        );
        assert!(tools::histogram_sample_sum(&registry, LATENCY_METRIC, &labels).unwrap() > 0.0);
    }

    #[test]
    fn test_report_errors_counts_failures_only() {
        let registry = Registry::new();
        let metrics = ClientMetrics::new(&registry).unwrap();
        let labels = [("application", "foo"), ("request", "/foo")];

        metrics.report_errors(false, &["foo", "/foo"]);
        assert_eq!(tools::counter_value(&registry, ERRORS_METRIC, &labels), Some(0.0));

        metrics.report_errors(true, &["foo", "/foo"]);
        assert_eq!(tools::counter_value(&registry, ERRORS_METRIC, &labels), Some(1.0));
    }

    #[test]
    fn test_double_registration_fails() {
        let registry = Registry::new();
        ClientMetrics::new(&registry).unwrap();
        assert!(ClientMetrics::new(&registry).is_err());
    }
}
