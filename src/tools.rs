//! Metric Reading Tools
//!
//! Helpers for asserting on recorded metrics in tests. Values are read from a
//! `Registry` snapshot, so the reads don't disturb the live series:
//!
//! ```ignore
//! let errors = tools::counter_value(&registry, "api_request_errors_total",
//!     &[("application", "foo"), ("request", "/foo")]);
//! assert_eq!(errors, Some(1.0));
//! ```

use prometheus::proto::{Metric, MetricFamily};
use prometheus::Registry;

/// Returns the gathered family with the given metric name.
pub fn find_family(registry: &Registry, name: &str) -> Option<MetricFamily> {
    registry
        .gather()
        .into_iter()
        .find(|family| family.get_name() == name)
}

/// Returns the value of one of a metric's labels.
pub fn metric_label<'a>(metric: &'a Metric, label_name: &str) -> Option<&'a str> {
    metric
        .get_label()
        .iter()
        .find(|label| label.get_name() == label_name)
        .map(|label| label.get_value())
}

/// Returns the series of metric `name` whose labels include every `(name, value)` pair.
pub fn find_metric(registry: &Registry, name: &str, labels: &[(&str, &str)]) -> Option<Metric> {
    let family = find_family(registry, name)?;
    family
        .get_metric()
        .iter()
        .find(|metric| {
            labels
                .iter()
                .all(|(label, value)| metric_label(metric, label) == Some(*value))
        })
        .cloned()
}

pub fn counter_value(registry: &Registry, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
    find_metric(registry, name, labels).map(|metric| metric.get_counter().get_value())
}

pub fn histogram_sample_count(
    registry: &Registry,
    name: &str,
    labels: &[(&str, &str)],
) -> Option<u64> {
    find_metric(registry, name, labels).map(|metric| metric.get_histogram().get_sample_count())
}

pub fn histogram_sample_sum(
    registry: &Registry,
    name: &str,
    labels: &[(&str, &str)],
) -> Option<f64> {
    find_metric(registry, name, labels).map(|metric| metric.get_histogram().get_sample_sum())
}
