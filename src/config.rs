//! Middleware configuration.

use serde::Deserialize;

/// Default buckets for the request duration histogram, in milliseconds.
pub const DEFAULT_DURATION_BUCKETS: [f64; 4] = [0.3, 1.0, 2.5, 5.0];

/// Configuration for [`RequestMetrics`](crate::RequestMetrics).
///
/// Deserializable so host applications can embed it in their own
/// configuration files.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Bucket boundaries for the request duration histogram, in
    /// milliseconds. An empty list falls back to
    /// [`DEFAULT_DURATION_BUCKETS`].
    pub buckets: Vec<f64>,
}

impl MetricsConfig {
    /// Resolved histogram buckets: the configured sequence, or the defaults
    /// when none were configured.
    pub fn duration_buckets(&self) -> Vec<f64> {
        if self.buckets.is_empty() {
            DEFAULT_DURATION_BUCKETS.to_vec()
        } else {
            self.buckets.clone()
        }
    }
}
