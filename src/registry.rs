//! The three request instruments and their recording operations.

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

use crate::config::MetricsConfig;

pub(crate) const DURATION_NAME: &str = "http_request_duration_ms";
pub(crate) const STARTED_NAME: &str = "http_request_started_total";
pub(crate) const COMPLETED_NAME: &str = "http_request_completed_total";

/// The request instruments recorded by
/// [`metrics_middleware`](crate::metrics_middleware).
///
/// Cheap to clone; all clones record into the same underlying series.
#[derive(Clone)]
pub struct RequestMetrics {
    duration: HistogramVec,
    started: IntCounterVec,
    completed: IntCounterVec,
}

impl RequestMetrics {
    /// Builds the three instruments and registers each with `registry`.
    ///
    /// A registration conflict (an instrument of the same name already
    /// registered, e.g. from an earlier construction in the same process) is
    /// logged and swallowed; the returned value keeps recording into the
    /// instruments it constructed. Metrics setup never fails a server start.
    pub fn new(registry: &Registry, config: &MetricsConfig) -> Self {
        let duration = HistogramVec::new(
            HistogramOpts::new(
                DURATION_NAME,
                "How long it took to process the request, partitioned by status code, method and HTTP path.",
            )
            .buckets(config.duration_buckets()),
            &["code", "method", "path"],
        )
        .expect("duration instrument options are statically valid");

        let started = IntCounterVec::new(
            Opts::new(
                STARTED_NAME,
                "Total number of requests started on the http server.",
            ),
            &["method", "path"],
        )
        .expect("started instrument options are statically valid");

        let completed = IntCounterVec::new(
            Opts::new(
                COMPLETED_NAME,
                "Total number of requests completed on the http server.",
            ),
            &["code", "method", "path"],
        )
        .expect("completed instrument options are statically valid");

        if let Err(e) = registry.register(Box::new(duration.clone())) {
            tracing::warn!("{} was not registered: {}", DURATION_NAME, e);
        }
        if let Err(e) = registry.register(Box::new(started.clone())) {
            tracing::warn!("{} was not registered: {}", STARTED_NAME, e);
        }
        if let Err(e) = registry.register(Box::new(completed.clone())) {
            tracing::warn!("{} was not registered: {}", COMPLETED_NAME, e);
        }

        Self {
            duration,
            started,
            completed,
        }
    }

    /// Counts a request entering its handler.
    pub fn record_started(&self, method: &str, path: &str) {
        self.started.with_label_values(&[method, path]).inc();
    }

    /// Counts a finished request under its outcome status.
    pub fn record_completed(&self, method: &str, path: &str, code: &str) {
        self.completed.with_label_values(&[code, method, path]).inc();
    }

    /// Records one latency observation, in milliseconds.
    pub fn record_duration(&self, method: &str, path: &str, code: &str, elapsed_ms: f64) {
        self.duration
            .with_label_values(&[code, method, path])
            .observe(elapsed_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket_bounds(registry: &Registry) -> Vec<f64> {
        let families = registry.gather();
        let family = families
            .iter()
            .find(|f| f.get_name() == DURATION_NAME)
            .expect("duration family present");
        family.get_metric()[0]
            .get_histogram()
            .get_bucket()
            .iter()
            .map(|b| b.get_upper_bound())
            .collect()
    }

    #[test]
    fn registers_all_three_instruments() {
        let registry = Registry::new();
        let metrics = RequestMetrics::new(&registry, &MetricsConfig::default());

        metrics.record_started("get", "/");
        metrics.record_completed("get", "/", "200");
        metrics.record_duration("get", "/", "200", 1.0);

        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|f| f.get_name().to_owned())
            .collect();
        assert!(names.contains(&DURATION_NAME.to_owned()));
        assert!(names.contains(&STARTED_NAME.to_owned()));
        assert!(names.contains(&COMPLETED_NAME.to_owned()));
    }

    #[test]
    fn duplicate_setup_is_tolerated() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();

        let registry = Registry::new();
        let first = RequestMetrics::new(&registry, &MetricsConfig::default());
        // Collides on all three names; must log, not panic.
        let second = RequestMetrics::new(&registry, &MetricsConfig::default());

        first.record_started("get", "/");
        second.record_started("get", "/");

        let families = registry.gather();
        let started = families
            .iter()
            .find(|f| f.get_name() == STARTED_NAME)
            .unwrap();
        // Only the first (registered) instance is visible to the collector.
        assert_eq!(started.get_metric()[0].get_counter().get_value() as u64, 1);
    }

    #[test]
    fn default_buckets_apply_when_unconfigured() {
        let registry = Registry::new();
        let metrics = RequestMetrics::new(&registry, &MetricsConfig::default());

        metrics.record_duration("get", "/", "200", 0.5);

        assert_eq!(bucket_bounds(&registry), vec![0.3, 1.0, 2.5, 5.0]);
    }

    #[test]
    fn configured_buckets_replace_defaults() {
        let registry = Registry::new();
        let config = MetricsConfig {
            buckets: vec![10.0, 50.0],
        };
        let metrics = RequestMetrics::new(&registry, &config);

        metrics.record_duration("get", "/", "200", 20.0);

        assert_eq!(bucket_bounds(&registry), vec![10.0, 50.0]);
    }
}
