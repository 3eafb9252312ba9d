//! Request instrumentation for axum HTTP services, exported in the
//! Prometheus text format.
//!
//! Three metrics are recorded for every request passing through the
//! middleware:
//! - `http_request_started_total{method, path}` counter, incremented before
//!   the handler runs
//! - `http_request_completed_total{code, method, path}` counter, incremented
//!   once the handler produced its response
//! - `http_request_duration_ms{code, method, path}` latency histogram, in
//!   milliseconds
//!
//! The `path` label is the matched route template (`/orders/:order_id`),
//! never the raw request path, so series cardinality stays bounded by the
//! routing table. Completion and latency are recorded off the request path;
//! the exposition output is eventually consistent with request completion.
//!
//! # Wiring
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use axum::{middleware, routing::get, Router};
//! use request_metrics::{metrics_middleware, metrics_router, MetricsConfig, RequestMetrics};
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = prometheus::Registry::new();
//!     let metrics = Arc::new(RequestMetrics::new(&registry, &MetricsConfig::default()));
//!
//!     let app = Router::new()
//!         .route("/", get(|| async { "ok" }))
//!         .merge(metrics_router(registry))
//!         .layer(middleware::from_fn_with_state(metrics, metrics_middleware));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

mod body;
mod config;
mod exporter;
mod middleware;
mod registry;

pub use config::{MetricsConfig, DEFAULT_DURATION_BUCKETS};
pub use exporter::{metrics_router, render, Error};
pub use middleware::metrics_middleware;
pub use registry::RequestMetrics;
