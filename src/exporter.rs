//! Text exposition endpoint.
//!
//! Renders the instruments registered with a `prometheus::Registry` in the
//! text exposition format and serves them under `GET /metrics`, ready to be
//! merged into a host router.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use prometheus::{Encoder, Registry, TextEncoder};

/// Failure to render the exposition output.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to encode metrics: {0}")]
    Encode(#[from] prometheus::Error),
    #[error("metrics output is not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Renders everything registered with `registry` in the Prometheus text
/// exposition format.
pub fn render(registry: &Registry) -> Result<String, Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// A router serving `GET /metrics` for `registry`.
///
/// Merge it into the application router; with the instrumentation
/// middleware layered on top, the endpoint shows up in its own metrics like
/// any other route.
pub fn metrics_router(registry: Registry) -> Router {
    Router::new()
        .route("/metrics", get(serve_metrics))
        .with_state(registry)
}

async fn serve_metrics(State(registry): State<Registry>) -> Response {
    match render(&registry) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to render metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MetricsConfig, RequestMetrics};

    #[test]
    fn render_includes_help_and_type_lines() {
        let registry = Registry::new();
        let metrics = RequestMetrics::new(&registry, &MetricsConfig::default());

        metrics.record_started("get", "/");

        let output = render(&registry).unwrap();
        assert!(output.contains("# TYPE http_request_started_total counter"));
        assert!(output.contains(r#"http_request_started_total{method="get",path="/"} 1"#));
    }
}
