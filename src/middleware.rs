//! HTTP metrics middleware.
//!
//! Records for every request passing through the router:
//! - a started counter, incremented before the handler runs
//! - a completed counter, keyed by outcome status
//! - a request duration histogram
//!
//! The `path` label is the matched route template, so `/orders/42` and
//! `/orders/43` land in the same `/orders/:order_id` series.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::{Method, Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::body::ObservedBody;
use crate::registry::RequestMetrics;

/// Records request metrics around every request passing through the router.
///
/// Attach with `axum::middleware::from_fn_with_state`. Wrapped routes keep
/// their exact response status, headers and body; the middleware only adds
/// metric side effects. Completion and duration are recorded on detached
/// tasks, so the response is never held back by the metrics backend.
pub async fn metrics_middleware(
    State(metrics): State<Arc<RequestMetrics>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let observation = RequestObservation::begin(&metrics, &request);

    let response = next.run(request).await;

    observation.complete(&metrics, response.status());

    let (parts, body) = response.into_parts();
    Response::from_parts(parts, Body::new(ObservedBody::new(body)))
}

/// One request as seen by the middleware: created on entry, consumed once
/// the completion metrics are dispatched.
struct RequestObservation {
    method: String,
    path: String,
    started_at: Instant,
}

impl RequestObservation {
    fn begin(metrics: &RequestMetrics, request: &Request<Body>) -> Self {
        let method = sanitize_method(request.method());
        // Fallback handlers and unmatched routes carry no template; an empty
        // label keeps raw (unbounded) paths out of the series.
        let path = request
            .extensions()
            .get::<MatchedPath>()
            .map(|matched| matched.as_str().to_owned())
            .unwrap_or_default();

        metrics.record_started(&method, &path);

        Self {
            method,
            path,
            started_at: Instant::now(),
        }
    }

    fn complete(self, metrics: &RequestMetrics, status: StatusCode) {
        let Self {
            method,
            path,
            started_at,
        } = self;
        let code = sanitize_code(status);
        let elapsed_ms = started_at.elapsed().as_millis() as f64;

        let completed = metrics.clone();
        let duration = metrics.clone();
        {
            let (method, path, code) = (method.clone(), path.clone(), code.clone());
            tokio::spawn(async move {
                completed.record_completed(&method, &path, &code);
            });
        }
        tokio::spawn(async move {
            duration.record_duration(&method, &path, &code, elapsed_ms);
        });
    }
}

fn sanitize_method(method: &Method) -> String {
    method.as_str().to_ascii_lowercase()
}

fn sanitize_code(status: StatusCode) -> String {
    status.as_u16().to_string()
}
