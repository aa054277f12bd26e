//! Prometheus request metrics.
//!
//! Names follow `minitwit_<subject>_<unit>`. The `path` label is the matched
//! route template (`/api/msgs/{username}`), never the raw request path.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use tracing::error;

use crate::state::AppState;

pub struct Metrics {
    registry: Registry,
    requests: IntCounterVec,
    duration: HistogramVec,
    latest: IntGauge,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("minitwit_http_requests_total", "Total HTTP requests handled"),
            &["method", "path", "status"],
        )?;
        let duration = HistogramVec::new(
            HistogramOpts::new(
                "minitwit_http_request_duration_seconds",
                "Time spent handling HTTP requests",
            ),
            &["method", "path"],
        )?;
        let latest = IntGauge::new("minitwit_latest", "Last `latest` value reported by the simulator")?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(duration.clone()))?;
        registry.register(Box::new(latest.clone()))?;

        Ok(Self {
            registry,
            requests,
            duration,
            latest,
        })
    }

    pub fn observe(&self, method: &str, path: &str, status: StatusCode, seconds: f64) {
        self.requests
            .with_label_values(&[method, path, status.as_str()])
            .inc();
        self.duration
            .with_label_values(&[method, path])
            .observe(seconds);
    }

    /// Text exposition of every registered metric.
    pub fn render(&self, latest: i64) -> prometheus::Result<String> {
        self.latest.set(latest);
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Count and time every request that reaches the API router.
pub async fn track_metrics(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let response = next.run(req).await;

    state.metrics.observe(
        &method,
        &path,
        response.status(),
        start.elapsed().as_secs_f64(),
    );
    response
}

/// GET /metrics
pub async fn export(State(state): State<AppState>) -> Response {
    match state.metrics.render(state.latest.get()) {
        Ok(body) => (
            [(header::CONTENT_TYPE, TextEncoder::new().format_type().to_owned())],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
