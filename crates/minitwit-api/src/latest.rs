use std::sync::atomic::{AtomicI64, Ordering};

use axum::{
    Json,
    extract::{Query, Request, State},
    middleware::Next,
    response::Response,
};
use minitwit_types::api::LatestResponse;
use serde::Deserialize;
use tracing::debug;

use crate::state::AppState;

/// Process-wide "latest processed request" value reported to the simulator.
/// Any request may overwrite it; the last writer wins.
#[derive(Debug, Default)]
pub struct LatestCursor(AtomicI64);

impl LatestCursor {
    pub fn get(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }

    pub fn set(&self, value: i64) {
        self.0.store(value, Ordering::SeqCst);
    }

    /// Store `raw` if it is a non-negative integer. Anything else is ignored.
    /// Returns whether the cursor was written.
    pub fn update_from(&self, raw: Option<&str>) -> bool {
        match raw.and_then(parse_latest) {
            Some(value) => {
                self.set(value);
                true
            }
            None => false,
        }
    }
}

fn parse_latest(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|v| *v >= 0)
}

#[derive(Debug, Deserialize)]
struct LatestQuery {
    latest: Option<String>,
}

/// Update the cursor from the `latest` query parameter of every request.
pub async fn track_latest(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let raw = Query::<LatestQuery>::try_from_uri(req.uri())
        .ok()
        .and_then(|Query(q)| q.latest);
    if state.latest.update_from(raw.as_deref()) {
        debug!("latest = {}", state.latest.get());
    }
    next.run(req).await
}

/// GET /api/latest
pub async fn get_latest(State(state): State<AppState>) -> Json<LatestResponse> {
    Json(LatestResponse {
        latest: state.latest.get(),
    })
}
