use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

/// Whether `provided` matches the configured simulator secret. An empty
/// secret matches nothing.
pub fn is_simulator(provided: Option<&str>, expected: &str) -> bool {
    match provided {
        Some(value) => !expected.is_empty() && value == expected,
        None => false,
    }
}

/// Reject requests whose `Authorization` header is not the simulator secret.
/// Runs before method dispatch, so an unauthorized caller never sees a 405
/// or learns whether a user exists.
pub async fn require_simulator(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if !is_simulator(provided, &state.sim_secret) {
        warn!("Rejected {} {}: not from simulator", req.method(), req.uri().path());
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(req).await)
}
