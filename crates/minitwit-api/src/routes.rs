use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::follows;
use crate::latest::{self, track_latest};
use crate::messages;
use crate::metrics::{self, track_metrics};
use crate::middleware::require_simulator;
use crate::register;
use crate::state::AppState;

/// The public API. Every request updates the `latest` cursor before anything
/// else runs; the simulator gate sits in front of the message and follow
/// routes, ahead of method dispatch.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/latest", get(latest::get_latest))
        .route("/api/register", post(register::register));

    let simulator_routes = Router::new()
        .route("/api/msgs", get(messages::list_messages))
        .route(
            "/api/msgs/{username}",
            get(messages::list_user_messages).post(messages::post_message),
        )
        .route(
            "/api/fllws/{username}",
            get(follows::list_follows).post(follows::update_follow),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_simulator));

    Router::new()
        .merge(public_routes)
        .merge(simulator_routes)
        .layer(middleware::from_fn_with_state(state.clone(), track_metrics))
        .layer(middleware::from_fn_with_state(state.clone(), track_latest))
        .with_state(state)
}

/// Prometheus scrape endpoint, served on its own listener.
pub fn metrics_router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(metrics::export))
        .with_state(state)
}
