use axum::extract::State;
use axum::{routing::get, Json, Router};
use gateway_store::StatusCounts;
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Job totals per status.
    pub jobs: StatusCounts,
    /// Forwarding tasks still talking to the AutoML core.
    pub dispatches_in_flight: usize,
    /// Whether illegal status transitions are rejected.
    pub strict_transitions: bool,
}

/// GET /health -- returns service health and job totals.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        jobs: state.store.status_counts().await,
        dispatches_in_flight: state.dispatcher.in_flight(),
        strict_transitions: state.config.strict_transitions,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
