//! Route definitions for AutoML core callbacks.

use axum::routing::post;
use axum::Router;

use crate::handlers::callbacks;
use crate::state::AppState;

/// ```text
/// POST   /update-status       -> update_status
/// POST   /complete            -> complete_job
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/update-status", post(callbacks::update_status))
        .route("/complete", post(callbacks::complete_job))
}
