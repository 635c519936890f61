use std::sync::Arc;

use gateway_store::JobStore;

use crate::config::ServerConfig;
use crate::engine::dispatcher::JobDispatcher;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Authoritative job store, shared with the dispatcher.
    pub store: Arc<JobStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Forwards newly submitted jobs to the AutoML core.
    pub dispatcher: Arc<JobDispatcher>,
}
