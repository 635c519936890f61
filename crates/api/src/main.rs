use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gateway_api::config::ServerConfig;
use gateway_api::engine::dispatcher::JobDispatcher;
use gateway_api::router::build_app_router;
use gateway_api::state::AppState;
use gateway_automl::AutoMlApi;
use gateway_store::JobStore;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gateway_api=debug,gateway_store=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        automl_core_url = %config.automl_core_url,
        strict_transitions = config.strict_transitions,
        "Loaded server configuration",
    );

    // --- Job store ---
    let store = Arc::new(JobStore::with_policy(config.transition_policy()));

    // --- AutoML core client ---
    let automl = AutoMlApi::new(config.automl_core_url.clone(), config.dispatch_timeout())
        .expect("Failed to build AutoML core HTTP client");

    // --- Dispatcher ---
    let dispatcher = Arc::new(JobDispatcher::new(Arc::clone(&store), Arc::new(automl)));

    // --- App state ---
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
        dispatcher: Arc::clone(&dispatcher),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting API gateway");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!(
        in_flight = dispatcher.in_flight(),
        "Server stopped accepting connections, draining dispatches",
    );

    if dispatcher.shutdown(config.shutdown_timeout()).await {
        tracing::info!("Dispatcher drained");
    } else {
        tracing::warn!(
            in_flight = dispatcher.in_flight(),
            "Shutdown timeout elapsed with dispatches still in flight",
        );
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
