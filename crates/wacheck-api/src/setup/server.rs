//! Server startup and graceful shutdown

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use wacheck_core::Config;

use crate::state::AppState;

/// Start the server with graceful shutdown; the messaging session is closed once it stops
pub async fn start_server(config: &Config, app: Router, state: Arc<AppState>) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.server_port());
    tracing::info!(addr = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        max_upload_mb = config.server.max_upload_size_bytes / 1024 / 1024,
        max_bulk_numbers = config.server.max_bulk_numbers,
        static_dir = %config.server.static_dir,
        check_delay_ms = config.timing.check_delay_ms,
        "Server ready and accepting connections"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.session.shutdown().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM. Panics if a handler cannot be installed.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Stopping HTTP server, the messaging session will be closed");
}
