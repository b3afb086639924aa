//! Server startup and graceful shutdown.

use crate::{AppConfig, AppState, build_media_store, router, throttle_from_settings};
use campusconnect_error::{CampusResult, ServerError, ServerErrorKind};
use std::net::SocketAddr;

/// Build backends from configuration and serve until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the backends cannot be built, the address cannot be
/// bound, or the server loop fails.
#[tracing::instrument(skip(config), fields(addr = %config.server.bind_addr()))]
pub async fn serve(config: AppConfig) -> CampusResult<()> {
    let store = build_media_store(&config).await?;
    let throttle = throttle_from_settings(&config.throttle);
    let state = AppState::new(store, config.limits.clone(), throttle);
    let app = router(state, &config.server);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        ServerError::new(ServerErrorKind::Bind {
            addr: addr.clone(),
            reason: e.to_string(),
        })
    })?;

    tracing::info!(addr = %addr, "CampusConnect media server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| ServerError::new(ServerErrorKind::Serve(e.to_string())))?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolve on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
