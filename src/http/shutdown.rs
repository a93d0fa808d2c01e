//! Signal handling.
//!
//! SIGTERM/SIGINT stop the listener. The child application is not signalled
//! here; it shares the terminal's process group and receives Ctrl+C itself.

/// Resolves when SIGINT or SIGTERM is received.
///
/// If a handler cannot be installed the corresponding branch never resolves,
/// leaving the other signal (or an external kill) to end the process.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, stopping listener");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, stopping listener");
        }
    }
}
