//! OS signal handling.
//!
//! Translates process termination signals into a single future the binary
//! races against its own work before triggering [`Shutdown`](super::Shutdown).

/// Waits for a termination signal (SIGINT, SIGTERM or SIGQUIT).
///
/// Returns `Err` if a signal handler cannot be registered.
#[cfg(unix)]
pub async fn wait_for_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv() => tracing::info!(signal = "SIGINT", "Termination signal received"),
        _ = sigterm.recv() => tracing::info!(signal = "SIGTERM", "Termination signal received"),
        _ = sigquit.recv() => tracing::info!(signal = "SIGQUIT", "Termination signal received"),
    }
    Ok(())
}

/// Waits for Ctrl-C.
#[cfg(not(unix))]
pub async fn wait_for_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::info!(signal = "ctrl-c", "Termination signal received");
    Ok(())
}
