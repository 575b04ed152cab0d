//! OS signal handling.
//!
//! SIGTERM and SIGINT (Ctrl-C) both request a graceful shutdown.

/// Wait for a termination signal and return its name.
pub async fn wait_for_signal() -> std::io::Result<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            _ = terminate.recv() => Ok("SIGTERM"),
            res = tokio::signal::ctrl_c() => res.map(|_| "interrupt"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        Ok("interrupt")
    }
}
