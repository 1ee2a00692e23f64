use std::{io, path::PathBuf, sync::Arc};

use tokio::sync::Notify;

/// Resolves on Ctrl-C. If the handler cannot be installed this never
/// resolves, so shutdown waits for the other signal source.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("cannot listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            tracing::error!("cannot install SIGTERM handler: {e}");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}

pub async fn listen_for_shutdown(notify: Arc<Notify>) {
    tokio::select! {
        _ = ctrl_c() => {},
        _ = terminate() => {},
    }

    tracing::info!("shutdown signal received – starting graceful shutdown");
    notify.notify_waiters();
}

/// `<config dir>/calendar_backend`, created if missing.
pub fn get_config_dir() -> io::Result<PathBuf> {
    let mut config_dir = dirs::config_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no config directory"))?;
    config_dir.push("calendar_backend");
    std::fs::create_dir_all(&config_dir)?;
    Ok(config_dir)
}
