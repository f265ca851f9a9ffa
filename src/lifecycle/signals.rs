//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGINT (Ctrl-C) or SIGTERM
//! - Translate the first one into a lifecycle trigger
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Later signals are ignored; the drain grace period bounds exit time

use tokio::task::JoinHandle;

use crate::lifecycle::LifecycleSignal;

/// Spawn a task that fires `signal` on the first SIGINT or SIGTERM.
pub fn trigger_on_os_signal(signal: LifecycleSignal) -> JoinHandle<()> {
    tokio::spawn(async move {
        let name = wait_for_os_signal().await;
        tracing::info!(signal = name, "Shutdown signal received");
        signal.trigger();
    })
}

#[cfg(unix)]
async fn wait_for_os_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install SIGTERM handler, waiting for Ctrl-C only");
            return ctrl_c().await;
        }
    };

    tokio::select! {
        name = ctrl_c() => name,
        _ = term.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn wait_for_os_signal() -> &'static str {
    ctrl_c().await
}

async fn ctrl_c() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    "SIGINT"
}
