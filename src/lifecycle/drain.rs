//! Bounded graceful shutdown for a running server.
//!
//! # Sequence
//! ```text
//! run():   spawn accept loop ──────────────┐
//!          wait for lifecycle signal       │ accepting
//! signal:  accept loop stops, drops socket ┘
//!          select {
//!              drain in-flight connections  → Clean
//!              grace period elapses         → abort all → Forced
//!          }
//! ```

use std::time::{Duration, Instant};

use axum::Router;
use tokio::net::TcpListener;
use tokio::time;

use crate::lifecycle::LifecycleObserver;
use crate::net::{BoundedListener, ConnectionSet};
use crate::observability::metrics;

/// Connection limit used when the host hands over a bare `TcpListener`.
pub const DEFAULT_MAX_CONNECTIONS: usize = 10_000;

/// Pause after a failed accept so a persistent error (e.g. EMFILE) does not
/// spin the loop.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// How a server stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Every in-flight connection finished within the grace period.
    Clean,
    /// The grace period elapsed; remaining connections were aborted.
    Forced { aborted: usize },
}

impl DrainOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrainOutcome::Clean => "clean",
            DrainOutcome::Forced { .. } => "forced",
        }
    }
}

/// Stops a server cleanly on shutdown, bounded by a grace period.
#[derive(Debug, Clone, Copy)]
pub struct DrainSequencer {
    grace: Duration,
}

impl DrainSequencer {
    pub fn new(grace: Duration) -> Self {
        Self { grace }
    }

    pub fn grace(&self) -> Duration {
        self.grace
    }

    /// Serve `router` on `listener` until `observer` reports stopping, then
    /// drain. Always returns within the grace period plus the time needed
    /// to abort the remaining connection tasks.
    pub async fn run(
        &self,
        listener: BoundedListener,
        router: Router,
        observer: LifecycleObserver,
    ) -> DrainOutcome {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!(address = %addr, grace = ?self.grace, "Server starting");
        }

        let accept = tokio::spawn(accept_loop(listener, router, observer.clone()));

        observer.stopping().await;
        let started = Instant::now();

        let mut connections = match accept.await {
            Ok(connections) => connections,
            Err(e) => {
                // The JoinSet inside went down with the task, aborting its connections.
                tracing::error!(error = %e, "Accept loop failed, connections already terminated");
                let outcome = DrainOutcome::Forced { aborted: 0 };
                metrics::record_drain(outcome);
                return outcome;
            }
        };

        tracing::info!(
            active_connections = connections.active_count(),
            grace = ?self.grace,
            "Stopped accepting, draining connections"
        );

        let drained = tokio::select! {
            _ = connections.drain() => true,
            _ = time::sleep(self.grace) => false,
        };

        let outcome = if drained {
            tracing::info!(elapsed = ?started.elapsed(), "Server stopped cleanly");
            DrainOutcome::Clean
        } else {
            tracing::warn!(
                grace = ?self.grace,
                remaining = connections.active_count(),
                "Drain timeout exceeded, forcing stop"
            );
            let aborted = connections.abort_all().await;
            tracing::warn!(aborted, elapsed = ?started.elapsed(), "Server force-stopped");
            DrainOutcome::Forced { aborted }
        };

        metrics::record_drain(outcome);
        outcome
    }
}

/// Accept until the lifecycle signal fires, then hand the live connections
/// back for draining. The listener is dropped on return.
async fn accept_loop(
    listener: BoundedListener,
    router: Router,
    observer: LifecycleObserver,
) -> ConnectionSet {
    let mut connections = ConnectionSet::new();

    loop {
        let accepted = tokio::select! {
            biased;
            _ = observer.stopping() => break,
            accepted = listener.accept() => accepted,
        };

        match accepted {
            Ok((stream, peer, permit)) => {
                connections.serve(stream, peer, permit, router.clone());
            }
            Err(e) => {
                tracing::warn!(error = %e, "Accept failed");
                time::sleep(ACCEPT_ERROR_BACKOFF).await;
            }
        }
        connections.reap();
    }

    connections
}

/// Serve on a bare listener with the default connection limit and return
/// after the server has stopped.
pub async fn run_with_graceful_shutdown(
    observer: LifecycleObserver,
    router: Router,
    listener: TcpListener,
    grace: Duration,
) -> DrainOutcome {
    let listener = BoundedListener::from_tcp(listener, DEFAULT_MAX_CONNECTIONS);
    DrainSequencer::new(grace).run(listener, router, observer).await
}
