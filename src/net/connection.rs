//! Connection lifecycle tracking.
//!
//! # Responsibilities
//! - Serve each accepted connection in its own task
//! - Generate unique connection IDs for tracing
//! - Drain connections gracefully, or abort them all on demand
//!
//! # Connection States
//! ```text
//! Active → Draining (graceful shutdown sent) → Closed
//!        ↘ Aborted (forced stop)
//! ```

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::Router;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use hyper_util::server::graceful::GracefulShutdown;
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpStream;
use tokio::task::JoinSet;

use crate::net::ConnectionPermit;

/// Only uniqueness is needed, so relaxed ordering suffices.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn next() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Connections owned by one server.
///
/// Each connection runs in a task of an internal `JoinSet` and is registered
/// with a graceful-shutdown watcher, so the set can either ask every
/// connection to finish its in-flight requests or abort them outright.
pub struct ConnectionSet {
    builder: Builder<TokioExecutor>,
    tasks: JoinSet<()>,
    graceful: Option<GracefulShutdown>,
}

impl ConnectionSet {
    pub fn new() -> Self {
        Self {
            builder: Builder::new(TokioExecutor::new()),
            tasks: JoinSet::new(),
            graceful: Some(GracefulShutdown::new()),
        }
    }

    /// Serve `router` on an accepted stream (HTTP/1.1 or HTTP/2).
    ///
    /// Returns `None` once draining has started; the stream is dropped.
    pub fn serve(
        &mut self,
        stream: TcpStream,
        peer: SocketAddr,
        permit: ConnectionPermit,
        router: Router,
    ) -> Option<ConnectionId> {
        let Some(graceful) = self.graceful.as_ref() else {
            tracing::debug!(peer_addr = %peer, "Rejecting connection, server is draining");
            return None;
        };

        let id = ConnectionId::next();
        let service = TowerToHyperService::new(router);
        let conn = self
            .builder
            .serve_connection_with_upgrades(TokioIo::new(stream), service)
            .into_owned();
        let conn = graceful.watch(conn);

        self.tasks.spawn(async move {
            let _permit = permit;
            tracing::trace!(connection_id = %id, peer_addr = %peer, "Connection active");
            if let Err(e) = conn.await {
                tracing::debug!(connection_id = %id, error = %e, "Connection ended with error");
            }
            tracing::trace!(connection_id = %id, "Connection closed");
        });

        Some(id)
    }

    /// Drop bookkeeping for connections that already finished.
    pub fn reap(&mut self) {
        while self.tasks.try_join_next().is_some() {}
    }

    /// Connections whose tasks have not yet been joined.
    pub fn active_count(&self) -> usize {
        self.tasks.len()
    }

    /// Ask every connection to finish in-flight requests and close, then wait
    /// for all of them. Cancel-safe: a forced stop may follow.
    pub async fn drain(&mut self) {
        if let Some(graceful) = self.graceful.take() {
            graceful.shutdown().await;
        }
        while self.tasks.join_next().await.is_some() {}
    }

    /// Abort every remaining connection task and wait for them to unwind.
    /// Returns how many were aborted.
    pub async fn abort_all(&mut self) -> usize {
        self.graceful = None;
        let remaining = self.tasks.len();
        self.tasks.shutdown().await;
        remaining
    }
}

impl Default for ConnectionSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_id_unique() {
        let id1 = ConnectionId::next();
        let id2 = ConnectionId::next();
        assert_ne!(id1, id2);
        assert!(id1.to_string().starts_with("conn-"));
    }

    #[tokio::test]
    async fn empty_set_drains_immediately() {
        let mut set = ConnectionSet::new();
        assert_eq!(set.active_count(), 0);
        tokio::time::timeout(std::time::Duration::from_millis(100), set.drain())
            .await
            .unwrap();
        assert_eq!(set.abort_all().await, 0);
    }
}
