//! Shared utilities for integration tests.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use mesh_bootstrap::registrar::REGISTER_PATH;
use mesh_bootstrap::types::RegisterRequest;
use tokio::net::TcpListener;

/// How the mock directory answers announces.
#[derive(Debug, Clone, Copy)]
#[allow(dead_code)]
pub enum Behaviour {
    Accept,
    Reject(StatusCode),
    Stall(Duration),
}

#[derive(Clone)]
struct DirectoryState {
    behaviour: Behaviour,
    received: Arc<Mutex<Vec<RegisterRequest>>>,
    peers: Arc<Mutex<HashSet<SocketAddr>>>,
}

/// A directory service that records every announce it receives.
pub struct MockDirectory {
    pub addr: SocketAddr,
    received: Arc<Mutex<Vec<RegisterRequest>>>,
    peers: Arc<Mutex<HashSet<SocketAddr>>>,
}

#[allow(dead_code)]
impl MockDirectory {
    pub fn received(&self) -> Vec<RegisterRequest> {
        self.received.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.received.lock().unwrap().len()
    }

    /// Distinct client connections that delivered an announce.
    pub fn connections(&self) -> usize {
        self.peers.lock().unwrap().len()
    }
}

/// Start a mock directory on an ephemeral port.
pub async fn start_mock_directory(behaviour: Behaviour) -> MockDirectory {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let received = Arc::new(Mutex::new(Vec::new()));
    let peers = Arc::new(Mutex::new(HashSet::new()));

    let state = DirectoryState {
        behaviour,
        received: received.clone(),
        peers: peers.clone(),
    };
    let app = Router::new()
        .route(REGISTER_PATH, post(register))
        .with_state(state);

    tokio::spawn(async move {
        let _ = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await;
    });

    MockDirectory {
        addr,
        received,
        peers,
    }
}

async fn register(
    State(state): State<DirectoryState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Json(req): Json<RegisterRequest>,
) -> StatusCode {
    state.peers.lock().unwrap().insert(peer);
    state.received.lock().unwrap().push(req);
    match state.behaviour {
        Behaviour::Accept => StatusCode::OK,
        Behaviour::Reject(status) => status,
        Behaviour::Stall(delay) => {
            tokio::time::sleep(delay).await;
            StatusCode::OK
        }
    }
}

/// An address with nothing listening on it.
#[allow(dead_code)]
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
