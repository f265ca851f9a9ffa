//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Durations are written as humantime strings ("30s", "1m 30s").

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::registrar::{Cadence, CadencePolicy};
use crate::types::RouteInfo;

/// Root configuration for a hosted service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Directory registration and heartbeat settings.
    pub registrar: RegistrarConfig,

    /// Listener and shutdown settings.
    pub server: ServerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Directory registration settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistrarConfig {
    /// Directory service address (e.g., "localhost:50050").
    pub directory_addr: String,

    /// Address this instance is reachable on, sent with every announce.
    pub advertise_addr: String,

    /// Scope this instance serves; empty for unscoped instances.
    pub scope_id: String,

    /// Unique service name (e.g., "gitsvc").
    pub service_name: String,

    /// Topics this service publishes.
    pub produces: Vec<String>,

    /// Topics this service subscribes to.
    pub consumes: Vec<String>,

    /// HTTP routes the directory should proxy to this service.
    pub routes: Vec<RouteInfo>,

    /// Heartbeat cadence. Zero sends a single announce.
    #[serde(with = "humantime_serde")]
    pub heartbeat_interval: Duration,

    /// Per-announce timeout.
    #[serde(with = "humantime_serde")]
    pub heartbeat_timeout: Duration,
}

impl RegistrarConfig {
    pub fn policy(&self) -> CadencePolicy {
        CadencePolicy::new(
            Cadence::from_interval(self.heartbeat_interval),
            self.heartbeat_timeout,
        )
    }
}

impl Default for RegistrarConfig {
    fn default() -> Self {
        Self {
            directory_addr: "localhost:50050".to_string(),
            advertise_addr: "localhost:50051".to_string(),
            scope_id: String::new(),
            service_name: String::new(),
            produces: Vec::new(),
            consumes: Vec::new(),
            routes: Vec::new(),
            heartbeat_interval: Duration::from_secs(20),
            heartbeat_timeout: Duration::from_secs(5),
        }
    }
}

/// Listener and drain configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:50051").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,

    /// Time allowed for in-flight requests to finish on shutdown.
    #[serde(with = "humantime_serde")]
    pub drain_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:50051".to_string(),
            max_connections: 10_000,
            drain_grace: Duration::from_secs(30),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
