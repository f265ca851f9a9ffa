//! Registration payloads exchanged with the directory service.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::types::RouteInfo;

/// Body of a single announce call.
///
/// Every announce carries all fields; the directory replaces its stored record
/// wholesale rather than merging partial updates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Unique name of the registering service (e.g. "gitsvc").
    pub service_name: String,

    /// Address (host:port) the directory dials back on.
    pub addr: String,

    /// Scope this instance serves. Empty means unscoped.
    #[serde(default)]
    pub agency_id: String,

    #[serde(default)]
    pub produces: Vec<String>,

    #[serde(default)]
    pub consumes: Vec<String>,

    #[serde(default)]
    pub routes: Vec<RouteInfo>,
}

/// Directory-side record of a live service instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRegistration {
    pub service_name: String,
    pub agency_id: String,
    pub addr: String,
    pub produces: Vec<String>,
    pub consumes: Vec<String>,
    /// Always present; empty when the service declared no routes.
    #[serde(default)]
    pub routes: Vec<RouteInfo>,
    /// Receipt time of the most recent announce from this instance.
    pub last_ping: SystemTime,
}

impl ServiceRegistration {
    /// Record an announce received at `at`.
    pub fn received(request: RegisterRequest, at: SystemTime) -> Self {
        Self {
            service_name: request.service_name,
            agency_id: request.agency_id,
            addr: request.addr,
            produces: request.produces,
            consumes: request.consumes,
            routes: request.routes,
            last_ping: at,
        }
    }

    /// Time elapsed since the last announce, or zero if `last_ping` is ahead
    /// of the local clock.
    pub fn age(&self) -> std::time::Duration {
        self.last_ping.elapsed().unwrap_or_default()
    }
}
