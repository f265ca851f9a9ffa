//! Metrics collection and exposition.
//!
//! # Metrics
//! - `registrar_announces_total` (counter): announces by service and outcome
//! - `server_drains_total` (counter): server stops by outcome
//! - `server_drain_aborted_connections_total` (counter): connections killed by forced stops
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::lifecycle::DrainOutcome;
use crate::registrar::AnnounceError;

/// Install the Prometheus exporter on `addr`. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_announce(service: &str, error: Option<&AnnounceError>) {
    count_announce(service, error.map_or("ok", AnnounceError::kind));
}

/// An announce dropped by shutdown before it completed.
pub fn record_announce_interrupted(service: &str) {
    count_announce(service, "interrupted");
}

fn count_announce(service: &str, outcome: &'static str) {
    counter!(
        "registrar_announces_total",
        "service" => service.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_drain(outcome: DrainOutcome) {
    counter!("server_drains_total", "outcome" => outcome.as_str()).increment(1);
    if let DrainOutcome::Forced { aborted } = outcome {
        counter!("server_drain_aborted_connections_total").increment(aborted as u64);
    }
}
