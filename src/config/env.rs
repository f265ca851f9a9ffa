//! Environment variable overlay.
//!
//! Malformed values never abort startup: they are logged and the default
//! (or the value from the config file) is kept.

use std::time::Duration;

use crate::config::schema::BootstrapConfig;
use crate::registrar::Cadence;

pub const DIRECTORY_ADDR: &str = "DIRECTORY_ADDR";
pub const ADVERTISE_ADDR: &str = "ADVERTISE_ADDR";
pub const SCOPE_ID: &str = "SCOPE_ID";
pub const SERVICE_NAME: &str = "SERVICE_NAME";
pub const PRODUCES: &str = "PRODUCES";
pub const CONSUMES: &str = "CONSUMES";
pub const HEARTBEAT_INTERVAL: &str = "HEARTBEAT_INTERVAL";
pub const HEARTBEAT_TIMEOUT: &str = "HEARTBEAT_TIMEOUT";
pub const BIND_ADDR: &str = "BIND_ADDR";
pub const DRAIN_GRACE_SECS: &str = "DRAIN_GRACE_SECS";
pub const METRICS_ADDR: &str = "METRICS_ADDR";

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// `key`'s value, or `default` when unset or empty.
pub fn env_or_default(key: &str, default: &str) -> String {
    non_empty(key).unwrap_or_else(|| default.to_string())
}

/// `key` as a positive whole number of seconds ("30" → 30s). Falls back to
/// `default` when unset, empty, zero, negative or not a number.
pub fn duration_secs_or(key: &str, default: Duration) -> Duration {
    let Some(value) = non_empty(key) else {
        return default;
    };
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Duration::from_secs(secs),
        _ => {
            tracing::warn!(
                key,
                value = %value,
                default = ?default,
                "Not a positive integer, using default"
            );
            default
        }
    }
}

/// `key` as a humantime duration ("10s", "1m 30s"). Falls back to `default`
/// when unset, empty or unparseable.
pub fn duration_or(key: &str, default: Duration) -> Duration {
    let Some(value) = non_empty(key) else {
        return default;
    };
    match humantime::parse_duration(value.trim()) {
        Ok(duration) => duration,
        Err(e) => {
            tracing::warn!(
                key,
                value = %value,
                default = ?default,
                error = %e,
                "Not a valid duration, using default"
            );
            default
        }
    }
}

/// `key` as a heartbeat cadence. Zero or negative durations select one-shot.
pub fn cadence_or(key: &str, default: Cadence) -> Cadence {
    let Some(value) = non_empty(key) else {
        return default;
    };
    match Cadence::parse(&value) {
        Ok(cadence) => cadence,
        Err(e) => {
            tracing::warn!(
                key,
                value = %value,
                default = %default,
                error = %e,
                "Not a valid cadence, using default"
            );
            default
        }
    }
}

/// `key` as a comma-separated list; blank entries are dropped.
pub fn list_or(key: &str, default: &[String]) -> Vec<String> {
    match non_empty(key) {
        Some(value) => value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        None => default.to_vec(),
    }
}

impl BootstrapConfig {
    /// Defaults overlaid with the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overwrite fields whose environment variables are set.
    pub fn apply_env(&mut self) {
        let registrar = &mut self.registrar;
        registrar.directory_addr = env_or_default(DIRECTORY_ADDR, &registrar.directory_addr);
        registrar.advertise_addr = env_or_default(ADVERTISE_ADDR, &registrar.advertise_addr);
        registrar.scope_id = env_or_default(SCOPE_ID, &registrar.scope_id);
        registrar.service_name = env_or_default(SERVICE_NAME, &registrar.service_name);
        registrar.produces = list_or(PRODUCES, &registrar.produces);
        registrar.consumes = list_or(CONSUMES, &registrar.consumes);

        let current = Cadence::from_interval(registrar.heartbeat_interval);
        registrar.heartbeat_interval = cadence_or(HEARTBEAT_INTERVAL, current)
            .interval()
            .unwrap_or(Duration::ZERO);
        registrar.heartbeat_timeout = duration_or(HEARTBEAT_TIMEOUT, registrar.heartbeat_timeout);

        self.server.bind_address = env_or_default(BIND_ADDR, &self.server.bind_address);
        self.server.drain_grace = duration_secs_or(DRAIN_GRACE_SECS, self.server.drain_grace);

        if let Some(addr) = non_empty(METRICS_ADDR) {
            self.observability.metrics_enabled = true;
            self.observability.metrics_address = addr;
        }
    }
}
