//! Registrar error definitions.

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced while building a registrar. Fatal at startup; the host
/// decides whether to abort.
#[derive(Debug, Error)]
pub enum RegistrarError {
    /// The directory address cannot be turned into a dialable target.
    #[error("invalid directory address {addr:?}: {reason}")]
    Address { addr: String, reason: String },

    /// The registration descriptor could not be encoded.
    #[error("failed to encode registration for {service}: {source}")]
    Encode {
        service: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RegistrarError {
    pub(crate) fn address(addr: &str, reason: impl Into<String>) -> Self {
        Self::Address {
            addr: addr.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failure of a single announce round. Never fatal: the next tick retries.
#[derive(Debug, Error)]
pub enum AnnounceError {
    /// The call did not complete within the per-call timeout.
    #[error("announce timed out after {0:?}")]
    Timeout(Duration),

    /// Connecting or exchanging the request failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The directory answered with a non-success status.
    #[error("directory rejected announce with status {status}")]
    Rejected { status: u16 },

    /// The sender's connection has been released.
    #[error("sender is closed")]
    Closed,
}

impl AnnounceError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AnnounceError::Timeout(_) => "timeout",
            AnnounceError::Transport(_) => "transport",
            AnnounceError::Rejected { .. } => "rejected",
            AnnounceError::Closed => "closed",
        }
    }
}
