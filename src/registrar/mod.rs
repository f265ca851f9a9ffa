//! Directory registration heartbeat.
//!
//! # Data Flow
//! ```text
//! RegistrarConfig
//!     → descriptor.rs (immutable identity, encoded once)
//!     → sender.rs (one bounded announce over a lazily-dialed connection)
//!     → heartbeat.rs (immediate announce, then one per tick until shutdown)
//! ```
//!
//! # Design Decisions
//! - Only construction can fail (bad directory address)
//! - Steady-state failures are logged and absorbed; the next tick retries
//! - One-shot and periodic cadence are distinct variants, not a sentinel

pub mod cadence;
pub mod descriptor;
pub mod error;
pub mod heartbeat;
pub mod sender;

use std::sync::Arc;

pub use cadence::{Cadence, CadencePolicy};
pub use descriptor::RegistrationDescriptor;
pub use error::{AnnounceError, RegistrarError};
pub use heartbeat::{Announce, HeartbeatLoop, HeartbeatReport, LoopState};
pub use sender::{HeartbeatSender, REGISTER_PATH};

use crate::config::RegistrarConfig;
use crate::lifecycle::LifecycleObserver;

/// Announces a service to the directory and keeps the registration fresh.
///
/// Start with [`Registrar::run`] in its own task; stop by triggering the
/// lifecycle signal, then call [`Registrar::close`].
pub struct Registrar {
    sender: Arc<HeartbeatSender>,
    heartbeat: HeartbeatLoop<HeartbeatSender>,
    policy: CadencePolicy,
}

impl Registrar {
    /// Build a registrar for the directory at `directory_addr`.
    pub fn new(
        directory_addr: &str,
        descriptor: RegistrationDescriptor,
        policy: CadencePolicy,
    ) -> Result<Self, RegistrarError> {
        let sender = Arc::new(HeartbeatSender::new(
            directory_addr,
            descriptor,
            policy.call_timeout,
        )?);
        let heartbeat = HeartbeatLoop::new(sender.clone(), policy.cadence);

        Ok(Self {
            sender,
            heartbeat,
            policy,
        })
    }

    pub fn from_config(config: &RegistrarConfig) -> Result<Self, RegistrarError> {
        Self::new(
            &config.directory_addr,
            RegistrationDescriptor::from_config(config),
            config.policy(),
        )
    }

    /// Announce immediately, then keep announcing at the configured cadence
    /// until `observer` reports stopping.
    pub async fn run(&self, observer: LifecycleObserver) -> HeartbeatReport {
        tracing::info!(
            service = self.sender.descriptor().service_name(),
            directory = self.sender.directory(),
            cadence = %self.policy.cadence,
            timeout = ?self.policy.call_timeout,
            "Starting directory heartbeat"
        );
        self.heartbeat.run(&observer).await
    }

    /// Release the directory connection. Idempotent.
    pub fn close(&self) {
        self.sender.close();
    }

    pub fn sender(&self) -> &HeartbeatSender {
        &self.sender
    }

    pub fn policy(&self) -> CadencePolicy {
        self.policy
    }

    pub fn state(&self) -> tokio::sync::watch::Receiver<LoopState> {
        self.heartbeat.state()
    }
}

impl std::fmt::Debug for Registrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = *self.heartbeat.state().borrow();
        f.debug_struct("Registrar")
            .field("sender", &self.sender)
            .field("policy", &self.policy)
            .field("state", &state)
            .finish()
    }
}
