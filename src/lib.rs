//! Bootstrap helpers shared by services in a microservice mesh.
//!
//! - [`registrar`]: announce this instance to the directory service and keep
//!   the registration fresh
//! - [`lifecycle`]: one shutdown signal, observed by every component, and a
//!   bounded drain for the server
//! - [`server`]: router with a health endpoint

pub mod config;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod registrar;
pub mod server;
pub mod types;

pub use config::BootstrapConfig;
pub use lifecycle::{DrainOutcome, DrainSequencer, LifecycleObserver, LifecycleSignal};
pub use registrar::{Cadence, CadencePolicy, Registrar, RegistrationDescriptor};
