//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → env.rs (environment overlay)
//!     → validation.rs (semantic checks)
//!     → BootstrapConfig (validated, immutable)
//!     → RegistrarConfig → Registrar, ServerConfig → DrainSequencer
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; cadence and timeouts never change at runtime
//! - All fields have defaults to allow minimal configs
//! - Malformed environment values fall back with a warning instead of failing

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load, load_config, ConfigError};
pub use schema::{BootstrapConfig, ObservabilityConfig, RegistrarConfig, ServerConfig};
pub use validation::ValidationError;
