//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Host-bound TCP listener
//!     → listener.rs (accept, connection limits)
//!     → connection.rs (per-connection task, graceful/forced stop)
//!     → axum Router
//! ```
//!
//! # Design Decisions
//! - Bounded accept prevents resource exhaustion
//! - Each connection is tracked so shutdown can drain or abort it

pub mod connection;
pub mod listener;

pub use connection::{ConnectionId, ConnectionSet};
pub use listener::{BoundedListener, ConnectionPermit, ListenerError};
