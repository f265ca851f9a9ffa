//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → LifecycleSignal::trigger
//!
//! Signal (signal.rs):
//!     One host-owned trigger → many read-only observers
//!
//! Drain (drain.rs):
//!     Signal observed → Stop accepting → Drain connections → Exit
//!                                      ↘ grace elapsed → Abort remaining
//! ```
//!
//! # Design Decisions
//! - Single cancellation source; every component reacts independently
//! - Shutdown has a deadline: forced stop after the grace period
//! - Components never create their own shutdown trigger

pub mod drain;
pub mod signal;
pub mod signals;

pub use drain::{run_with_graceful_shutdown, DrainOutcome, DrainSequencer};
pub use signal::{LifecycleObserver, LifecycleSignal};
pub use signals::trigger_on_os_signal;
