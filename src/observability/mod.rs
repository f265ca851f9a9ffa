//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Registrar and drain sequencer produce:
//!     → logging.rs (structured log events with service/directory fields)
//!     → metrics.rs (announce and drain counters)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;
