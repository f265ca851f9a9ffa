//! Shared domain types that cross service boundaries.
//!
//! # Data Flow
//! ```text
//! Service declares routes (route.rs)
//!     → RegisterRequest (registration.rs) carried by every announce
//!     → Directory stores ServiceRegistration with the receipt time
//! ```
//!
//! # Design Decisions
//! - Plain data, no behaviour beyond construction helpers
//! - Optional route fields are left out of the wire form when empty
//! - `routes` is always present on the wire, even when empty

pub mod registration;
pub mod route;

pub use registration::{RegisterRequest, ServiceRegistration};
pub use route::{PathBinding, RouteInfo};
