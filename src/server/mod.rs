//! Server construction helpers.
//!
//! # Responsibilities
//! - Create an axum Router pre-wired with a health endpoint
//! - Wire request tracing
//!
//! Service-specific routes are merged into the returned router before it is
//! handed to the drain sequencer.

pub mod health;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub use health::{HealthReporter, HealthResponse, ServingStatus, OVERALL};

/// Path of the health endpoint.
pub const HEALTH_PATH: &str = "/health";

/// A router serving `GET /health`, and the reporter that controls it. The
/// overall status starts as `Serving`.
pub fn new_server() -> (Router, HealthReporter) {
    let reporter = HealthReporter::serving();
    let router = Router::new()
        .route(HEALTH_PATH, get(health::health_handler))
        .with_state(reporter.clone())
        .layer(TraceLayer::new_for_http());
    (router, reporter)
}
