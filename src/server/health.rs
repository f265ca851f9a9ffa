//! Health reporting.
//!
//! # Responsibilities
//! - Track serving status per service name ("" is the whole server)
//! - Answer `GET /health[?service=name]`
//!
//! # Design Decisions
//! - Unknown service → 404, not serving → 503, serving → 200
//! - Status map is shared across clones of the reporter

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Key for the overall server status.
pub const OVERALL: &str = "";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServingStatus {
    Serving,
    NotServing,
}

/// Shared handle for updating what `/health` reports.
#[derive(Debug, Clone, Default)]
pub struct HealthReporter {
    statuses: Arc<DashMap<String, ServingStatus>>,
}

impl HealthReporter {
    /// A reporter with the overall status set to `Serving`.
    pub fn serving() -> Self {
        let reporter = Self::default();
        reporter.set_serving_status(OVERALL, ServingStatus::Serving);
        reporter
    }

    pub fn set_serving_status(&self, service: impl Into<String>, status: ServingStatus) {
        let service = service.into();
        let previous = self.statuses.insert(service.clone(), status);
        if previous != Some(status) {
            tracing::debug!(service = %service, status = ?status, "Serving status changed");
        }
    }

    pub fn status(&self, service: &str) -> Option<ServingStatus> {
        self.statuses.get(service).map(|entry| *entry.value())
    }

    /// Mark every known service as not serving.
    pub fn shutdown(&self) {
        for mut entry in self.statuses.iter_mut() {
            *entry.value_mut() = ServingStatus::NotServing;
        }
        tracing::info!("Health status set to NOT_SERVING");
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct HealthQuery {
    #[serde(default)]
    service: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub service: String,
    pub status: Option<ServingStatus>,
}

pub(crate) async fn health_handler(
    State(reporter): State<HealthReporter>,
    Query(query): Query<HealthQuery>,
) -> Response {
    let status = reporter.status(&query.service);
    let code = match status {
        Some(ServingStatus::Serving) => StatusCode::OK,
        Some(ServingStatus::NotServing) => StatusCode::SERVICE_UNAVAILABLE,
        None => StatusCode::NOT_FOUND,
    };

    (
        code,
        Json(HealthResponse {
            service: query.service,
            status,
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serving_by_default() {
        let reporter = HealthReporter::serving();
        assert_eq!(reporter.status(OVERALL), Some(ServingStatus::Serving));
        assert_eq!(reporter.status("gitsvc"), None);
    }

    #[test]
    fn shutdown_marks_everything_not_serving() {
        let reporter = HealthReporter::serving();
        reporter.set_serving_status("gitsvc", ServingStatus::Serving);

        let clone = reporter.clone();
        clone.shutdown();

        assert_eq!(reporter.status(OVERALL), Some(ServingStatus::NotServing));
        assert_eq!(reporter.status("gitsvc"), Some(ServingStatus::NotServing));
    }

    #[test]
    fn status_serializes_in_upper_snake_case() {
        assert_eq!(
            serde_json::to_string(&ServingStatus::NotServing).unwrap(),
            "\"NOT_SERVING\""
        );
    }
}
