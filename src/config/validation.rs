//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Required identity fields are present
//! - Timeouts and grace periods are non-zero
//! - Declared routes are well-formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: BootstrapConfig → Result<(), Vec<ValidationError>>

use axum::http::Method;
use thiserror::Error;

use crate::config::schema::BootstrapConfig;
use crate::types::RouteInfo;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    Missing(&'static str),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("route #{index} ({method} {pattern}): {reason}")]
    Route {
        index: usize,
        method: String,
        pattern: String,
        reason: String,
    },
}

pub fn validate_config(config: &BootstrapConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let registrar = &config.registrar;

    if registrar.service_name.trim().is_empty() {
        errors.push(ValidationError::Missing("registrar.service_name"));
    }
    if registrar.directory_addr.trim().is_empty() {
        errors.push(ValidationError::Missing("registrar.directory_addr"));
    }
    if registrar.advertise_addr.trim().is_empty() {
        errors.push(ValidationError::Missing("registrar.advertise_addr"));
    }
    if registrar.heartbeat_timeout.is_zero() {
        errors.push(ValidationError::Zero("registrar.heartbeat_timeout"));
    }
    if config.server.drain_grace.is_zero() {
        errors.push(ValidationError::Zero("server.drain_grace"));
    }
    if config.server.max_connections == 0 {
        errors.push(ValidationError::Zero("server.max_connections"));
    }

    for (index, route) in registrar.routes.iter().enumerate() {
        if let Err(reason) = check_route(route) {
            errors.push(ValidationError::Route {
                index,
                method: route.method.clone(),
                pattern: route.pattern.clone(),
                reason,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_route(route: &RouteInfo) -> Result<(), String> {
    if route.method.is_empty() || Method::from_bytes(route.method.as_bytes()).is_err() {
        return Err("invalid HTTP method".to_string());
    }
    if !route.pattern.starts_with('/') {
        return Err("pattern must start with '/'".to_string());
    }

    let placeholders = route.placeholders();
    for binding in &route.path_bindings {
        if !placeholders.contains(&binding.url_param.as_str()) {
            return Err(format!(
                "binding for {:?} has no matching placeholder",
                binding.url_param
            ));
        }
        if binding.field.is_empty() {
            return Err(format!("binding for {:?} has an empty field", binding.url_param));
        }
    }
    Ok(())
}
