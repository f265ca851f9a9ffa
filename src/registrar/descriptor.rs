//! The immutable identity a service announces.

use axum::body::Bytes;

use crate::config::RegistrarConfig;
use crate::registrar::RegistrarError;
use crate::types::{RegisterRequest, RouteInfo};

/// Everything a service tells the directory about itself.
///
/// Built once and never mutated; the sender encodes it a single time so every
/// announce carries the identical, complete payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationDescriptor {
    service_name: String,
    advertise_addr: String,
    scope_id: String,
    produces: Vec<String>,
    consumes: Vec<String>,
    routes: Vec<RouteInfo>,
}

impl RegistrationDescriptor {
    pub fn new(service_name: impl Into<String>, advertise_addr: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            advertise_addr: advertise_addr.into(),
            scope_id: String::new(),
            produces: Vec::new(),
            consumes: Vec::new(),
            routes: Vec::new(),
        }
    }

    pub fn from_config(config: &RegistrarConfig) -> Self {
        Self::new(&config.service_name, &config.advertise_addr)
            .with_scope(&config.scope_id)
            .produces(config.produces.iter().cloned())
            .consumes(config.consumes.iter().cloned())
            .routes(config.routes.iter().cloned())
    }

    /// Empty means unscoped.
    pub fn with_scope(mut self, scope_id: impl Into<String>) -> Self {
        self.scope_id = scope_id.into();
        self
    }

    pub fn produces<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.produces.extend(topics.into_iter().map(Into::into));
        self
    }

    pub fn consumes<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.consumes.extend(topics.into_iter().map(Into::into));
        self
    }

    pub fn routes(mut self, routes: impl IntoIterator<Item = RouteInfo>) -> Self {
        self.routes.extend(routes);
        self
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn advertise_addr(&self) -> &str {
        &self.advertise_addr
    }

    pub fn scope_id(&self) -> &str {
        &self.scope_id
    }

    pub fn declared_routes(&self) -> &[RouteInfo] {
        &self.routes
    }

    /// The wire request for this descriptor.
    pub fn to_request(&self) -> RegisterRequest {
        RegisterRequest {
            service_name: self.service_name.clone(),
            addr: self.advertise_addr.clone(),
            agency_id: self.scope_id.clone(),
            produces: self.produces.clone(),
            consumes: self.consumes.clone(),
            routes: self.routes.clone(),
        }
    }

    /// Encode the full request body.
    pub(crate) fn encode(&self) -> Result<Bytes, RegistrarError> {
        serde_json::to_vec(&self.to_request())
            .map(Bytes::from)
            .map_err(|source| RegistrarError::Encode {
                service: self.service_name.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_every_field_in_order() {
        let descriptor = RegistrationDescriptor::new("gitsvc", "10.0.0.5:9001")
            .with_scope("agency-1")
            .produces(["git.repo.created", "git.branch.merged"])
            .consumes(["cross.task.requested"])
            .routes([RouteInfo::new("GET", "/{agencyId}/repos").with_binding("agencyId", "agency_id")]);

        let req = descriptor.to_request();
        assert_eq!(req.service_name, "gitsvc");
        assert_eq!(req.addr, "10.0.0.5:9001");
        assert_eq!(req.agency_id, "agency-1");
        assert_eq!(req.produces, vec!["git.repo.created", "git.branch.merged"]);
        assert_eq!(req.consumes, vec!["cross.task.requested"]);
        assert_eq!(req.routes.len(), 1);
    }

    #[test]
    fn encode_is_stable() {
        let descriptor = RegistrationDescriptor::new("svc", ":9002");
        let first = descriptor.encode().unwrap();
        let second = descriptor.encode().unwrap();
        assert_eq!(first, second);

        let decoded: RegisterRequest = serde_json::from_slice(&first).unwrap();
        assert_eq!(decoded, descriptor.to_request());
        assert!(decoded.agency_id.is_empty());
    }

    #[test]
    fn from_config_copies_identity() {
        let config = RegistrarConfig {
            service_name: "worksvc".into(),
            advertise_addr: "worksvc:9000".into(),
            scope_id: "agency-7".into(),
            produces: vec!["work.task.created".into()],
            ..RegistrarConfig::default()
        };
        let descriptor = RegistrationDescriptor::from_config(&config);
        assert_eq!(descriptor.service_name(), "worksvc");
        assert_eq!(descriptor.advertise_addr(), "worksvc:9000");
        assert_eq!(descriptor.scope_id(), "agency-7");
        assert_eq!(descriptor.to_request().produces, vec!["work.task.created"]);
        assert!(descriptor.declared_routes().is_empty());
    }
}
