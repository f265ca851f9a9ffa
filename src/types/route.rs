//! Route metadata declared by a service at registration time.

use serde::{Deserialize, Serialize};

/// Maps one URL path-parameter placeholder to a top-level field of the
/// downstream request message.
///
/// For the pattern `/{agencyId}/tasks` a binding of `agencyId` → `agency_id`
/// tells the directory to inject the runtime path value into `agency_id`
/// before forwarding the call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathBinding {
    /// Placeholder name as it appears in the URL pattern.
    pub url_param: String,
    /// Top-level field name in the downstream request.
    pub field: String,
}

impl PathBinding {
    pub fn new(url_param: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            url_param: url_param.into(),
            field: field.into(),
        }
    }
}

/// A single HTTP route a service exposes through the directory.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RouteInfo {
    /// HTTP verb (e.g. "GET").
    pub method: String,

    /// URL pattern (e.g. "/{agencyId}/tasks/{taskId}/files").
    pub pattern: String,

    /// Human-readable operation label (e.g. "list_task_files").
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub capability: String,

    /// Fully-qualified downstream method the directory invokes when the route
    /// matches (e.g. "/work.v1.TaskService/CreateTask").
    #[serde(default, rename = "grpc_method", skip_serializing_if = "String::is_empty")]
    pub downstream_method: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path_bindings: Vec<PathBinding>,
}

impl RouteInfo {
    /// Create a route with only the verb and pattern set.
    pub fn new(method: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            pattern: pattern.into(),
            ..Default::default()
        }
    }

    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capability = capability.into();
        self
    }

    pub fn with_downstream_method(mut self, method: impl Into<String>) -> Self {
        self.downstream_method = method.into();
        self
    }

    pub fn with_binding(mut self, url_param: impl Into<String>, field: impl Into<String>) -> Self {
        self.path_bindings.push(PathBinding::new(url_param, field));
        self
    }

    /// Placeholder names in `pattern`, in order of appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        self.pattern
            .split('/')
            .filter_map(|seg| seg.strip_prefix('{').and_then(|s| s.strip_suffix('}')))
            .collect()
    }
}
