//! The API description and its resources.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{EndpointGroup, InterceptEndpoint, InterceptorLevel, NamedEndpointGroup};

/// Kind of traffic the API serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApiType {
    #[default]
    Rest,
    Ws,
}

/// A named, versioned collection of resources served over HTTP or WebSocket.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiDescription {
    pub title: String,
    pub version: String,
    pub id: String,
    pub api_type: ApiType,

    /// Base-path override declared via `x-wso2-basepath`; empty when absent
    #[serde(default)]
    pub x_wso2_basepath: String,
    /// When set, the API is additionally reachable without its version
    /// suffix in the base path
    #[serde(default)]
    pub is_default_version: bool,

    #[serde(default)]
    pub prod_endpoints: Option<EndpointGroup>,
    #[serde(default)]
    pub sand_endpoints: Option<EndpointGroup>,
    /// Additional named clusters (`x-wso2-endpoints`) referenced by resources
    #[serde(default)]
    pub x_wso2_endpoints: Vec<NamedEndpointGroup>,

    /// API-level interceptors resolved from vendor extensions by ingestion
    #[serde(default)]
    pub request_interceptor: Option<InterceptEndpoint>,
    #[serde(default)]
    pub response_interceptor: Option<InterceptEndpoint>,

    #[serde(default)]
    pub cors: Option<CorsConfiguration>,

    pub resources: Vec<Resource>,

    #[serde(default)]
    pub http2_backend_enabled: bool,
    /// Buffer the request body into the authorization callout
    #[serde(default)]
    pub pass_request_payload_to_enforcer: bool,
    /// Authorization header name; opaque to this core, carried for the
    /// enforcer
    #[serde(default)]
    pub auth_header: String,
}

/// A single URL template within an API.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Resource {
    pub id: String,
    /// Path template with `{name}` parameters and an optional trailing `/*`
    pub path: String,
    pub operations: Vec<Operation>,

    #[serde(default)]
    pub prod_endpoints: Option<EndpointGroup>,
    #[serde(default)]
    pub sand_endpoints: Option<EndpointGroup>,

    #[serde(default)]
    pub request_interceptor: Option<InterceptEndpoint>,
    #[serde(default)]
    pub response_interceptor: Option<InterceptEndpoint>,

    /// Upstream path the resource rewrites to; empty when no rewrite applies
    #[serde(default)]
    pub rewrite_path: String,
    /// Move method validation from the router to the authorization callout
    /// so the method can be rewritten later
    #[serde(default)]
    pub rewrite_method: bool,
}

impl Resource {
    pub fn method_names(&self) -> Vec<String> {
        self.operations.iter().map(|op| op.method.clone()).collect()
    }

    /// Resolve the per-method interceptor map for this resource: an
    /// operation-level declaration wins, then the resource level, then the
    /// API level. Disabled records are skipped entirely.
    pub fn operation_interceptors(
        &self,
        api_level: &InterceptEndpoint,
        resource_level: &InterceptEndpoint,
        is_request_flow: bool,
    ) -> HashMap<String, InterceptEndpoint> {
        let mut interceptors = HashMap::new();
        for operation in &self.operations {
            let declared = if is_request_flow {
                operation.request_interceptor.as_ref()
            } else {
                operation.response_interceptor.as_ref()
            };
            let chosen = match declared {
                Some(op_level) if op_level.enable => {
                    let mut op_level = op_level.clone();
                    op_level.level = InterceptorLevel::Operation;
                    op_level
                }
                _ if resource_level.enable => resource_level.clone(),
                _ if api_level.enable => api_level.clone(),
                _ => continue,
            };
            interceptors.insert(operation.method.clone(), chosen);
        }
        interceptors
    }
}

/// One HTTP method on a resource, with optional operation-scoped
/// interceptors.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Operation {
    pub method: String,
    #[serde(default)]
    pub request_interceptor: Option<InterceptEndpoint>,
    #[serde(default)]
    pub response_interceptor: Option<InterceptEndpoint>,
}

impl Operation {
    pub fn new(method: impl Into<String>) -> Self {
        Self { method: method.into(), ..Default::default() }
    }
}

/// CORS policy declared for the API.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CorsConfiguration {
    pub enabled: bool,
    #[serde(default)]
    pub allow_origins: Vec<String>,
    #[serde(default)]
    pub allow_credentials: bool,
    #[serde(default)]
    pub allow_methods: Vec<String>,
    #[serde(default)]
    pub allow_headers: Vec<String>,
    #[serde(default)]
    pub expose_headers: Vec<String>,
}
