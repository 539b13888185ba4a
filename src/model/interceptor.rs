//! External interceptor callout declarations.

use serde::{Deserialize, Serialize};

use super::EndpointGroup;

/// Scope at which an interceptor was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InterceptorLevel {
    #[default]
    Api,
    Resource,
    Operation,
}

/// Payload fragments forwarded to the interceptor service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct InterceptorIncludes {
    pub invocation_context: bool,
    pub request_body: bool,
    pub request_headers: bool,
    pub request_trailers: bool,
    pub response_body: bool,
    pub response_headers: bool,
    pub response_trailers: bool,
}

/// An external HTTP callout invoked from the router's inline Lua script on
/// the request and/or response path.
///
/// `cluster_name` is assigned during translation; operation-level records
/// arrive from ingestion carrying the operation identifier there, which the
/// translator folds into the minted cluster name.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InterceptEndpoint {
    pub enable: bool,
    pub level: InterceptorLevel,
    /// Single-endpoint group hosting the callout service
    pub endpoint_cluster: EndpointGroup,
    #[serde(default)]
    pub cluster_name: String,
    /// Connect timeout for the callout cluster, in seconds
    pub cluster_timeout_secs: u64,
    /// Per-call timeout surfaced to the Lua script, in seconds
    pub request_timeout_secs: u64,
    pub includes: InterceptorIncludes,
}

impl InterceptEndpoint {
    /// Timeout handed to the Lua interceptor runtime, in milliseconds.
    pub fn request_timeout_millis(&self) -> u64 {
        self.request_timeout_secs * 1000
    }
}
