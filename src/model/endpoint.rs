//! Upstream endpoint groups and their trust material.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One upstream server.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Endpoint {
    pub host: String,
    pub port: u32,
    /// URL scheme: `http`, `https`, `ws`, or `wss`
    pub url_type: String,
    /// Upstream base path; a trailing slash is ignored for comparison
    pub basepath: String,
    /// Original URL string, keys the upstream certificate lookup
    pub raw_url: String,
    /// Service-discovery query recorded for the discovery subsystem
    #[serde(default)]
    pub service_discovery_string: Option<String>,
}

impl Endpoint {
    /// Base path with a single trailing slash removed, the form used for all
    /// base-path comparisons.
    pub fn basepath_normalized(&self) -> &str {
        self.basepath.strip_suffix('/').unwrap_or(&self.basepath)
    }

    /// Whether the scheme carries TLS toward the upstream.
    pub fn is_tls(&self) -> bool {
        self.url_type.starts_with("https") || self.url_type.starts_with("wss")
    }
}

/// An ordered group of endpoints sharing a load-balancing discipline.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EndpointGroup {
    pub endpoints: Vec<Endpoint>,
    /// Matched by prefix: `failover` assigns increasing locality priorities,
    /// anything else load-balances at priority zero
    #[serde(default)]
    pub endpoint_type: String,
    /// Prefix component of the minted cluster name
    #[serde(default)]
    pub endpoint_prefix: String,
    /// Retry and circuit-breaker settings declared with the group
    #[serde(default)]
    pub config: Option<EndpointConfig>,
    /// Propagated from the API for API-level groups
    #[serde(default)]
    pub http2_backend_enabled: bool,
}

impl EndpointGroup {
    pub fn is_failover(&self) -> bool {
        self.endpoint_type.starts_with("failover")
    }

    pub fn has_endpoints(&self) -> bool {
        !self.endpoints.is_empty()
    }
}

/// Optional per-group endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EndpointConfig {
    #[serde(default)]
    pub retry_config: Option<RetryConfig>,
    #[serde(default)]
    pub circuit_breakers: Option<CircuitBreakerConfig>,
}

/// Declared retry intent for an endpoint group. The retry count itself is
/// applied through request headers at runtime; its presence here only gates
/// whether a retry policy is attached to the route.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RetryConfig {
    pub count: u32,
    #[serde(default)]
    pub status_codes: Vec<u32>,
}

/// Circuit-breaker thresholds; a zero value leaves the proxy default in
/// place and is not emitted.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CircuitBreakerConfig {
    pub max_connections: u32,
    pub max_connection_pools: u32,
    pub max_pending_requests: u32,
    pub max_requests: u32,
    pub max_retries: u32,
}

/// A named endpoint group declared at the API level (`x-wso2-endpoints`) and
/// referenced from resources by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedEndpointGroup {
    pub name: String,
    pub group: EndpointGroup,
}

/// Trust material for upstream TLS, keyed by the endpoint's raw URL with an
/// optional `"default"` fallback entry.
#[derive(Debug, Clone, Default)]
pub struct CertificateStore {
    certs: HashMap<String, Vec<u8>>,
}

impl CertificateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, raw_url: impl Into<String>, pem: Vec<u8>) {
        self.certs.insert(raw_url.into(), pem);
    }

    /// Resolve the certificate for an upstream: exact raw-URL match first,
    /// then the `"default"` entry.
    pub fn resolve(&self, raw_url: &str) -> Option<&[u8]> {
        self.certs
            .get(raw_url)
            .or_else(|| self.certs.get("default"))
            .map(Vec::as_slice)
    }
}

impl From<HashMap<String, Vec<u8>>> for CertificateStore {
    fn from(certs: HashMap<String, Vec<u8>>) -> Self {
        Self { certs }
    }
}
