//! # Configuration Settings
//!
//! Defines the settings consumed by the translation core: upstream TLS and
//! keystore material, DNS behavior, health checking, retries, timeouts, wire
//! logging, and the tracing collector. Defaults mirror the production
//! deployment; every field can be overridden by the enclosing control plane
//! before translation.

use crate::errors::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Top-level settings for the translation core.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GatewaySettings {
    /// Upstream cluster connect timeout in seconds
    #[serde(default = "default_cluster_timeout_secs")]
    pub cluster_timeout_secs: u64,

    /// Key material presented to upstreams for mutual TLS
    #[validate(nested)]
    pub key_store: KeyStoreSettings,

    /// Upstream connection behavior
    #[validate(nested)]
    pub upstream: UpstreamSettings,

    /// Request/response wire logging emitted from the router
    pub wire_log: WireLogSettings,

    /// Tracing collector the router publishes spans to
    #[validate(nested)]
    pub tracing: TracingSettings,
}

fn default_cluster_timeout_secs() -> u64 {
    20
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            cluster_timeout_secs: default_cluster_timeout_secs(),
            key_store: KeyStoreSettings::default(),
            upstream: UpstreamSettings::default(),
            wire_log: WireLogSettings::default(),
            tracing: TracingSettings::default(),
        }
    }
}

impl GatewaySettings {
    /// Validate the entire settings tree
    pub fn validate_settings(&self) -> Result<()> {
        Validate::validate(self)?;
        Ok(())
    }

    /// Upstream connect timeout as a `Duration`
    pub fn cluster_timeout(&self) -> Duration {
        Duration::from_secs(self.cluster_timeout_secs)
    }
}

/// Paths to the router's upstream client key pair.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct KeyStoreSettings {
    /// Private key presented to upstreams
    #[validate(length(min = 1, message = "Key path cannot be empty"))]
    pub key_path: String,

    /// Certificate presented to upstreams
    #[validate(length(min = 1, message = "Certificate path cannot be empty"))]
    pub cert_path: String,
}

impl Default for KeyStoreSettings {
    fn default() -> Self {
        Self {
            key_path: "/home/wso2/security/keystore/mg.key".to_string(),
            cert_path: "/home/wso2/security/keystore/mg.pem".to_string(),
        }
    }
}

/// Upstream connection behavior.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct UpstreamSettings {
    #[validate(nested)]
    pub tls: UpstreamTlsSettings,

    #[validate(nested)]
    pub timeouts: UpstreamTimeoutSettings,

    #[validate(nested)]
    pub health: HealthCheckSettings,

    pub retry: RetrySettings,

    pub dns: DnsSettings,

    #[validate(nested)]
    pub http2: Http2Settings,
}

/// TLS behavior toward upstreams.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpstreamTlsSettings {
    /// Minimum TLS protocol version (`TLS1_0` .. `TLS1_3`; anything else
    /// leaves negotiation automatic)
    pub minimum_protocol_version: String,

    /// Maximum TLS protocol version
    pub maximum_protocol_version: String,

    /// Comma-separated cipher suite list
    pub ciphers: String,

    /// Trusted CA bundle used when no per-upstream certificate is supplied
    #[validate(length(min = 1, message = "Trusted certificate path cannot be empty"))]
    pub trusted_cert_path: String,

    /// Pin the upstream certificate subject alternative name to the host
    pub verify_host_name: bool,

    /// Disable upstream certificate verification entirely
    pub disable_ssl_verification: bool,
}

impl Default for UpstreamTlsSettings {
    fn default() -> Self {
        Self {
            minimum_protocol_version: "TLS1_1".to_string(),
            maximum_protocol_version: "TLS1_2".to_string(),
            ciphers: "ECDHE-ECDSA-AES128-GCM-SHA256, ECDHE-RSA-AES128-GCM-SHA256, \
                      ECDHE-ECDSA-AES128-SHA, ECDHE-RSA-AES128-SHA, AES128-GCM-SHA256, \
                      AES128-SHA, ECDHE-ECDSA-AES256-GCM-SHA384, ECDHE-RSA-AES256-GCM-SHA384, \
                      ECDHE-ECDSA-AES256-SHA, ECDHE-RSA-AES256-SHA, AES256-GCM-SHA384, AES256-SHA"
                .to_string(),
            trusted_cert_path: "/etc/ssl/certs/ca-certificates.crt".to_string(),
            verify_host_name: true,
            disable_ssl_verification: false,
        }
    }
}

/// Route-level upstream timeouts.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpstreamTimeoutSettings {
    /// Per-request route timeout in seconds
    #[validate(range(min = 1, message = "Route timeout must be positive"))]
    pub route_timeout_secs: u64,

    /// Idle timeout for the request stream in seconds
    pub route_idle_timeout_secs: u64,
}

impl Default for UpstreamTimeoutSettings {
    fn default() -> Self {
        Self { route_timeout_secs: 60, route_idle_timeout_secs: 300 }
    }
}

/// Active health checking applied to multi-endpoint clusters.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HealthCheckSettings {
    #[validate(range(min = 1, message = "Health check timeout must be positive"))]
    pub timeout_secs: u64,

    #[validate(range(min = 1, message = "Health check interval must be positive"))]
    pub interval_secs: u64,

    #[validate(range(min = 1, max = 10, message = "Healthy threshold must be between 1 and 10"))]
    pub healthy_threshold: u32,

    #[validate(range(min = 1, max = 10, message = "Unhealthy threshold must be between 1 and 10"))]
    pub unhealthy_threshold: u32,
}

impl Default for HealthCheckSettings {
    fn default() -> Self {
        Self { timeout_secs: 1, interval_secs: 18, healthy_threshold: 2, unhealthy_threshold: 2 }
    }
}

/// Retry policy fragments shared by all routes that enable retries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Upstream response codes considered retriable
    pub status_codes: Vec<u32>,

    /// Retry back-off base interval in milliseconds
    pub base_interval_ms: u32,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self { status_codes: vec![504], base_interval_ms: 25 }
    }
}

/// Upstream DNS resolution behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsSettings {
    /// Refresh rate for strict-DNS clusters in milliseconds
    pub refresh_rate_ms: u64,

    /// Honor record TTLs instead of the fixed refresh rate
    pub respect_ttl: bool,
}

impl Default for DnsSettings {
    fn default() -> Self {
        Self { refresh_rate_ms: 5000, respect_ttl: false }
    }
}

/// HTTP/2 options applied to upstreams that negotiate it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Http2Settings {
    pub hpack_table_size: u32,

    #[validate(range(min = 1, message = "Max concurrent streams must be positive"))]
    pub max_concurrent_streams: u32,
}

impl Default for Http2Settings {
    fn default() -> Self {
        Self { hpack_table_size: 4096, max_concurrent_streams: 100 }
    }
}

/// Wire-level request/response logging emitted from the router via Lua.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct WireLogSettings {
    pub enable: bool,
    pub log_body_enabled: bool,
    pub log_headers_enabled: bool,
    pub log_trailers_enabled: bool,
}

/// Zipkin-style tracing collector the router publishes spans to.
///
/// The port is carried as a string because it arrives from an untyped
/// property map; the tracing cluster generator validates it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct TracingSettings {
    pub host: String,
    pub port: String,
    pub endpoint: String,
}
