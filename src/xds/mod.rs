//! Envoy configuration generation.
//!
//! Compiles the API model into xDS v3 routes, clusters, and addresses:
//! - [`naming`] mints deterministic cluster names
//! - [`endpoints`] compiles endpoint groups into clusters
//! - [`interceptor`] compiles callout clusters and inline Lua overrides
//! - [`route`] compiles per-resource routes
//! - [`translator`] orchestrates a full API translation

pub mod endpoints;
pub mod interceptor;
pub mod naming;
pub mod route;
pub mod translator;

use envoy_types::pb::envoy::config::cluster::v3::Cluster;
use envoy_types::pb::envoy::config::core::v3::Address;
use envoy_types::pb::envoy::config::route::v3::Route;

pub use translator::{health_route, ready_route, token_route, tracing_cluster, translate};

/// Header carrying the destination cluster name, injected by the
/// authorization filter and consumed by the route's cluster specifier.
pub const CLUSTER_HEADER_NAME: &str = "x-wso2-cluster-header";

/// Pseudo-header matched for HTTP method validation.
pub const HTTP_METHOD_HEADER: &str = ":method";

/// Upstream service time header stripped from responses.
pub const UPSTREAM_SERVICE_TIME_HEADER: &str = "x-envoy-upstream-service-time";

/// Expected request timeout header stripped before forwarding upstream.
pub const EXPECTED_TIMEOUT_HEADER: &str = "x-envoy-expected-rq-timeout-ms";

/// Well-known HTTP filter names used as per-route override keys.
pub const EXT_AUTHZ_FILTER_NAME: &str = "envoy.filters.http.ext_authz";
pub const LUA_FILTER_NAME: &str = "envoy.filters.http.lua";

/// Extension type URLs for per-route overrides and cluster options.
pub const EXT_AUTHZ_PER_ROUTE_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.filters.http.ext_authz.v3.ExtAuthzPerRoute";
pub const LUA_PER_ROUTE_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.filters.http.lua.v3.LuaPerRoute";
pub const UPSTREAM_TLS_CONTEXT_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.transport_sockets.tls.v3.UpstreamTlsContext";
pub const HTTP_PROTOCOL_OPTIONS_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.upstreams.http.v3.HttpProtocolOptions";
pub const HTTP_PROTOCOL_OPTIONS_EXTENSION_KEY: &str =
    "envoy.extensions.upstreams.http.v3.HttpProtocolOptions";

/// Transport socket name for TLS upstreams.
pub const TLS_TRANSPORT_SOCKET_NAME: &str = "envoy.transport_sockets.tls";

/// Endpoint prefixes containing this marker belong to `x-wso2-endpoints`
/// named clusters; the named-endpoints pass owns their cluster creation.
pub const NAMED_ENDPOINT_CLUSTER_MARKER: &str = "xwso2cluster";

/// Cluster-name prefixes for interceptor callout clusters.
pub const REQUEST_INTERCEPTOR_CLUSTER_PREFIX: &str = "reqInterceptor";
pub const RESPONSE_INTERCEPTOR_CLUSTER_PREFIX: &str = "respInterceptor";

/// Context-extension keys handed to the authorization filter per route.
pub const PATH_CONTEXT_EXTENSION: &str = "path";
pub const VHOST_CONTEXT_EXTENSION: &str = "vHost";
pub const BASE_PATH_CONTEXT_EXTENSION: &str = "basePath";
pub const METHOD_CONTEXT_EXTENSION: &str = "method";
pub const API_VERSION_CONTEXT_EXTENSION: &str = "version";
pub const API_NAME_CONTEXT_EXTENSION: &str = "name";
pub const PROD_CLUSTER_NAME_CONTEXT_EXTENSION: &str = "prodClusterName";
pub const SAND_CLUSTER_NAME_CONTEXT_EXTENSION: &str = "sandClusterName";

/// System endpoints served by the router itself.
pub const TOKEN_PATH: &str = "/testkey";
pub const TOKEN_CLUSTER_NAME: &str = "token_cluster";
pub const HEALTH_PATH: &str = "/health";
pub const HEALTH_ENDPOINT_RESPONSE: &str = "{\"status\": \"healthy\"}";
pub const READY_PATH: &str = "/ready";
pub const READY_ENDPOINT_RESPONSE: &str = "{\"status\": \"ready\"}";

/// Cluster carrying spans to the tracing collector.
pub const TRACING_CLUSTER_NAME: &str = "tracing_cluster";

/// Retry-on policy attached to routes that enable retries.
pub const RETRY_POLICY_RETRIABLE_STATUS_CODES: &str = "retriable-status-codes";

/// Everything a single API translation produces, in emission order.
/// Ownership transfers to the caller; nothing here is shared.
#[derive(Debug, Default)]
pub struct TranslationOutput {
    pub routes: Vec<Route>,
    pub clusters: Vec<Cluster>,
    pub addresses: Vec<Address>,
}
