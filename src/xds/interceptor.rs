//! Interceptor callout compilation.
//!
//! Interceptors are external HTTP services invoked from an inline Lua script
//! on the request and/or response path. This module builds the upstream
//! cluster for a callout target and renders the per-route Lua override from
//! typed template contexts.

use std::collections::{BTreeMap, HashMap};

use envoy_types::pb::envoy::config::cluster::v3::Cluster;
use envoy_types::pb::envoy::config::core::v3::{data_source::Specifier, Address, DataSource};
use envoy_types::pb::envoy::extensions::filters::http::lua::v3::{
    lua_per_route::Override, LuaPerRoute,
};
use minijinja::Environment;
use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::{debug, error};

use crate::config::{GatewaySettings, WireLogSettings};
use crate::errors::Result;
use crate::model::{CertificateStore, InterceptEndpoint, InterceptorIncludes};

use super::endpoints::build_endpoint_cluster;

/// Inline script logging wire-level request and response data, used when no
/// interceptor is configured for the route.
const WIRE_LOG_TEMPLATE: &str = r#"
local utils = require 'home.wso2.interceptor.lib.utils'
local wire_log_config = {
    log_body_enabled = {{ wire_log.log_body_enabled }},
    log_headers_enabled = {{ wire_log.log_headers_enabled }},
    log_trailers_enabled = {{ wire_log.log_trailers_enabled }}
}
function envoy_on_request(request_handle)
    utils.wire_log(request_handle, " >> request body >> ", " >> request headers >> ", " >> request trailers >> ", wire_log_config)
end

function envoy_on_response(response_handle)
    utils.wire_log(response_handle, " << response body << ", " << response headers << ", " << response trailers << ", wire_log_config)
end"#;

/// Inline script dispatching interceptor callouts. The request and response
/// halves are rendered only for the flows that carry interceptor records.
const INTERCEPTOR_TEMPLATE: &str = r#"
local interceptor = require 'home.wso2.interceptor.lib.interceptor'
{%- if wire_log.enable %}
local utils = require 'home.wso2.interceptor.lib.utils'
local wire_log_config = {
    log_body_enabled = {{ wire_log.log_body_enabled }},
    log_headers_enabled = {{ wire_log.log_headers_enabled }},
    log_trailers_enabled = {{ wire_log.log_trailers_enabled }}
}
{%- endif %}
local inv_context = {
    organizationId = "{{ context.organization_id }}",
    basePath = "{{ context.base_path }}",
    supportedMethods = "{{ context.supported_methods }}",
    apiName = "{{ context.api_name }}",
    apiVersion = "{{ context.api_version }}",
    pathTemplate = "{{ context.path_template }}",
    vhost = "{{ context.vhost }}",
    prodClusterName = "{{ context.prod_cluster_name }}",
    sandClusterName = "{{ context.sand_cluster_name }}"
}
{%- if is_request_flow_enabled %}
local req_flow_list = {
{%- for method, call in request_flow|items %}
    ["{{ method }}"] = {
        cluster_name = "{{ call.cluster_name }}",
        timeout = {{ call.timeout_ms }},
        include_invocation_context = {{ call.includes.invocation_context }},
        include_request_body = {{ call.includes.request_body }},
        include_request_headers = {{ call.includes.request_headers }},
        include_request_trailers = {{ call.includes.request_trailers }}
    },
{%- endfor %}
}
{%- endif %}
{%- if is_response_flow_enabled %}
local res_flow_list = {
{%- for method, call in response_flow|items %}
    ["{{ method }}"] = {
        cluster_name = "{{ call.cluster_name }}",
        timeout = {{ call.timeout_ms }},
        include_invocation_context = {{ call.includes.invocation_context }},
        include_response_body = {{ call.includes.response_body }},
        include_response_headers = {{ call.includes.response_headers }},
        include_response_trailers = {{ call.includes.response_trailers }}
    },
{%- endfor %}
}
{%- endif %}
function envoy_on_request(request_handle)
{%- if is_request_flow_enabled %}
    interceptor.handle_request_interceptor(request_handle, req_flow_list, inv_context)
{%- endif %}
{%- if wire_log.enable %}
    utils.wire_log(request_handle, " >> request body >> ", " >> request headers >> ", " >> request trailers >> ", wire_log_config)
{%- endif %}
end

function envoy_on_response(response_handle)
{%- if is_response_flow_enabled %}
    interceptor.handle_response_interceptor(response_handle, res_flow_list, inv_context)
{%- endif %}
{%- if wire_log.enable %}
    utils.wire_log(response_handle, " << response body << ", " << response headers << ", " << response trailers << ", wire_log_config)
{%- endif %}
end"#;

static TEMPLATES: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.add_template("wire_log", WIRE_LOG_TEMPLATE).expect("wire log template parses");
    env.add_template("interceptor", INTERCEPTOR_TEMPLATE).expect("interceptor template parses");
    env
});

/// Everything the interceptor runtime needs to identify the call site,
/// rendered into the script verbatim.
#[derive(Debug, Clone, Serialize, Default)]
pub struct InvocationContext {
    pub organization_id: String,
    pub base_path: String,
    pub supported_methods: String,
    pub api_name: String,
    pub api_version: String,
    pub path_template: String,
    pub vhost: String,
    pub prod_cluster_name: String,
    pub sand_cluster_name: String,
}

#[derive(Serialize)]
struct CallConfig<'a> {
    cluster_name: &'a str,
    timeout_ms: u64,
    includes: &'a InterceptorIncludes,
}

#[derive(Serialize)]
struct InterceptorScriptContext<'a> {
    context: &'a InvocationContext,
    is_request_flow_enabled: bool,
    is_response_flow_enabled: bool,
    request_flow: BTreeMap<&'a str, CallConfig<'a>>,
    response_flow: BTreeMap<&'a str, CallConfig<'a>>,
    wire_log: &'a WireLogSettings,
}

#[derive(Serialize)]
struct WireLogScriptContext<'a> {
    wire_log: &'a WireLogSettings,
}

/// Build the upstream cluster for one interceptor callout by delegating to
/// the endpoint compiler with the interceptor's single-endpoint group.
pub fn build_interceptor_cluster(
    cert_store: &CertificateStore,
    endpoint: &InterceptEndpoint,
    settings: &GatewaySettings,
) -> Result<(Cluster, Vec<Address>)> {
    debug!(cluster = %endpoint.cluster_name, "Creating interceptor callout cluster");
    let base_path = endpoint
        .endpoint_cluster
        .endpoints
        .first()
        .map(|upstream| upstream.basepath.clone())
        .unwrap_or_default();
    build_endpoint_cluster(
        &endpoint.cluster_name,
        &endpoint.endpoint_cluster,
        cert_store,
        endpoint.cluster_timeout_secs,
        &base_path,
        settings,
    )
}

/// Produce the per-route Lua filter override.
///
/// Without interceptors the filter is disabled outright, or replaced by the
/// wire-log script when wire logging is on. With interceptors on either
/// flow, the combined script is rendered from the invocation context and the
/// per-method callout records.
pub fn lua_per_route(
    request_interceptors: &HashMap<String, InterceptEndpoint>,
    response_interceptors: &HashMap<String, InterceptEndpoint>,
    context: &InvocationContext,
    wire_log: &WireLogSettings,
) -> LuaPerRoute {
    if request_interceptors.is_empty() && response_interceptors.is_empty() {
        if wire_log.enable {
            return match TEMPLATES
                .get_template("wire_log")
                .expect("registered template")
                .render(WireLogScriptContext { wire_log })
            {
                Ok(script) => LuaPerRoute { filter_context: None, r#override: Some(Override::SourceCode(inline(script))) },
                Err(err) => {
                    error!(error = %err, "Failed to render wire log script; disabling Lua filter");
                    LuaPerRoute { filter_context: None, r#override: Some(Override::Disabled(true)) }
                }
            };
        }
        return LuaPerRoute { filter_context: None, r#override: Some(Override::Disabled(true)) };
    }

    let script_context = InterceptorScriptContext {
        context,
        is_request_flow_enabled: !request_interceptors.is_empty(),
        is_response_flow_enabled: !response_interceptors.is_empty(),
        request_flow: flow_list(request_interceptors),
        response_flow: flow_list(response_interceptors),
        wire_log,
    };

    match TEMPLATES
        .get_template("interceptor")
        .expect("registered template")
        .render(script_context)
    {
        Ok(script) => LuaPerRoute { filter_context: None, r#override: Some(Override::SourceCode(inline(script))) },
        Err(err) => {
            error!(error = %err, "Failed to render interceptor script; disabling Lua filter");
            LuaPerRoute { filter_context: None, r#override: Some(Override::Disabled(true)) }
        }
    }
}

fn flow_list(interceptors: &HashMap<String, InterceptEndpoint>) -> BTreeMap<&str, CallConfig<'_>> {
    interceptors
        .iter()
        .map(|(method, endpoint)| {
            (
                method.as_str(),
                CallConfig {
                    cluster_name: &endpoint.cluster_name,
                    timeout_ms: endpoint.request_timeout_millis(),
                    includes: &endpoint.includes,
                },
            )
        })
        .collect()
}

fn inline(script: String) -> DataSource {
    DataSource { specifier: Some(Specifier::InlineString(script)), ..Default::default() }
}
