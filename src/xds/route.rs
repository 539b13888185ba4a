//! Route compilation.
//!
//! Builds the route entry for one resource: the regex path match, method
//! header matching, upstream rewrite substitution, CORS and retry policy,
//! per-route authorization and Lua overrides, header mutations, and the
//! sandbox duplicate selected by the cluster header.

use std::collections::HashMap;

use envoy_types::pb::envoy::config::route::v3::{
    header_matcher::HeaderMatchSpecifier,
    retry_policy::RetryBackOff,
    route::Action,
    route_action::{ClusterSpecifier, HostRewriteSpecifier, MaxStreamDuration, UpgradeConfig},
    route_match::PathSpecifier,
    CorsPolicy, Decorator, HeaderMatcher, RetryPolicy, Route, RouteAction, RouteMatch,
};
use envoy_types::pb::envoy::extensions::filters::http::ext_authz::v3::{
    ext_authz_per_route::Override as ExtAuthzOverride, CheckSettings, ExtAuthzPerRoute,
};
use envoy_types::pb::envoy::r#type::matcher::v3::{
    string_matcher::MatchPattern, RegexMatchAndSubstitute, RegexMatcher, StringMatcher,
};
use envoy_types::pb::google::protobuf::{Any, BoolValue, Duration, UInt32Value};
use once_cell::sync::Lazy;
use prost::Message;
use regex::Regex;
use tracing::debug;

use crate::config::GatewaySettings;
use crate::model::{ApiType, CorsConfiguration, EndpointConfig, InterceptEndpoint};

use super::interceptor::{lua_per_route, InvocationContext};
use super::{
    API_NAME_CONTEXT_EXTENSION, API_VERSION_CONTEXT_EXTENSION, BASE_PATH_CONTEXT_EXTENSION,
    CLUSTER_HEADER_NAME, EXPECTED_TIMEOUT_HEADER, EXT_AUTHZ_FILTER_NAME,
    EXT_AUTHZ_PER_ROUTE_TYPE_URL, HTTP_METHOD_HEADER, LUA_FILTER_NAME, LUA_PER_ROUTE_TYPE_URL,
    METHOD_CONTEXT_EXTENSION, PATH_CONTEXT_EXTENSION, PROD_CLUSTER_NAME_CONTEXT_EXTENSION,
    RETRY_POLICY_RETRIABLE_STATUS_CODES, SAND_CLUSTER_NAME_CONTEXT_EXTENSION,
    UPSTREAM_SERVICE_TIME_HEADER, VHOST_CONTEXT_EXTENSION,
};

const PATH_PARAM_REGEX: &str = "([^/]+)";
const WILDCARD_REGEX: &str = "((/(.*))*)";
const TRAILING_SLASH_REGEX: &str = "(/{0,1})";
const QUERY_SUFFIX_REGEX: &str = "(\\?([^/]+))?";

static PATH_PARAM_TEMPLATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[^}]+\}").expect("path parameter pattern parses"));

/// Everything needed to compile one route. The translator assembles one per
/// (resource, environment) pair; sandbox duplicates differ only in the
/// endpoint base path and the `is_sandbox` flag.
#[derive(Debug, Clone, Default)]
pub struct RouteCreateParams {
    pub organization_id: String,
    pub title: String,
    pub version: String,
    pub vhost: String,
    pub api_type: ApiType,
    pub x_wso2_basepath: String,
    pub endpoint_base_path: String,
    pub resource_path: String,
    pub resource_methods: Vec<String>,
    pub prod_cluster_name: String,
    pub sand_cluster_name: String,
    pub prod_endpoint_config: Option<EndpointConfig>,
    pub sand_endpoint_config: Option<EndpointConfig>,
    pub cors: Option<CorsConfiguration>,
    pub request_interceptors: HashMap<String, InterceptEndpoint>,
    pub response_interceptors: HashMap<String, InterceptEndpoint>,
    pub is_default_version: bool,
    pub is_sandbox: bool,
    pub rewrite_path: String,
    pub rewrite_method: bool,
    pub pass_request_payload_to_enforcer: bool,
}

/// Compile one route.
pub fn build_route(params: &RouteCreateParams, settings: &GatewaySettings) -> Route {
    debug!(resource = %params.resource_path, vhost = %params.vhost, "Creating route");

    let base_path_plain = filtered_base_path(&params.x_wso2_basepath, &params.endpoint_base_path);
    let base_path = if params.is_default_version {
        default_version_base_path(&base_path_plain, &params.version)
    } else {
        base_path_plain
    };
    let route_path = generate_route_path(&base_path, &params.resource_path);

    let mut route_match = RouteMatch {
        path_specifier: Some(PathSpecifier::SafeRegex(safe_regex(route_path.clone()))),
        ..Default::default()
    };

    // Method rewriting moves method validation into the authorization
    // callout; the proxy would otherwise reject the rewritten method against
    // this regex.
    if !params.rewrite_method {
        // OPTIONS stays routable even when undeclared so CORS preflight
        // requests reach the route.
        let mut method_regex = params.resource_methods.join("|");
        if !method_regex.contains("OPTIONS") {
            method_regex.push_str("|OPTIONS");
        }
        route_match.headers.push(HeaderMatcher {
            name: HTTP_METHOD_HEADER.to_string(),
            header_match_specifier: Some(HeaderMatchSpecifier::StringMatch(StringMatcher {
                match_pattern: Some(MatchPattern::SafeRegex(safe_regex(format!(
                    "^({})$",
                    method_regex
                )))),
                ..Default::default()
            })),
            ..Default::default()
        });

        // Sandbox duplicates match only when the authorization filter picked
        // the sandbox cluster.
        if params.is_sandbox {
            route_match.headers.push(HeaderMatcher {
                name: CLUSTER_HEADER_NAME.to_string(),
                header_match_specifier: Some(HeaderMatchSpecifier::StringMatch(StringMatcher {
                    match_pattern: Some(MatchPattern::Exact(params.sand_cluster_name.clone())),
                    ..Default::default()
                })),
                ..Default::default()
            });
        }
    }

    // An empty route path only occurs when neither a base path nor a
    // resource path is available; an empty decorator would void the whole
    // route configuration, so it is skipped.
    let decorator = if route_path.trim().is_empty() {
        None
    } else {
        Some(Decorator {
            operation: format!("{}:{}", params.vhost, route_path),
            ..Default::default()
        })
    };

    let effective_base_path = if params.x_wso2_basepath.is_empty() {
        params.endpoint_base_path.clone()
    } else {
        params.x_wso2_basepath.clone()
    };
    let supported_methods = params.resource_methods.join(" ");

    // The authorization filter needs the cluster names even though routing
    // goes through the cluster header: it validates the key type in the
    // token before selecting one of them.
    let mut context_extensions = HashMap::new();
    context_extensions.insert(PATH_CONTEXT_EXTENSION.to_string(), params.resource_path.clone());
    context_extensions.insert(VHOST_CONTEXT_EXTENSION.to_string(), params.vhost.clone());
    context_extensions
        .insert(BASE_PATH_CONTEXT_EXTENSION.to_string(), effective_base_path.clone());
    context_extensions.insert(METHOD_CONTEXT_EXTENSION.to_string(), supported_methods.clone());
    context_extensions.insert(API_VERSION_CONTEXT_EXTENSION.to_string(), params.version.clone());
    context_extensions.insert(API_NAME_CONTEXT_EXTENSION.to_string(), params.title.clone());
    context_extensions
        .insert(PROD_CLUSTER_NAME_CONTEXT_EXTENSION.to_string(), params.prod_cluster_name.clone());
    context_extensions
        .insert(SAND_CLUSTER_NAME_CONTEXT_EXTENSION.to_string(), params.sand_cluster_name.clone());

    let ext_authz_override = ExtAuthzPerRoute {
        r#override: Some(ExtAuthzOverride::CheckSettings(CheckSettings {
            context_extensions,
            // negation matches the proxy field (disable_request_body_buffering)
            disable_request_body_buffering: !params.pass_request_payload_to_enforcer,
            ..Default::default()
        })),
    };
    let ext_authz_any = Any {
        type_url: EXT_AUTHZ_PER_ROUTE_TYPE_URL.to_string(),
        value: ext_authz_override.encode_to_vec(),
    };

    let invocation_context = InvocationContext {
        organization_id: params.organization_id.clone(),
        base_path: effective_base_path.clone(),
        supported_methods,
        api_name: params.title.clone(),
        api_version: params.version.clone(),
        path_template: params.resource_path.clone(),
        vhost: params.vhost.clone(),
        prod_cluster_name: params.prod_cluster_name.clone(),
        sand_cluster_name: params.sand_cluster_name.clone(),
    };
    let lua_override = lua_per_route(
        &params.request_interceptors,
        &params.response_interceptors,
        &invocation_context,
        &settings.wire_log,
    );
    let lua_any =
        Any { type_url: LUA_PER_ROUTE_TYPE_URL.to_string(), value: lua_override.encode_to_vec() };

    // Rewrite regex and substitution toward the upstream path.
    let path_regex;
    let mut substitution = params.endpoint_base_path.clone();
    if !params.rewrite_path.is_empty() {
        path_regex = route_path.clone();
        if params.rewrite_path != "/" {
            substitution = format!("{}{}", params.endpoint_base_path, params.rewrite_path);
        }
    } else {
        let resource_path = params.resource_path.split('?').next().unwrap_or("");
        let mut resource_regex = path_regex_segment(resource_path);
        substitution = substitution_string(resource_path, &params.endpoint_base_path);
        if resource_path.ends_with("/*") {
            // a wildcard-captured suffix passes through untouched
            resource_regex =
                resource_regex.strip_suffix(WILDCARD_REGEX).unwrap_or(&resource_regex).to_string();
        }
        path_regex = format!("^{}{}", base_path, resource_regex);
    }

    let host_rewrite = HostRewriteSpecifier::AutoHostRewrite(BoolValue { value: true });

    let mut route_action = if params.x_wso2_basepath.is_empty() {
        RouteAction { host_rewrite_specifier: Some(host_rewrite), ..Default::default() }
    } else {
        RouteAction {
            host_rewrite_specifier: Some(host_rewrite),
            regex_rewrite: Some(RegexMatchAndSubstitute {
                pattern: Some(safe_regex(path_regex)),
                substitution,
            }),
            upgrade_configs: upgrade_configs(params.api_type),
            max_stream_duration: max_stream_duration(params.api_type),
            timeout: Some(seconds(settings.upstream.timeouts.route_timeout_secs)),
            idle_timeout: Some(seconds(settings.upstream.timeouts.route_idle_timeout_secs)),
            ..Default::default()
        }
    };

    route_action.cluster_specifier =
        Some(ClusterSpecifier::ClusterHeader(CLUSTER_HEADER_NAME.to_string()));

    let retries_declared = params
        .prod_endpoint_config
        .as_ref()
        .is_some_and(|config| config.retry_config.is_some())
        || params.sand_endpoint_config.as_ref().is_some_and(|config| config.retry_config.is_some());
    if retries_declared {
        // Retry counts arrive via request headers at runtime; the policy is
        // attached to pin the back-off base interval, which headers cannot
        // set. num_retries stays 0 so the proxy default of one retry never
        // applies to routes that did not opt in.
        route_action.retry_policy = Some(RetryPolicy {
            retry_on: RETRY_POLICY_RETRIABLE_STATUS_CODES.to_string(),
            num_retries: Some(UInt32Value { value: 0 }),
            retriable_status_codes: settings.upstream.retry.status_codes.clone(),
            retry_back_off: Some(RetryBackOff {
                base_interval: Some(millis(settings.upstream.retry.base_interval_ms as u64)),
                max_interval: None,
            }),
            ..Default::default()
        });
    }

    if let Some(cors) = cors_policy(params.cors.as_ref()) {
        #[allow(deprecated)]
        {
            route_action.cors = Some(cors);
        }
    }

    Route {
        // categorize routes by base path
        name: effective_base_path,
        r#match: Some(route_match),
        action: Some(Action::Route(route_action)),
        decorator,
        typed_per_filter_config: HashMap::from([
            (EXT_AUTHZ_FILTER_NAME.to_string(), ext_authz_any),
            (LUA_FILTER_NAME.to_string(), lua_any),
        ]),
        request_headers_to_remove: vec![
            CLUSTER_HEADER_NAME.to_string(),
            EXPECTED_TIMEOUT_HEADER.to_string(),
        ],
        response_headers_to_remove: vec![UPSTREAM_SERVICE_TIME_HEADER.to_string()],
        ..Default::default()
    }
}

/// Resolve the base path used for matching: the `x-wso2-basepath` override
/// when present, the upstream base path otherwise, `/`-prefixed and without
/// a trailing slash.
pub(crate) fn filtered_base_path(x_wso2_basepath: &str, endpoint_base_path: &str) -> String {
    let selected = if x_wso2_basepath.trim().is_empty() {
        endpoint_base_path
    } else {
        x_wso2_basepath
    };
    let mut base = if selected.starts_with('/') {
        selected.to_string()
    } else {
        format!("/{}", selected)
    };
    if let Some(stripped) = base.strip_suffix('/') {
        base = stripped.to_string();
    }
    base
}

/// Alias a default-version base path so both the version-suffixed and
/// version-less forms match. The version segment is removed only at its last
/// occurrence, so `/v2/foo/v2` aliases to `/v2/foo`.
pub(crate) fn default_version_base_path(base_path: &str, version: &str) -> String {
    let version_segment = format!("/{}", version);
    let without_version = match base_path.rfind(&version_segment) {
        Some(position) => {
            let mut stripped = base_path[..position].to_string();
            stripped.push_str(&base_path[position + version_segment.len()..]);
            stripped
        }
        None => base_path.to_string(),
    };
    // ?: keeps the alternation non-capturing; a capturing group here would
    // shift the numbered path-parameter references in the substitution
    format!("(?:{}|{})", base_path, without_version)
}

/// Full path regex for a resource: anchored base path + resource template +
/// an optional query-string tail.
pub(crate) fn generate_route_path(base_path: &str, resource_path: &str) -> String {
    let resource_path = resource_path.split('?').next().unwrap_or("");
    let full_path = format!("{}{}", base_path, resource_path);
    format!("^{}{}$", path_regex_segment(&full_path), QUERY_SUFFIX_REGEX)
}

/// Compile a path template into its regex segment: `{param}` tokens become
/// single-segment captures, a trailing `/*` captures any suffix, and a
/// trailing `/` becomes optional.
pub(crate) fn path_regex_segment(path: &str) -> String {
    let replaced = PATH_PARAM_TEMPLATE.replace_all(path, PATH_PARAM_REGEX).into_owned();
    if let Some(stripped) = replaced.strip_suffix("/*") {
        format!("{}{}", stripped, WILDCARD_REGEX)
    } else {
        let trimmed = replaced.strip_suffix('/').unwrap_or(&replaced);
        format!("{}{}", trimmed, TRAILING_SLASH_REGEX)
    }
}

/// Build the rewrite substitution for a resource path, replacing each
/// `{param}` capture with its numbered back-reference and prepending the
/// upstream base path.
pub(crate) fn substitution_string(resource_path: &str, endpoint_base_path: &str) -> String {
    let mut segment = path_regex_segment(resource_path);
    let mut param_index = 0;
    while segment.contains(PATH_PARAM_REGEX) {
        param_index += 1;
        segment = segment.replacen(PATH_PARAM_REGEX, &format!("\\{}", param_index), 1);
    }
    if let Some(stripped) = segment.strip_suffix(WILDCARD_REGEX) {
        segment = stripped.to_string();
    } else if resource_path.ends_with('/') {
        segment = format!("{}/", segment.strip_suffix(TRAILING_SLASH_REGEX).unwrap_or(&segment));
    } else {
        segment = segment.strip_suffix(TRAILING_SLASH_REGEX).unwrap_or(&segment).to_string();
    }
    format!("{}{}", endpoint_base_path, segment)
}

fn cors_policy(config: Option<&CorsConfiguration>) -> Option<CorsPolicy> {
    let config = config?;
    if !config.enabled {
        return None;
    }

    let mut policy = CorsPolicy {
        allow_credentials: Some(BoolValue { value: config.allow_credentials }),
        ..Default::default()
    };

    policy.allow_origin_string_match = config
        .allow_origins
        .iter()
        .map(|origin| StringMatcher {
            // escape so a literal origin never behaves as a pattern
            match_pattern: Some(MatchPattern::SafeRegex(safe_regex(regex::escape(origin)))),
            ..Default::default()
        })
        .collect();

    if !config.allow_methods.is_empty() {
        policy.allow_methods = config.allow_methods.join(", ");
    }
    if !config.allow_headers.is_empty() {
        policy.allow_headers = config.allow_headers.join(", ");
    }
    if !config.expose_headers.is_empty() {
        policy.expose_headers = config.expose_headers.join(", ");
    }

    Some(policy)
}

fn upgrade_configs(api_type: ApiType) -> Vec<UpgradeConfig> {
    vec![UpgradeConfig {
        upgrade_type: "websocket".to_string(),
        enabled: Some(BoolValue { value: api_type == ApiType::Ws }),
        ..Default::default()
    }]
}

fn max_stream_duration(api_type: ApiType) -> Option<MaxStreamDuration> {
    if api_type == ApiType::Ws {
        Some(MaxStreamDuration {
            max_stream_duration: Some(Duration { seconds: 60 * 60 * 24, nanos: 0 }),
            ..Default::default()
        })
    } else {
        None
    }
}

fn safe_regex(regex: String) -> RegexMatcher {
    RegexMatcher { regex, ..Default::default() }
}

fn seconds(value: u64) -> Duration {
    Duration { seconds: value as i64, nanos: 0 }
}

fn millis(value: u64) -> Duration {
    Duration { seconds: (value / 1000) as i64, nanos: ((value % 1000) * 1_000_000) as i32 }
}
