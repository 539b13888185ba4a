//! API translation orchestration.
//!
//! Walks the API's endpoint hierarchy (API-level production/sandbox → named
//! endpoints → resource-level production/sandbox), compiles clusters and
//! interceptor callouts, and emits one route per resource with the sandbox
//! duplicate ahead of the production route. Ordering is load-bearing: the
//! proxy evaluates routes in listed order, and header-driven sandbox
//! selection only works when the sandbox route comes first.

use std::collections::HashMap;

use envoy_types::pb::envoy::config::cluster::v3::Cluster;
use envoy_types::pb::envoy::config::core::v3::{data_source::Specifier, Address, DataSource};
use envoy_types::pb::envoy::config::route::v3::{
    route::Action, route_action::{ClusterSpecifier, HostRewriteSpecifier}, route_match::PathSpecifier,
    Decorator, DirectResponseAction, Route, RouteAction, RouteMatch,
};
use envoy_types::pb::envoy::extensions::filters::http::ext_authz::v3::{
    ext_authz_per_route::Override as ExtAuthzOverride, ExtAuthzPerRoute,
};
use envoy_types::pb::envoy::r#type::matcher::v3::{RegexMatchAndSubstitute, RegexMatcher};
use envoy_types::pb::google::protobuf::{Any, BoolValue};
use prost::Message;
use tracing::{debug, error, warn};

use crate::config::GatewaySettings;
use crate::errors::{Error, Result};
use crate::model::{
    ApiDescription, ApiType, CertificateStore, Endpoint, EndpointGroup, InterceptEndpoint,
    InterceptorLevel, Resource,
};

use super::endpoints::build_endpoint_cluster;
use super::interceptor::build_interceptor_cluster;
use super::naming::cluster_name;
use super::route::{build_route, RouteCreateParams};
use super::{
    TranslationOutput, EXT_AUTHZ_FILTER_NAME, EXT_AUTHZ_PER_ROUTE_TYPE_URL, HEALTH_ENDPOINT_RESPONSE,
    HEALTH_PATH, NAMED_ENDPOINT_CLUSTER_MARKER, READY_ENDPOINT_RESPONSE, READY_PATH,
    REQUEST_INTERCEPTOR_CLUSTER_PREFIX, RESPONSE_INTERCEPTOR_CLUSTER_PREFIX, TOKEN_CLUSTER_NAME,
    TOKEN_PATH, TRACING_CLUSTER_NAME,
};

/// Translate one API description into routes, clusters, and addresses.
///
/// Production and sandbox clusters are created for the API level first, then
/// named endpoint groups, then per resource; every route references clusters
/// emitted before it. Failures never abort the translation: the offending
/// cluster is dropped, the condition is logged, and the remaining
/// configuration stays internally consistent.
pub fn translate(
    api: &ApiDescription,
    upstream_certs: &CertificateStore,
    interceptor_certs: &CertificateStore,
    vhost: &str,
    organization_id: &str,
    settings: &GatewaySettings,
) -> TranslationOutput {
    let mut output = TranslationOutput::default();

    let title = &api.title;
    let version = &api.version;
    let timeout = settings.cluster_timeout_secs;

    // Base path shared by every upstream of the API.
    let mut api_level_base_path_prod = String::new();
    // Set only when the sandbox base path differs from production.
    let mut api_level_base_path_sand = String::new();
    // Named endpoint groups force every resource onto the API base path.
    let mut strict_base_path = false;

    let mut api_level_cluster_prod = String::new();
    let mut api_level_cluster_sand = String::new();

    // API-level production endpoints
    if let Some(prod) = api.prod_endpoints.as_ref().filter(|group| group.has_endpoints()) {
        let mut group = prod.clone();
        group.http2_backend_enabled = api.http2_backend_enabled;
        api_level_base_path_prod = group.endpoints[0].basepath_normalized().to_string();
        api_level_cluster_prod =
            cluster_name(&group.endpoint_prefix, organization_id, vhost, title, version, "");
        if !group.endpoint_prefix.contains(NAMED_ENDPOINT_CLUSTER_MARKER) {
            match build_endpoint_cluster(
                &api_level_cluster_prod,
                &group,
                upstream_certs,
                timeout,
                &api_level_base_path_prod,
                settings,
            ) {
                Ok((cluster, addresses)) => {
                    output.clusters.push(cluster);
                    output.addresses.extend(addresses);
                }
                Err(err) => {
                    api_level_cluster_prod.clear();
                    error!(
                        api = %title,
                        error = %err,
                        "Error while adding api level production endpoints"
                    );
                }
            }
        }
    } else {
        warn!(api = %title, version = %version, "API level production endpoints are not defined");
    }

    // API-level sandbox endpoints
    if let Some(sand) = api.sand_endpoints.as_ref().filter(|group| group.has_endpoints()) {
        let mut group = sand.clone();
        group.http2_backend_enabled = api.http2_backend_enabled;

        let mut selected_base_path_sand = api_level_base_path_prod.clone();
        if api_level_base_path_prod.is_empty() && api_level_cluster_prod.is_empty() {
            // no production endpoint; the sandbox base path acts as the API
            // base path
            api_level_base_path_prod = group.endpoints[0].basepath_normalized().to_string();
            selected_base_path_sand = api_level_base_path_prod.clone();
        } else if api
            .prod_endpoints
            .as_ref()
            .and_then(|prod| prod.endpoints.first())
            .map(|endpoint| endpoint.basepath_normalized())
            != Some(group.endpoints[0].basepath_normalized())
        {
            api_level_base_path_sand = group.endpoints[0].basepath_normalized().to_string();
            selected_base_path_sand = api_level_base_path_sand.clone();
        }

        api_level_cluster_sand =
            cluster_name(&group.endpoint_prefix, organization_id, vhost, title, version, "");
        if !group.endpoint_prefix.contains(NAMED_ENDPOINT_CLUSTER_MARKER) {
            match build_endpoint_cluster(
                &api_level_cluster_sand,
                &group,
                upstream_certs,
                timeout,
                &selected_base_path_sand,
                settings,
            ) {
                Ok((cluster, addresses)) => {
                    output.clusters.push(cluster);
                    output.addresses.extend(addresses);
                }
                Err(err) => {
                    api_level_cluster_sand.clear();
                    error!(
                        api = %title,
                        error = %err,
                        "Error while adding api level sandbox endpoints"
                    );
                }
            }
        }
    } else {
        debug!(api = %title, "API level sandbox endpoints are not defined");
    }

    // Named endpoint groups (x-wso2-endpoints)
    if !api.x_wso2_endpoints.is_empty() {
        debug!(api = %title, version = %version, "x-wso2-endpoints clusters found");
        for named in &api.x_wso2_endpoints {
            let Some(first_endpoint) = named.group.endpoints.first() else {
                warn!(endpoint = %named.name, api = %title, "Named endpoint group has no endpoints");
                continue;
            };
            if api_level_base_path_prod.is_empty() && api_level_cluster_prod.is_empty() {
                api_level_base_path_prod = first_endpoint.basepath_normalized().to_string();
            }
            let named_cluster_name = cluster_name(
                &named.group.endpoint_prefix,
                organization_id,
                vhost,
                title,
                version,
                "",
            );
            match build_endpoint_cluster(
                &named_cluster_name,
                &named.group,
                upstream_certs,
                timeout,
                &api_level_base_path_prod,
                settings,
            ) {
                Ok((cluster, addresses)) => {
                    strict_base_path = true;
                    output.clusters.push(cluster);
                    output.addresses.extend(addresses);
                }
                Err(err) => {
                    error!(
                        endpoint = %named.name,
                        api = %title,
                        error = %err,
                        "Error while adding x-wso2-endpoints cluster"
                    );
                }
            }
        }
    }

    // API-level interceptor clusters
    let mut api_request_interceptor = api.request_interceptor.clone().unwrap_or_default();
    if api_request_interceptor.enable {
        debug!(api = %title, version = %version, "API level request interceptors found");
        api_request_interceptor.cluster_name = cluster_name(
            REQUEST_INTERCEPTOR_CLUSTER_PREFIX,
            organization_id,
            vhost,
            title,
            version,
            "",
        );
        match build_interceptor_cluster(interceptor_certs, &api_request_interceptor, settings) {
            Ok((cluster, addresses)) => {
                output.clusters.push(cluster);
                output.addresses.extend(addresses);
            }
            Err(err) => {
                api_request_interceptor = InterceptEndpoint::default();
                error!(
                    api = %title,
                    error = %err,
                    "Error while adding api level request interceptor cluster"
                );
            }
        }
    }
    let mut api_response_interceptor = api.response_interceptor.clone().unwrap_or_default();
    if api_response_interceptor.enable {
        debug!(api = %api.id, "API level response interceptors found");
        api_response_interceptor.cluster_name = cluster_name(
            RESPONSE_INTERCEPTOR_CLUSTER_PREFIX,
            organization_id,
            vhost,
            title,
            version,
            "",
        );
        match build_interceptor_cluster(interceptor_certs, &api_response_interceptor, settings) {
            Ok((cluster, addresses)) => {
                output.clusters.push(cluster);
                output.addresses.extend(addresses);
            }
            Err(err) => {
                api_response_interceptor = InterceptEndpoint::default();
                error!(
                    api = %title,
                    error = %err,
                    "Error while adding api level response interceptor cluster"
                );
            }
        }
    }

    // WebSocket APIs use the API-level clusters only: a single GET method per
    // resource and no interceptors.
    if api.api_type == ApiType::Ws {
        for resource in &api.resources {
            let params = route_params(
                api,
                Some(resource),
                vhost,
                &api_level_base_path_prod,
                &api_level_cluster_prod,
                &api_level_cluster_sand,
                None,
                None,
                organization_id,
                false,
            );
            output.routes.push(build_route(&params, settings));
        }
        return output;
    }

    for resource in &api.resources {
        let mut resource_request_interceptor = api_request_interceptor.clone();
        let mut resource_response_interceptor = api_response_interceptor.clone();
        let mut cluster_name_prod = api_level_cluster_prod.clone();
        let mut cluster_name_sand = api_level_cluster_sand.clone();
        let mut resource_base_path = String::new();
        let mut resource_base_path_sand = String::new();
        let mut resource_sand_available = false;
        let resource_path = resource.path.clone();

        let has_resource_prod =
            resource.prod_endpoints.as_ref().is_some_and(EndpointGroup::has_endpoints);
        let has_resource_sand =
            resource.sand_endpoints.as_ref().is_some_and(EndpointGroup::has_endpoints);

        if strict_base_path || (!has_resource_prod && !has_resource_sand) {
            resource_base_path = api_level_base_path_prod.clone();
            resource_base_path_sand = if api_level_base_path_sand.is_empty() {
                api_level_base_path_prod.clone()
            } else {
                api_level_base_path_sand.clone()
            };
        }

        // resource-level production endpoints
        if has_resource_prod {
            let group = resource.prod_endpoints.as_ref().unwrap();
            let previous_base_path = resource_base_path.clone();
            if resource_base_path.is_empty() {
                resource_base_path = group.endpoints[0].basepath_normalized().to_string();
            }
            cluster_name_prod =
                cluster_name(&group.endpoint_prefix, organization_id, vhost, title, version, "");
            if !group.endpoint_prefix.contains(NAMED_ENDPOINT_CLUSTER_MARKER) {
                cluster_name_prod = cluster_name(
                    &group.endpoint_prefix,
                    organization_id,
                    vhost,
                    title,
                    version,
                    &resource.id,
                );
                match build_endpoint_cluster(
                    &cluster_name_prod,
                    group,
                    upstream_certs,
                    timeout,
                    &resource_base_path,
                    settings,
                ) {
                    Ok((cluster, addresses)) => {
                        output.clusters.push(cluster);
                        output.addresses.extend(addresses);
                    }
                    Err(err) => {
                        cluster_name_prod = api_level_cluster_prod.clone();
                        // production cluster creation failed; the base path
                        // reverts with it
                        resource_base_path = previous_base_path;
                        error!(
                            api = %title,
                            version = %version,
                            resource = %resource_path,
                            error = %err,
                            "Error while adding resource level production endpoints"
                        );
                    }
                }
            }
        }
        if cluster_name_prod.is_empty() {
            warn!(
                api = %title,
                version = %version,
                resource = %resource_path,
                "Production environment endpoints are not available for the resource"
            );
        }

        // resource-level sandbox endpoints
        if has_resource_sand {
            let group = resource.sand_endpoints.as_ref().unwrap();
            let previous_base_path_sand = if api_level_base_path_sand.is_empty() {
                api_level_base_path_prod.clone()
            } else {
                api_level_base_path_sand.clone()
            };
            if resource_base_path_sand.is_empty() {
                resource_base_path_sand = group.endpoints[0].basepath_normalized().to_string();
            }
            cluster_name_sand =
                cluster_name(&group.endpoint_prefix, organization_id, vhost, title, version, "");
            if !group.endpoint_prefix.contains(NAMED_ENDPOINT_CLUSTER_MARKER) {
                cluster_name_sand = cluster_name(
                    &group.endpoint_prefix,
                    organization_id,
                    vhost,
                    title,
                    version,
                    &resource.id,
                );
                match build_endpoint_cluster(
                    &cluster_name_sand,
                    group,
                    upstream_certs,
                    timeout,
                    &resource_base_path_sand,
                    settings,
                ) {
                    Ok((cluster, addresses)) => {
                        output.clusters.push(cluster);
                        output.addresses.extend(addresses);
                        resource_sand_available = true;
                    }
                    Err(err) => {
                        cluster_name_sand = api_level_cluster_sand.clone();
                        resource_base_path_sand = previous_base_path_sand;
                        error!(
                            api = %title,
                            version = %version,
                            resource = %resource_path,
                            error = %err,
                            "Error while adding resource level sandbox endpoints"
                        );
                    }
                }
            }
        }
        if cluster_name_sand.is_empty() {
            debug!(
                api = %title,
                version = %version,
                resource = %resource_path,
                "Sandbox environment endpoints are not available for the resource"
            );
        }

        // Base-path resolution is isolated per resource: the fallback for a
        // missing sandbox base path never leaks into API-level state, so a
        // reversion in one resource cannot change what its siblings see.
        if !resource_base_path.is_empty() && resource_base_path_sand.is_empty() {
            resource_base_path_sand = if api_level_base_path_sand.is_empty() {
                api_level_base_path_prod.clone()
            } else {
                api_level_base_path_sand.clone()
            };
        } else if resource_base_path.is_empty() && !resource_base_path_sand.is_empty() {
            resource_base_path = api_level_base_path_prod.clone();
        }

        // A resource on both API-level clusters also uses the API-level base
        // paths.
        if cluster_name_prod == api_level_cluster_prod
            && cluster_name_sand == api_level_cluster_sand
        {
            resource_base_path_sand = if api_level_base_path_sand.is_empty() {
                api_level_base_path_prod.clone()
            } else {
                api_level_base_path_sand.clone()
            };
        }

        if !cluster_name_prod.is_empty()
            && cluster_name_prod == api_level_cluster_prod
            && resource_base_path != api_level_base_path_prod
            && !resource_base_path.is_empty()
        {
            error!(
                api = %title,
                version = %version,
                resource = %resource_path,
                resource_base_path = %resource_base_path,
                api_base_path = %api_level_base_path_prod,
                "Resource production base path mismatched against the api level base path"
            );
            cluster_name_prod.clear();
        }
        if !cluster_name_sand.is_empty()
            && !api_level_base_path_sand.is_empty()
            && cluster_name_sand == api_level_cluster_sand
            && resource_base_path_sand != api_level_base_path_sand
        {
            error!(
                api = %title,
                version = %version,
                resource = %resource_path,
                resource_base_path = %resource_base_path_sand,
                api_base_path = %api_level_base_path_sand,
                "Resource sandbox base path mismatched against the api level base path"
            );
            cluster_name_sand.clear();
        }

        // resource-level request interceptor
        if let Some(declared) = resource.request_interceptor.as_ref().filter(|i| i.enable) {
            debug!(
                api = %title,
                version = %version,
                resource = %resource.path,
                "Resource level request interceptors found"
            );
            let mut interceptor = declared.clone();
            interceptor.level = InterceptorLevel::Resource;
            interceptor.cluster_name = cluster_name(
                REQUEST_INTERCEPTOR_CLUSTER_PREFIX,
                organization_id,
                vhost,
                title,
                version,
                &resource.id,
            );
            match build_interceptor_cluster(interceptor_certs, &interceptor, settings) {
                Ok((cluster, addresses)) => {
                    resource_request_interceptor = interceptor;
                    output.clusters.push(cluster);
                    output.addresses.extend(addresses);
                }
                Err(err) => {
                    error!(
                        api = %title,
                        error = %err,
                        "Error while adding resource level request interceptor cluster"
                    );
                }
            }
        }

        // operation-level request interceptors
        let mut request_interceptors = resource.operation_interceptors(
            &api_request_interceptor,
            &resource_request_interceptor,
            true,
        );
        compile_operation_interceptors(
            &mut request_interceptors,
            resource,
            &resource_request_interceptor,
            REQUEST_INTERCEPTOR_CLUSTER_PREFIX,
            interceptor_certs,
            organization_id,
            vhost,
            api,
            settings,
            &mut output,
        );

        // resource-level response interceptor
        if let Some(declared) = resource.response_interceptor.as_ref().filter(|i| i.enable) {
            debug!(
                api = %title,
                version = %version,
                resource = %resource.path,
                "Resource level response interceptors found"
            );
            let mut interceptor = declared.clone();
            interceptor.level = InterceptorLevel::Resource;
            interceptor.cluster_name = cluster_name(
                RESPONSE_INTERCEPTOR_CLUSTER_PREFIX,
                organization_id,
                vhost,
                title,
                version,
                &resource.id,
            );
            match build_interceptor_cluster(interceptor_certs, &interceptor, settings) {
                Ok((cluster, addresses)) => {
                    resource_response_interceptor = interceptor;
                    output.clusters.push(cluster);
                    output.addresses.extend(addresses);
                }
                Err(err) => {
                    error!(
                        api = %title,
                        error = %err,
                        "Error while adding resource level response interceptor cluster"
                    );
                }
            }
        }

        // operation-level response interceptors
        let mut response_interceptors = resource.operation_interceptors(
            &api_response_interceptor,
            &resource_response_interceptor,
            false,
        );
        compile_operation_interceptors(
            &mut response_interceptors,
            resource,
            &resource_response_interceptor,
            RESPONSE_INTERCEPTOR_CLUSTER_PREFIX,
            interceptor_certs,
            organization_id,
            vhost,
            api,
            settings,
            &mut output,
        );

        let production_params = route_params(
            api,
            Some(resource),
            vhost,
            &resource_base_path,
            &cluster_name_prod,
            &cluster_name_sand,
            Some(&request_interceptors),
            Some(&response_interceptors),
            organization_id,
            false,
        );
        let production_route = build_route(&production_params, settings);

        if !api_level_base_path_sand.is_empty() || resource_sand_available {
            debug!(
                api = %title,
                version = %version,
                resource = %resource.path,
                base_path = %resource_base_path_sand,
                "Creating sandbox route"
            );
            let sandbox_params = route_params(
                api,
                Some(resource),
                vhost,
                &resource_base_path_sand,
                &cluster_name_prod,
                &cluster_name_sand,
                Some(&request_interceptors),
                Some(&response_interceptors),
                organization_id,
                true,
            );
            // The sandbox route precedes the production route; both match the
            // same URL and the proxy evaluates routes in listed order.
            output.routes.push(build_route(&sandbox_params, settings));
        }
        output.routes.push(production_route);
    }

    output
}

/// Compile the clusters for operation-scoped interceptor records, replacing
/// the stored operation identifier with the minted cluster name. A failed
/// compile falls the operation back to the enclosing scope's interceptor.
#[allow(clippy::too_many_arguments)]
fn compile_operation_interceptors(
    interceptors: &mut HashMap<String, InterceptEndpoint>,
    resource: &Resource,
    fallback: &InterceptEndpoint,
    prefix: &str,
    interceptor_certs: &CertificateStore,
    organization_id: &str,
    vhost: &str,
    api: &ApiDescription,
    settings: &GatewaySettings,
    output: &mut TranslationOutput,
) {
    // declared operation order keeps cluster emission deterministic
    for operation in &resource.operations {
        let Some(interceptor) = interceptors.get(&operation.method) else {
            continue;
        };
        if !interceptor.enable || interceptor.level != InterceptorLevel::Operation {
            continue;
        }
        debug!(
            api = %api.title,
            version = %api.version,
            resource = %resource.path,
            operation = %interceptor.cluster_name,
            "Operation level interceptors found"
        );
        let operation_id = interceptor.cluster_name.clone();
        let mut compiled = interceptor.clone();
        compiled.cluster_name = cluster_name(
            prefix,
            organization_id,
            vhost,
            &api.title,
            &api.version,
            &operation_id,
        );
        match build_interceptor_cluster(interceptor_certs, &compiled, settings) {
            Ok((cluster, addresses)) => {
                output.clusters.push(cluster);
                output.addresses.extend(addresses);
                interceptors.insert(operation.method.clone(), compiled);
            }
            Err(err) => {
                error!(
                    api = %api.title,
                    version = %api.version,
                    resource = %resource.path,
                    operation = %operation_id,
                    error = %err,
                    "Error while adding operation level interceptor cluster"
                );
                interceptors.insert(operation.method.clone(), fallback.clone());
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn route_params(
    api: &ApiDescription,
    resource: Option<&Resource>,
    vhost: &str,
    endpoint_base_path: &str,
    prod_cluster_name: &str,
    sand_cluster_name: &str,
    request_interceptors: Option<&HashMap<String, InterceptEndpoint>>,
    response_interceptors: Option<&HashMap<String, InterceptEndpoint>>,
    organization_id: &str,
    is_sandbox: bool,
) -> RouteCreateParams {
    let mut params = RouteCreateParams {
        organization_id: organization_id.to_string(),
        title: api.title.clone(),
        api_type: api.api_type,
        version: api.version.clone(),
        vhost: vhost.to_string(),
        x_wso2_basepath: api.x_wso2_basepath.clone(),
        prod_cluster_name: prod_cluster_name.to_string(),
        sand_cluster_name: sand_cluster_name.to_string(),
        endpoint_base_path: endpoint_base_path.to_string(),
        cors: api.cors.clone(),
        resource_methods: default_resource_methods(api.api_type),
        request_interceptors: request_interceptors.cloned().unwrap_or_default(),
        response_interceptors: response_interceptors.cloned().unwrap_or_default(),
        is_default_version: api.is_default_version,
        is_sandbox,
        pass_request_payload_to_enforcer: api.pass_request_payload_to_enforcer,
        ..Default::default()
    };

    if let Some(resource) = resource {
        if !resource.operations.is_empty() {
            params.resource_methods = resource.method_names();
        }
        params.resource_path = resource.path.clone();
        params.rewrite_path = resource.rewrite_path.clone();
        params.rewrite_method = resource.rewrite_method;
    }

    if let Some(prod) = &api.prod_endpoints {
        params.prod_endpoint_config = prod.config.clone();
    }
    if let Some(sand) = &api.sand_endpoints {
        params.sand_endpoint_config = sand.config.clone();
    }
    params
}

fn default_resource_methods(api_type: ApiType) -> Vec<String> {
    match api_type {
        ApiType::Ws => vec!["GET".to_string()],
        ApiType::Rest => Vec::new(),
    }
}

fn ext_authz_disabled_filter() -> (String, Any) {
    let disabled = ExtAuthzPerRoute { r#override: Some(ExtAuthzOverride::Disabled(true)) };
    (
        EXT_AUTHZ_FILTER_NAME.to_string(),
        Any { type_url: EXT_AUTHZ_PER_ROUTE_TYPE_URL.to_string(), value: disabled.encode_to_vec() },
    )
}

/// Route for the token endpoint: an exact path match forwarded to the token
/// cluster with its path collapsed to `/` and authorization disabled.
pub fn token_route() -> Route {
    let mut action = RouteAction {
        host_rewrite_specifier: Some(HostRewriteSpecifier::AutoHostRewrite(BoolValue {
            value: true,
        })),
        regex_rewrite: Some(RegexMatchAndSubstitute {
            pattern: Some(RegexMatcher { regex: TOKEN_PATH.to_string(), ..Default::default() }),
            substitution: "/".to_string(),
        }),
        ..Default::default()
    };
    action.cluster_specifier = Some(ClusterSpecifier::Cluster(TOKEN_CLUSTER_NAME.to_string()));

    Route {
        name: TOKEN_PATH.to_string(),
        r#match: Some(RouteMatch {
            path_specifier: Some(PathSpecifier::Path(TOKEN_PATH.to_string())),
            ..Default::default()
        }),
        action: Some(Action::Route(action)),
        decorator: Some(Decorator { operation: TOKEN_PATH.to_string(), ..Default::default() }),
        typed_per_filter_config: HashMap::from([ext_authz_disabled_filter()]),
        ..Default::default()
    }
}

/// Route replying to health probes with a direct 200 response.
pub fn health_route() -> Route {
    direct_response_route(HEALTH_PATH, HEALTH_ENDPOINT_RESPONSE)
}

/// Route replying to readiness probes with a direct 200 response.
pub fn ready_route() -> Route {
    direct_response_route(READY_PATH, READY_ENDPOINT_RESPONSE)
}

fn direct_response_route(path: &str, body: &str) -> Route {
    Route {
        name: path.to_string(),
        r#match: Some(RouteMatch {
            path_specifier: Some(PathSpecifier::Path(path.to_string())),
            ..Default::default()
        }),
        action: Some(Action::DirectResponse(DirectResponseAction {
            status: 200,
            body: Some(DataSource {
                specifier: Some(Specifier::InlineString(body.to_string())),
                ..Default::default()
            }),
        })),
        decorator: Some(Decorator { operation: path.to_string(), ..Default::default() }),
        typed_per_filter_config: HashMap::from([ext_authz_disabled_filter()]),
        ..Default::default()
    }
}

/// Cluster carrying spans to the configured tracing collector.
pub fn tracing_cluster(settings: &GatewaySettings) -> Result<(Cluster, Vec<Address>)> {
    let tracing = &settings.tracing;
    if tracing.host.is_empty() {
        return Err(Error::config("invalid host provided for tracing endpoint"));
    }
    if tracing.endpoint.is_empty() {
        return Err(Error::config("invalid endpoint path provided for tracing endpoint"));
    }
    let port: u32 = tracing
        .port
        .parse()
        .map_err(|_| Error::config("invalid port provided for tracing endpoint"))?;

    let collector = EndpointGroup {
        endpoints: vec![Endpoint {
            host: tracing.host.clone(),
            port,
            url_type: "http".to_string(),
            basepath: tracing.endpoint.clone(),
            raw_url: format!("http://{}:{}{}", tracing.host, port, tracing.endpoint),
            service_discovery_string: None,
        }],
        ..Default::default()
    };

    build_endpoint_cluster(
        TRACING_CLUSTER_NAME,
        &collector,
        &CertificateStore::new(),
        settings.cluster_timeout_secs,
        &tracing.endpoint,
        settings,
    )
}
