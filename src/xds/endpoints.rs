//! Endpoint group compilation.
//!
//! Turns one endpoint group into one Envoy cluster plus the socket addresses
//! backing it: locality endpoints with failover priorities, per-endpoint TLS
//! transport-socket matches, HTTP/1 or HTTP/2 upstream options, active health
//! checking, and circuit breakers.

use std::collections::HashMap;
use std::net::IpAddr;

use envoy_types::pb::envoy::config::cluster::v3::{
    circuit_breakers::Thresholds,
    cluster::{ClusterDiscoveryType, DiscoveryType, DnsLookupFamily, LbPolicy, TransportSocketMatch},
    CircuitBreakers, Cluster,
};
use envoy_types::pb::envoy::config::core::v3::{
    address,
    data_source::Specifier,
    health_check::{HealthChecker, TcpHealthCheck},
    socket_address::{PortSpecifier, Protocol},
    transport_socket::ConfigType,
    Address, DataSource, HealthCheck, Http1ProtocolOptions, Http2ProtocolOptions, Metadata,
    SocketAddress, TransportSocket,
};
use envoy_types::pb::envoy::config::endpoint::v3::{
    lb_endpoint::HostIdentifier, ClusterLoadAssignment, Endpoint as UpstreamHost, LbEndpoint,
    LocalityLbEndpoints,
};
use envoy_types::pb::envoy::extensions::transport_sockets::tls::v3::{
    common_tls_context::ValidationContextType, subject_alt_name_matcher::SanType,
    tls_parameters::TlsProtocol, CertificateValidationContext, CommonTlsContext,
    SubjectAltNameMatcher, TlsCertificate, TlsParameters, UpstreamTlsContext,
};
use envoy_types::pb::envoy::extensions::upstreams::http::v3::{
    http_protocol_options::{
        explicit_http_config::ProtocolConfig, ExplicitHttpConfig, UpstreamProtocolOptions,
    },
    HttpProtocolOptions,
};
use envoy_types::pb::envoy::r#type::matcher::v3::{string_matcher::MatchPattern, StringMatcher};
use envoy_types::pb::google::protobuf::{value::Kind, Any, Duration, Struct, UInt32Value, Value};
use prost::Message;
use tracing::debug;

use crate::config::{GatewaySettings, HealthCheckSettings};
use crate::discovery;
use crate::errors::{Error, Result};
use crate::model::{CertificateStore, CircuitBreakerConfig, EndpointGroup};

use super::{
    HTTP_PROTOCOL_OPTIONS_EXTENSION_KEY, HTTP_PROTOCOL_OPTIONS_TYPE_URL, TLS_TRANSPORT_SOCKET_NAME,
    UPSTREAM_TLS_CONTEXT_TYPE_URL,
};

/// Filter metadata namespace the proxy uses to pair an endpoint with its
/// transport-socket match.
const TRANSPORT_SOCKET_MATCH_METADATA: &str = "envoy.transport_socket_match";

/// Compile an endpoint group into a cluster and its socket addresses.
///
/// Every endpoint must share `base_path` (trailing slash ignored); a mismatch
/// fails the whole group. Endpoint order is preserved in both the locality
/// endpoints and the returned address list.
pub fn build_endpoint_cluster(
    cluster_name: &str,
    group: &EndpointGroup,
    cert_store: &CertificateStore,
    connect_timeout_secs: u64,
    base_path: &str,
    settings: &GatewaySettings,
) -> Result<(Cluster, Vec<Address>)> {
    let mut transport_socket_matches = Vec::new();
    let mut locality_endpoints = Vec::new();
    let mut addresses = Vec::new();
    // failover groups get increasing priorities in declaration order
    let mut priority = 0u32;

    for (index, endpoint) in group.endpoints.iter().enumerate() {
        if endpoint.basepath_normalized() != base_path {
            return Err(Error::validation(format!(
                "endpoint basepath mismatched for {}. expected : {} but found : {}",
                endpoint.raw_url, base_path, endpoint.basepath
            )));
        }

        let endpoint_address = socket_address(&endpoint.host, endpoint.port);
        addresses.push(endpoint_address.clone());

        let mut lb_endpoint = LbEndpoint {
            host_identifier: Some(HostIdentifier::Endpoint(UpstreamHost {
                address: Some(endpoint_address),
                ..Default::default()
            })),
            ..Default::default()
        };

        if endpoint.is_tls() {
            let upstream_cert = cert_store.resolve(&endpoint.raw_url);
            let tls_context = upstream_tls_context(
                upstream_cert,
                &endpoint.host,
                group.http2_backend_enabled,
                settings,
            );
            transport_socket_matches.push(TransportSocketMatch {
                name: format!("ts{}", index),
                r#match: Some(lb_id_struct(index)),
                transport_socket: Some(TransportSocket {
                    name: TLS_TRANSPORT_SOCKET_NAME.to_string(),
                    config_type: Some(ConfigType::TypedConfig(Any {
                        type_url: UPSTREAM_TLS_CONTEXT_TYPE_URL.to_string(),
                        value: tls_context.encode_to_vec(),
                    })),
                }),
            });

            let mut metadata = Metadata::default();
            metadata
                .filter_metadata
                .insert(TRANSPORT_SOCKET_MATCH_METADATA.to_string(), lb_id_struct(index));
            lb_endpoint.metadata = Some(metadata);
        }

        locality_endpoints.push(LocalityLbEndpoints {
            priority,
            lb_endpoints: vec![lb_endpoint],
            ..Default::default()
        });

        if group.is_failover() {
            priority += 1;
        }
    }

    let protocol_options = http_protocol_options(group.http2_backend_enabled, settings);
    let mut typed_extension_protocol_options = HashMap::new();
    typed_extension_protocol_options.insert(
        HTTP_PROTOCOL_OPTIONS_EXTENSION_KEY.to_string(),
        Any {
            type_url: HTTP_PROTOCOL_OPTIONS_TYPE_URL.to_string(),
            value: protocol_options.encode_to_vec(),
        },
    );

    let mut cluster = Cluster {
        name: cluster_name.to_string(),
        connect_timeout: Some(Duration { seconds: connect_timeout_secs as i64, nanos: 0 }),
        cluster_discovery_type: Some(ClusterDiscoveryType::Type(DiscoveryType::StrictDns as i32)),
        dns_lookup_family: DnsLookupFamily::V4Only as i32,
        lb_policy: LbPolicy::RoundRobin as i32,
        load_assignment: Some(ClusterLoadAssignment {
            cluster_name: cluster_name.to_string(),
            endpoints: locality_endpoints,
            ..Default::default()
        }),
        transport_socket_matches,
        dns_refresh_rate: Some(millis_to_duration(settings.upstream.dns.refresh_rate_ms)),
        respect_dns_ttl: settings.upstream.dns.respect_ttl,
        typed_extension_protocol_options,
        ..Default::default()
    };

    if group.endpoints.len() > 1 {
        cluster.health_checks = vec![tcp_health_check(&settings.upstream.health)];
    }

    if let Some(circuit_config) =
        group.config.as_ref().and_then(|config| config.circuit_breakers.as_ref())
    {
        cluster.circuit_breakers = Some(circuit_breakers(circuit_config));
    }

    // Service discovery handles membership and balancing on its own, so only
    // the first endpoint's query is recorded.
    if let Some(discovery_string) = group
        .endpoints
        .first()
        .and_then(|endpoint| endpoint.service_discovery_string.as_deref())
        .filter(|value| !value.is_empty())
    {
        discovery::register_cluster(cluster_name, discovery_string);
        debug!(
            cluster = %cluster_name,
            discovery = %discovery_string,
            "Registered cluster for service discovery"
        );
    }

    Ok((cluster, addresses))
}

/// Build a TCP socket address for an upstream host.
pub fn socket_address(host: &str, port: u32) -> Address {
    Address {
        address: Some(address::Address::SocketAddress(SocketAddress {
            address: host.to_string(),
            protocol: Protocol::Tcp as i32,
            port_specifier: Some(PortSpecifier::PortValue(port)),
            ..Default::default()
        })),
    }
}

fn lb_id_struct(index: usize) -> Struct {
    let mut fields = Struct::default();
    fields
        .fields
        .insert("lb_id".to_string(), Value { kind: Some(Kind::StringValue(index.to_string())) });
    fields
}

fn millis_to_duration(millis: u64) -> Duration {
    Duration { seconds: (millis / 1000) as i64, nanos: ((millis % 1000) * 1_000_000) as i32 }
}

fn http_protocol_options(http2_enabled: bool, settings: &GatewaySettings) -> HttpProtocolOptions {
    let protocol_config = if http2_enabled {
        ProtocolConfig::Http2ProtocolOptions(Http2ProtocolOptions {
            hpack_table_size: Some(UInt32Value {
                value: settings.upstream.http2.hpack_table_size,
            }),
            max_concurrent_streams: Some(UInt32Value {
                value: settings.upstream.http2.max_concurrent_streams,
            }),
            ..Default::default()
        })
    } else {
        ProtocolConfig::HttpProtocolOptions(Http1ProtocolOptions {
            enable_trailers: settings.wire_log.log_trailers_enabled,
            ..Default::default()
        })
    };

    HttpProtocolOptions {
        upstream_protocol_options: Some(UpstreamProtocolOptions::ExplicitHttpConfig(
            ExplicitHttpConfig { protocol_config: Some(protocol_config) },
        )),
        ..Default::default()
    }
}

fn tcp_health_check(health: &HealthCheckSettings) -> HealthCheck {
    HealthCheck {
        timeout: Some(Duration { seconds: health.timeout_secs as i64, nanos: 0 }),
        interval: Some(Duration { seconds: health.interval_secs as i64, nanos: 0 }),
        healthy_threshold: Some(UInt32Value { value: health.healthy_threshold }),
        unhealthy_threshold: Some(UInt32Value { value: health.unhealthy_threshold }),
        health_checker: Some(HealthChecker::TcpHealthCheck(TcpHealthCheck::default())),
        ..Default::default()
    }
}

fn circuit_breakers(config: &CircuitBreakerConfig) -> CircuitBreakers {
    let mut thresholds = Thresholds::default();
    if config.max_connections > 0 {
        thresholds.max_connections = Some(UInt32Value { value: config.max_connections });
    }
    if config.max_connection_pools > 0 {
        thresholds.max_connection_pools = Some(UInt32Value { value: config.max_connection_pools });
    }
    if config.max_pending_requests > 0 {
        thresholds.max_pending_requests = Some(UInt32Value { value: config.max_pending_requests });
    }
    if config.max_requests > 0 {
        thresholds.max_requests = Some(UInt32Value { value: config.max_requests });
    }
    if config.max_retries > 0 {
        thresholds.max_retries = Some(UInt32Value { value: config.max_retries });
    }
    CircuitBreakers { thresholds: vec![thresholds], ..Default::default() }
}

/// Build the upstream TLS context for one endpoint.
///
/// IP-literal hosts get no SNI and IP-mode SAN matching; hostnames get SNI
/// plus DNS-mode SAN matching. Trust material resolves per-URL inline bytes
/// first, then the store's default entry, then the configured CA bundle.
fn upstream_tls_context(
    upstream_cert: Option<&[u8]>,
    host: &str,
    http2_enabled: bool,
    settings: &GatewaySettings,
) -> UpstreamTlsContext {
    let tls = &settings.upstream.tls;

    let cipher_suites: Vec<String> =
        tls.ciphers.split(',').map(|cipher| cipher.trim().to_string()).collect();

    let client_cert = TlsCertificate {
        private_key: Some(DataSource {
            specifier: Some(Specifier::Filename(settings.key_store.key_path.clone())),
            ..Default::default()
        }),
        certificate_chain: Some(DataSource {
            specifier: Some(Specifier::Filename(settings.key_store.cert_path.clone())),
            ..Default::default()
        }),
        ..Default::default()
    };

    let mut common_tls_context = CommonTlsContext {
        tls_params: Some(TlsParameters {
            tls_minimum_protocol_version: tls_protocol_version(&tls.minimum_protocol_version)
                as i32,
            tls_maximum_protocol_version: tls_protocol_version(&tls.maximum_protocol_version)
                as i32,
            cipher_suites,
            ..Default::default()
        }),
        tls_certificates: vec![client_cert],
        ..Default::default()
    };

    if http2_enabled {
        common_tls_context.alpn_protocols = vec!["h2".to_string(), "http/1.1".to_string()];
    }

    let mut context = UpstreamTlsContext::default();

    let mut san_type = SanType::IpAddress;
    // Sni is only assigned when there is a hostname
    if host.parse::<IpAddr>().is_err() {
        context.sni = host.to_string();
        san_type = SanType::Dns;
    }

    if !tls.disable_ssl_verification {
        let trusted_ca = match upstream_cert {
            Some(bytes) if !bytes.is_empty() => DataSource {
                specifier: Some(Specifier::InlineBytes(bytes.to_vec())),
                ..Default::default()
            },
            _ => DataSource {
                specifier: Some(Specifier::Filename(tls.trusted_cert_path.clone())),
                ..Default::default()
            },
        };

        let mut validation_context =
            CertificateValidationContext { trusted_ca: Some(trusted_ca), ..Default::default() };

        if tls.verify_host_name {
            validation_context.match_typed_subject_alt_names = vec![SubjectAltNameMatcher {
                san_type: san_type as i32,
                matcher: Some(StringMatcher {
                    match_pattern: Some(MatchPattern::Exact(host.to_string())),
                    ..Default::default()
                }),
                ..Default::default()
            }];
        }

        common_tls_context.validation_context_type =
            Some(ValidationContextType::ValidationContext(validation_context));
    }

    context.common_tls_context = Some(common_tls_context);
    context
}

fn tls_protocol_version(version: &str) -> TlsProtocol {
    match version {
        "TLS1_0" => TlsProtocol::TlSv10,
        "TLS1_1" => TlsProtocol::TlSv11,
        "TLS1_2" => TlsProtocol::TlSv12,
        "TLS1_3" => TlsProtocol::TlSv13,
        _ => TlsProtocol::TlsAuto,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Endpoint, EndpointConfig};

    fn endpoint(host: &str, port: u32, scheme: &str, basepath: &str) -> Endpoint {
        Endpoint {
            host: host.to_string(),
            port,
            url_type: scheme.to_string(),
            basepath: basepath.to_string(),
            raw_url: format!("{}://{}:{}{}", scheme, host, port, basepath),
            service_discovery_string: None,
        }
    }

    fn group(endpoints: Vec<Endpoint>) -> EndpointGroup {
        EndpointGroup { endpoints, ..Default::default() }
    }

    fn decode_tls_context(cluster: &Cluster, index: usize) -> UpstreamTlsContext {
        let transport_socket = cluster.transport_socket_matches[index]
            .transport_socket
            .as_ref()
            .expect("transport socket");
        let typed = match transport_socket.config_type.as_ref() {
            Some(ConfigType::TypedConfig(any)) => any,
            _ => panic!("missing typed config"),
        };
        UpstreamTlsContext::decode(typed.value.as_slice()).expect("decode tls context")
    }

    #[test]
    fn test_basepath_mismatch_fails_group() {
        let settings = GatewaySettings::default();
        let group = group(vec![
            endpoint("a.example", 443, "https", "/api"),
            endpoint("b.example", 443, "https", "/other"),
        ]);
        let err = build_endpoint_cluster(
            "c1",
            &group,
            &CertificateStore::new(),
            20,
            "/api",
            &settings,
        )
        .unwrap_err();
        assert!(err.to_string().contains("basepath mismatched"));
    }

    #[test]
    fn test_trailing_slash_normalized_in_basepath_check() {
        let settings = GatewaySettings::default();
        let group = group(vec![endpoint("a.example", 80, "http", "/api/")]);
        let (cluster, addresses) = build_endpoint_cluster(
            "c1",
            &group,
            &CertificateStore::new(),
            20,
            "/api",
            &settings,
        )
        .expect("group compiles");
        assert_eq!(cluster.name, "c1");
        assert_eq!(addresses.len(), 1);
    }

    #[test]
    fn test_failover_priorities_increase_in_order() {
        let settings = GatewaySettings::default();
        let mut failover = group(vec![
            endpoint("a.example", 80, "http", "/api"),
            endpoint("b.example", 80, "http", "/api"),
            endpoint("c.example", 80, "http", "/api"),
        ]);
        failover.endpoint_type = "failover".to_string();

        let (cluster, _) = build_endpoint_cluster(
            "c1",
            &failover,
            &CertificateStore::new(),
            20,
            "/api",
            &settings,
        )
        .expect("group compiles");
        let priorities: Vec<u32> = cluster
            .load_assignment
            .as_ref()
            .unwrap()
            .endpoints
            .iter()
            .map(|locality| locality.priority)
            .collect();
        assert_eq!(priorities, vec![0, 1, 2]);
    }

    #[test]
    fn test_loadbalance_priorities_all_zero() {
        let settings = GatewaySettings::default();
        let mut lb = group(vec![
            endpoint("a.example", 80, "http", "/api"),
            endpoint("b.example", 80, "http", "/api"),
        ]);
        lb.endpoint_type = "loadbalance".to_string();

        let (cluster, _) =
            build_endpoint_cluster("c1", &lb, &CertificateStore::new(), 20, "/api", &settings)
                .expect("group compiles");
        assert!(cluster
            .load_assignment
            .as_ref()
            .unwrap()
            .endpoints
            .iter()
            .all(|locality| locality.priority == 0));
    }

    #[test]
    fn test_tls_endpoints_get_transport_socket_matches() {
        let settings = GatewaySettings::default();
        let group = group(vec![
            endpoint("a.example", 443, "https", "/api"),
            endpoint("b.example", 443, "https", "/api"),
        ]);

        let (cluster, _) =
            build_endpoint_cluster("c1", &group, &CertificateStore::new(), 20, "/api", &settings)
                .expect("group compiles");
        assert_eq!(cluster.transport_socket_matches.len(), 2);
        assert_eq!(cluster.transport_socket_matches[0].name, "ts0");
        assert_eq!(cluster.transport_socket_matches[1].name, "ts1");

        for (index, socket_match) in cluster.transport_socket_matches.iter().enumerate() {
            let fields = &socket_match.r#match.as_ref().unwrap().fields;
            match fields.get("lb_id").and_then(|value| value.kind.as_ref()) {
                Some(Kind::StringValue(value)) => assert_eq!(value, &index.to_string()),
                other => panic!("unexpected lb_id value: {:?}", other),
            }
        }

        // endpoint metadata selects the matching transport socket
        let locality = &cluster.load_assignment.as_ref().unwrap().endpoints[1];
        let metadata = locality.lb_endpoints[0].metadata.as_ref().expect("metadata");
        assert!(metadata.filter_metadata.contains_key(TRANSPORT_SOCKET_MATCH_METADATA));
    }

    #[test]
    fn test_plaintext_endpoints_have_no_transport_socket() {
        let settings = GatewaySettings::default();
        let group = group(vec![endpoint("a.example", 80, "http", "/api")]);
        let (cluster, _) =
            build_endpoint_cluster("c1", &group, &CertificateStore::new(), 20, "/api", &settings)
                .expect("group compiles");
        assert!(cluster.transport_socket_matches.is_empty());
    }

    #[test]
    fn test_sni_for_hostname_and_ip() {
        let settings = GatewaySettings::default();
        let group = group(vec![
            endpoint("a.example", 443, "https", "/api"),
            endpoint("10.0.0.7", 443, "https", "/api"),
        ]);
        let (cluster, _) =
            build_endpoint_cluster("c1", &group, &CertificateStore::new(), 20, "/api", &settings)
                .expect("group compiles");

        let hostname_context = decode_tls_context(&cluster, 0);
        assert_eq!(hostname_context.sni, "a.example");
        let san = &hostname_context
            .common_tls_context
            .as_ref()
            .unwrap()
            .validation_context_type
            .as_ref()
            .map(|validation| match validation {
                ValidationContextType::ValidationContext(ctx) => {
                    ctx.match_typed_subject_alt_names[0].san_type
                }
                _ => panic!("unexpected validation context"),
            })
            .unwrap();
        assert_eq!(*san, SanType::Dns as i32);

        let ip_context = decode_tls_context(&cluster, 1);
        assert!(ip_context.sni.is_empty());
    }

    #[test]
    fn test_inline_cert_preferred_over_trusted_ca_file() {
        let settings = GatewaySettings::default();
        let mut store = CertificateStore::new();
        store.insert("https://a.example:443/api", b"pem-bytes".to_vec());
        let group = group(vec![endpoint("a.example", 443, "https", "/api")]);

        let (cluster, _) =
            build_endpoint_cluster("c1", &group, &store, 20, "/api", &settings).expect("compiles");
        let context = decode_tls_context(&cluster, 0);
        let validation = match context
            .common_tls_context
            .as_ref()
            .unwrap()
            .validation_context_type
            .as_ref()
            .unwrap()
        {
            ValidationContextType::ValidationContext(ctx) => ctx,
            _ => panic!("unexpected validation context"),
        };
        match validation.trusted_ca.as_ref().unwrap().specifier.as_ref().unwrap() {
            Specifier::InlineBytes(bytes) => assert_eq!(bytes, b"pem-bytes"),
            other => panic!("expected inline bytes, got {:?}", other),
        }
    }

    #[test]
    fn test_health_check_only_for_multiple_endpoints() {
        let settings = GatewaySettings::default();

        let single = group(vec![endpoint("a.example", 80, "http", "/api")]);
        let (cluster, _) =
            build_endpoint_cluster("c1", &single, &CertificateStore::new(), 20, "/api", &settings)
                .expect("compiles");
        assert!(cluster.health_checks.is_empty());

        let pair = group(vec![
            endpoint("a.example", 80, "http", "/api"),
            endpoint("b.example", 80, "http", "/api"),
        ]);
        let (cluster, _) =
            build_endpoint_cluster("c2", &pair, &CertificateStore::new(), 20, "/api", &settings)
                .expect("compiles");
        assert_eq!(cluster.health_checks.len(), 1);
        assert!(matches!(
            cluster.health_checks[0].health_checker,
            Some(HealthChecker::TcpHealthCheck(_))
        ));
    }

    #[test]
    fn test_circuit_breakers_emit_only_positive_thresholds() {
        let settings = GatewaySettings::default();
        let mut limited = group(vec![endpoint("a.example", 80, "http", "/api")]);
        limited.config = Some(EndpointConfig {
            circuit_breakers: Some(CircuitBreakerConfig {
                max_connections: 100,
                max_requests: 50,
                ..Default::default()
            }),
            ..Default::default()
        });

        let (cluster, _) =
            build_endpoint_cluster("c1", &limited, &CertificateStore::new(), 20, "/api", &settings)
                .expect("compiles");
        let thresholds = &cluster.circuit_breakers.as_ref().unwrap().thresholds[0];
        assert_eq!(thresholds.max_connections.as_ref().unwrap().value, 100);
        assert_eq!(thresholds.max_requests.as_ref().unwrap().value, 50);
        assert!(thresholds.max_pending_requests.is_none());
        assert!(thresholds.max_retries.is_none());
        assert!(thresholds.max_connection_pools.is_none());
    }

    #[test]
    fn test_http2_protocol_options() {
        let settings = GatewaySettings::default();
        let mut http2 = group(vec![endpoint("a.example", 80, "http", "/api")]);
        http2.http2_backend_enabled = true;

        let (cluster, _) =
            build_endpoint_cluster("c1", &http2, &CertificateStore::new(), 20, "/api", &settings)
                .expect("compiles");
        let any = &cluster.typed_extension_protocol_options[HTTP_PROTOCOL_OPTIONS_EXTENSION_KEY];
        assert_eq!(any.type_url, HTTP_PROTOCOL_OPTIONS_TYPE_URL);

        let options = HttpProtocolOptions::decode(any.value.as_slice()).expect("decode");
        match options.upstream_protocol_options {
            Some(UpstreamProtocolOptions::ExplicitHttpConfig(explicit)) => {
                match explicit.protocol_config {
                    Some(ProtocolConfig::Http2ProtocolOptions(http2_options)) => {
                        assert_eq!(http2_options.hpack_table_size.unwrap().value, 4096);
                        assert_eq!(http2_options.max_concurrent_streams.unwrap().value, 100);
                    }
                    other => panic!("expected HTTP/2 options, got {:?}", other),
                }
            }
            other => panic!("expected explicit config, got {:?}", other),
        }
    }

    #[test]
    fn test_service_discovery_string_registered() {
        let settings = GatewaySettings::default();
        let mut discovered = endpoint("a.example", 80, "http", "/api");
        discovered.service_discovery_string = Some("consul(quote-service)".to_string());
        let group = group(vec![discovered]);

        build_endpoint_cluster(
            "discovered_cluster",
            &group,
            &CertificateStore::new(),
            20,
            "/api",
            &settings,
        )
        .expect("compiles");
        assert_eq!(
            discovery::discovery_string_for("discovered_cluster").as_deref(),
            Some("consul(quote-service)")
        );
    }

    #[test]
    fn test_cluster_shape_defaults() {
        let settings = GatewaySettings::default();
        let group = group(vec![endpoint("a.example", 80, "http", "/api")]);
        let (cluster, addresses) =
            build_endpoint_cluster("c1", &group, &CertificateStore::new(), 20, "/api", &settings)
                .expect("compiles");

        assert_eq!(
            cluster.cluster_discovery_type,
            Some(ClusterDiscoveryType::Type(DiscoveryType::StrictDns as i32))
        );
        assert_eq!(cluster.dns_lookup_family, DnsLookupFamily::V4Only as i32);
        assert_eq!(cluster.lb_policy, LbPolicy::RoundRobin as i32);
        assert_eq!(cluster.connect_timeout.as_ref().unwrap().seconds, 20);
        assert_eq!(cluster.dns_refresh_rate.as_ref().unwrap().seconds, 5);
        assert_eq!(addresses.len(), 1);
        match addresses[0].address.as_ref().unwrap() {
            address::Address::SocketAddress(socket) => {
                assert_eq!(socket.address, "a.example");
                assert_eq!(socket.port_specifier, Some(PortSpecifier::PortValue(80)));
            }
            other => panic!("unexpected address {:?}", other),
        }
    }
}
