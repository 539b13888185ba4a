//! Property-style checks over the translation invariants.

use proptest::prelude::*;

use envoy_types::pb::envoy::config::route::v3::{route::Action, Route};

use gateplane::config::GatewaySettings;
use gateplane::model::{
    ApiDescription, ApiType, CertificateStore, Endpoint, EndpointGroup, Operation, Resource,
};
use gateplane::xds::{naming::cluster_name, translate};

fn ident() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,7}"
}

fn endpoint(basepath: &str) -> Endpoint {
    Endpoint {
        host: "upstream.example".to_string(),
        port: 443,
        url_type: "https".to_string(),
        basepath: basepath.to_string(),
        raw_url: format!("https://upstream.example:443{}", basepath),
        service_discovery_string: None,
    }
}

fn substitution_of(route: &Route) -> String {
    match route.action.as_ref().unwrap() {
        Action::Route(action) => {
            action.regex_rewrite.as_ref().expect("regex rewrite").substitution.clone()
        }
        other => panic!("unexpected action {:?}", other),
    }
}

proptest! {
    #[test]
    fn cluster_names_are_deterministic(
        prefix in ident(),
        org in ident(),
        vhost in ident(),
        title in ident(),
        version in ident(),
        resource_id in ident(),
    ) {
        let first = cluster_name(&prefix, &org, &vhost, &title, &version, &resource_id);
        let second = cluster_name(&prefix, &org, &vhost, &title, &version, &resource_id);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn distinct_resource_ids_yield_distinct_names(
        prefix in ident(),
        org in ident(),
        vhost in ident(),
        title in ident(),
        version in ident(),
        resource_a in ident(),
        resource_b in ident(),
    ) {
        prop_assume!(resource_a != resource_b);
        let a = cluster_name(&prefix, &org, &vhost, &title, &version, &resource_a);
        let b = cluster_name(&prefix, &org, &vhost, &title, &version, &resource_b);
        prop_assert_ne!(a, b);
    }

    #[test]
    fn sandbox_routes_precede_production_routes(resource_count in 1usize..5) {
        let mut prod = EndpointGroup {
            endpoints: vec![endpoint("/v1")],
            ..Default::default()
        };
        prod.endpoint_prefix = "clusterProd".to_string();
        let mut sand = EndpointGroup {
            endpoints: vec![endpoint("/v1-sand")],
            ..Default::default()
        };
        sand.endpoint_prefix = "clusterSand".to_string();

        let api = ApiDescription {
            title: "orders".to_string(),
            version: "v1".to_string(),
            id: "orders-v1".to_string(),
            api_type: ApiType::Rest,
            prod_endpoints: Some(prod),
            sand_endpoints: Some(sand),
            resources: (0..resource_count)
                .map(|index| Resource {
                    id: format!("res{}", index),
                    path: format!("/items{}", index),
                    operations: vec![Operation::new("GET")],
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };

        let output = translate(
            &api,
            &CertificateStore::new(),
            &CertificateStore::new(),
            "gw.example.com",
            "org",
            &GatewaySettings::default(),
        );

        // one sandbox + one production route per resource, sandbox strictly
        // first within each pair
        prop_assert_eq!(output.routes.len(), resource_count * 2);
        for pair in output.routes.chunks(2) {
            let sandbox_headers = &pair[0].r#match.as_ref().unwrap().headers;
            let production_headers = &pair[1].r#match.as_ref().unwrap().headers;
            prop_assert!(sandbox_headers
                .iter()
                .any(|header| header.name == "x-wso2-cluster-header"));
            prop_assert!(production_headers
                .iter()
                .all(|header| header.name != "x-wso2-cluster-header"));
        }
    }

    #[test]
    fn substitution_preserves_every_path_parameter(param_count in 1usize..4) {
        let path: String = (0..param_count)
            .map(|index| format!("/seg{}/{{p{}}}", index, index))
            .collect();

        let api = ApiDescription {
            title: "catalog".to_string(),
            version: "v1".to_string(),
            id: "catalog-v1".to_string(),
            api_type: ApiType::Rest,
            x_wso2_basepath: "/catalog".to_string(),
            prod_endpoints: Some(EndpointGroup {
                endpoints: vec![endpoint("/backend")],
                ..Default::default()
            }),
            resources: vec![Resource {
                id: "res0".to_string(),
                path,
                operations: vec![Operation::new("GET")],
                ..Default::default()
            }],
            ..Default::default()
        };

        let output = translate(
            &api,
            &CertificateStore::new(),
            &CertificateStore::new(),
            "gw.example.com",
            "org",
            &GatewaySettings::default(),
        );

        let substitution = substitution_of(&output.routes[0]);
        prop_assert!(substitution.starts_with("/backend"));
        for index in 1..=param_count {
            let expected = format!("\\{}", index);
            prop_assert!(substitution.contains(&expected));
        }
    }
}
