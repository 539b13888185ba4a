//! Deterministic cluster-name construction.
//!
//! This is the sole source of cluster identifiers; no other module may
//! assemble them. Names are injective per (organization, endpoint prefix,
//! vHost, title, version, resource id) so that distinct upstream groups can
//! never collide in the proxy.

/// Mint the cluster name for an endpoint group.
///
/// API-scoped names take the form
/// `{org}_{prefix}_{vhost}_{title-without-spaces}{version}`; resource-scoped
/// names append `_{resource-id-without-spaces}0`, the trailing `0`
/// disambiguating them from API-scoped names sharing the same suffix.
pub fn cluster_name(
    endpoint_prefix: &str,
    organization_id: &str,
    vhost: &str,
    title: &str,
    version: &str,
    resource_id: &str,
) -> String {
    let base = format!(
        "{}_{}_{}_{}{}",
        organization_id,
        endpoint_prefix,
        vhost,
        strip_spaces(title),
        version
    );
    if resource_id.is_empty() {
        base.trim().to_string()
    } else {
        format!("{}_{}0", base.trim(), strip_spaces(resource_id))
    }
}

fn strip_spaces(value: &str) -> String {
    value.replace(' ', "")
}
