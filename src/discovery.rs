//! Process-wide registry linking compiled clusters to service discovery.
//!
//! When an upstream endpoint declares a service-discovery string, the cluster
//! compiled from it is recorded here so the discovery subsystem can resolve
//! its members at runtime. The registry is append-only during translation and
//! read concurrently by the discovery watcher, hence the mutex.

use std::collections::HashMap;
use std::sync::Mutex;

use once_cell::sync::Lazy;

static CLUSTER_DISCOVERY_KEYS: Lazy<Mutex<HashMap<String, String>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Record the service-discovery string for a compiled cluster.
pub fn register_cluster(cluster_name: &str, discovery_string: &str) {
    let mut map = CLUSTER_DISCOVERY_KEYS.lock().expect("discovery registry poisoned");
    map.insert(cluster_name.to_string(), discovery_string.to_string());
}

/// Look up the discovery string registered for a cluster, if any.
pub fn discovery_string_for(cluster_name: &str) -> Option<String> {
    let map = CLUSTER_DISCOVERY_KEYS.lock().expect("discovery registry poisoned");
    map.get(cluster_name).cloned()
}

/// Snapshot the full cluster → discovery-string mapping.
pub fn registered_clusters() -> HashMap<String, String> {
    let map = CLUSTER_DISCOVERY_KEYS.lock().expect("discovery registry poisoned");
    map.clone()
}
