//! # Gateplane
//!
//! Gateplane is the configuration translation core of an API gateway control
//! plane. Given a high-level API description (an OpenAPI-style document
//! enriched with `x-wso2-*` vendor extensions declaring upstream endpoints,
//! interceptors, CORS, and routing policy), it produces the semantically
//! equivalent Envoy configuration: an ordered route list, a cluster list, and
//! the socket addresses backing those clusters.
//!
//! ## Architecture
//!
//! The translation is a pure function pipeline:
//!
//! ```text
//! ApiDescription ─→ Translator ─→ (routes, clusters, addresses)
//!                       │
//!            ┌──────────┼──────────────┐
//!       Endpoint    Interceptor      Route
//!       compiler     compiler       compiler
//! ```
//!
//! OpenAPI ingestion, the xDS snapshot aggregator, and the management REST
//! API live outside this crate; the translator consumes an already-populated
//! [`model::ApiDescription`] and hands immutable outputs back to the caller.

pub mod config;
pub mod discovery;
pub mod errors;
pub mod model;
pub mod xds;

// Re-export commonly used types and traits
pub use config::GatewaySettings;
pub use errors::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_available() {
        assert!(!VERSION.is_empty());
        assert_eq!(APP_NAME, "gateplane");
    }
}
