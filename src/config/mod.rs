//! # Configuration Management
//!
//! Settings consumed by the translation core. Unlike a process-global
//! configuration singleton, the settings tree is passed to the translator
//! explicitly so tests stay hermetic.

mod settings;

pub use settings::{
    DnsSettings, GatewaySettings, HealthCheckSettings, Http2Settings, KeyStoreSettings,
    RetrySettings, TracingSettings, UpstreamSettings, UpstreamTimeoutSettings, UpstreamTlsSettings,
    WireLogSettings,
};
