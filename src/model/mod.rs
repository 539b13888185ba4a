//! # API Model
//!
//! The internal representation of an API description consumed by the
//! translator. OpenAPI ingestion (out of scope for this crate) populates
//! these types from the raw document and its `x-wso2-*` vendor extensions;
//! the translator reads them and never mutates the model.

mod api;
mod endpoint;
mod interceptor;

pub use api::{ApiDescription, ApiType, CorsConfiguration, Operation, Resource};
pub use endpoint::{
    CertificateStore, CircuitBreakerConfig, Endpoint, EndpointConfig, EndpointGroup,
    NamedEndpointGroup, RetryConfig,
};
pub use interceptor::{InterceptEndpoint, InterceptorIncludes, InterceptorLevel};
