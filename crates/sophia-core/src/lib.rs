//! # sophia-core
//!
//! Shared types for the Sophia capability token system.
//!
//! - [`scope`]: the authorization envelope carried by every capability token
//!   (tenant, swarm, PII level, tools, collections) and the fixed allow-lists
//!   each field is checked against.
//! - [`config`]: YAML configuration for key material, issuer settings and the
//!   demo HTTP server.

// Configuration types shared across all Sophia crates
pub mod config;

pub mod scope;

pub use config::{ConfigError, ServerConfig, SophiaConfig, TokenConfig};
pub use scope::{
    COLLECTIONS, DEFAULT_COLLECTIONS, DEFAULT_SERVICE_TENANT, DEFAULT_SWARM, DEFAULT_TOOLS,
    PiiLevel, SERVICE_PROFILES, SWARMS, Scope, ScopeField, ScopeViolation, ServiceProfile,
    TENANTS, TOOLS, service_profile,
};
