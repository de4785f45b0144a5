//! # sophia-captoken
//!
//! Capability tokens for the Sophia agent platform.
//!
//! This crate provides functionality for:
//! - Generating Ed25519 keypairs (or loading injected PEM keys) for signing
//! - Issuing signed tokens scoped by tenant, swarm, PII level, tools and
//!   collections
//! - Issuing least-privilege tokens for known internal services
//! - Validating presented tokens and authorizing them against requirements
//!
//! ## Token lifecycle
//!
//! | Step | Operation | Failure |
//! |------|-----------|---------|
//! | Issue | [`CapabilityTokenService::issue`] | scope outside allow-lists, reserved extra claim |
//! | Validate | [`CapabilityTokenService::validate`] | expired, bad signature/issuer, wrong `token_type`, missing claims |
//! | Authorize | [`CapabilityTokenService::authorize`] | tenant/swarm mismatch, PII level too low, missing tools/collections |
//!
//! Tokens are never stored server-side and cannot be revoked; `exp` is the
//! only thing that ends a token's life.

pub mod claims;
pub mod error;
pub mod keys;
pub mod request;
pub mod token;

pub use claims::{CapabilityClaims, RESERVED_CLAIMS, TOKEN_TYPE};
pub use error::{ScopeDenial, TokenError};
pub use jsonwebtoken::Algorithm;
pub use keys::{KeyPair, parse_algorithm};
pub use sophia_core::{PiiLevel, Scope};
pub use request::{DEFAULT_TTL_MINUTES, IssueRequest, Requirements, SERVICE_TTL_MINUTES};
pub use token::{CapabilityTokenService, TokenInfo, TokenVerifier, inspect_token_unverified};
