//! Error types for capability token operations.

use sophia_core::{PiiLevel, ScopeViolation};
use std::fmt;
use thiserror::Error;

/// Errors that can occur while issuing, validating or authorizing tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Requested scope is outside the allow-lists.
    #[error("invalid scope: {0}")]
    InvalidScope(#[from] ScopeViolation),

    /// Extra claim collides with a reserved claim name.
    #[error("extra claim '{claim}' is reserved")]
    ReservedClaim { claim: String },

    /// Signing failed.
    #[error("failed to issue token: {0}")]
    TokenIssuance(String),

    /// Token is past its `exp`.
    #[error("token has expired")]
    TokenExpired,

    /// Token could not be decoded or its signature/issuer did not verify.
    #[error("malformed token: {0}")]
    TokenMalformed(String),

    /// Token is some other credential kind signed with the same key.
    #[error("expected a capability token, found token_type {found}")]
    TokenType { found: String },

    /// Token is missing required claims.
    #[error("token missing required claims: {}", .missing.join(", "))]
    TokenIncomplete { missing: Vec<String> },

    /// Token does not satisfy a requirement.
    #[error("insufficient scope: {0}")]
    InsufficientScope(ScopeDenial),

    /// No service profile with this name.
    #[error("unknown service: {name}")]
    UnknownService { name: String },

    /// Algorithm name is not an asymmetric JWS algorithm.
    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Failed to generate keypair.
    #[error("failed to generate keypair: {0}")]
    KeyGenerationFailed(String),

    /// Failed to parse private key.
    #[error("failed to parse private key: {0}")]
    InvalidPrivateKey(String),

    /// Failed to parse public key.
    #[error("failed to parse public key: {0}")]
    InvalidPublicKey(String),

    /// No key material configured and ephemeral keys are disabled.
    #[error("no {0} configured")]
    KeyMaterialMissing(String),

    /// IO error (reading/writing keys).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TokenError {
    /// Stable snake_case category for error responses.
    pub fn category(&self) -> &'static str {
        match self {
            TokenError::InvalidScope(_) => "invalid_scope",
            TokenError::ReservedClaim { .. } => "reserved_claim",
            TokenError::TokenIssuance(_) => "token_issuance",
            TokenError::TokenExpired => "token_expired",
            TokenError::TokenMalformed(_) => "token_malformed",
            TokenError::TokenType { .. } => "token_type",
            TokenError::TokenIncomplete { .. } => "token_incomplete",
            TokenError::InsufficientScope(_) => "insufficient_scope",
            TokenError::UnknownService { .. } => "unknown_service",
            TokenError::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            TokenError::KeyGenerationFailed(_) => "key_generation_failed",
            TokenError::InvalidPrivateKey(_) => "invalid_private_key",
            TokenError::InvalidPublicKey(_) => "invalid_public_key",
            TokenError::KeyMaterialMissing(_) => "key_material_missing",
            TokenError::Io(_) => "io",
        }
    }

    /// Whether the presented token was rejected, as opposed to a local fault.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            TokenError::TokenExpired
                | TokenError::TokenMalformed(_)
                | TokenError::TokenType { .. }
                | TokenError::TokenIncomplete { .. }
                | TokenError::InsufficientScope(_)
        )
    }
}

/// The first requirement a token failed to meet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeDenial {
    Tenant { required: String, actual: String },
    Swarm { required: String, actual: String },
    PiiLevel { required: PiiLevel, actual: PiiLevel },
    /// Sorted `required - granted`.
    MissingTools(Vec<String>),
    /// Sorted `required - granted`.
    MissingCollections(Vec<String>),
}

impl fmt::Display for ScopeDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeDenial::Tenant { required, actual } => {
                write!(f, "tenant '{required}' required, token has '{actual}'")
            }
            ScopeDenial::Swarm { required, actual } => {
                write!(f, "swarm '{required}' required, token has '{actual}'")
            }
            ScopeDenial::PiiLevel { required, actual } => {
                write!(f, "pii_level '{required}' required, token has '{actual}'")
            }
            ScopeDenial::MissingTools(tools) => {
                write!(f, "missing tools [{}]", tools.join(", "))
            }
            ScopeDenial::MissingCollections(collections) => {
                write!(f, "missing collections [{}]", collections.join(", "))
            }
        }
    }
}
