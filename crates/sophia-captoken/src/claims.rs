//! Claims carried by a capability token.

use crate::error::{ScopeDenial, TokenError};
use crate::request::Requirements;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sophia_core::{PiiLevel, Scope};
use std::collections::BTreeSet;

/// `token_type` literal distinguishing capability tokens from other
/// credentials signed with the same key.
pub const TOKEN_TYPE: &str = "capability";

/// Claims a decoded capability token must carry.
pub const REQUIRED_CLAIMS: &[&str] = &["sub", "tenant", "swarm", "pii_level", "tools", "collections"];

/// Claim names callers may not set through extra claims.
pub const RESERVED_CLAIMS: &[&str] = &[
    "sub",
    "iat",
    "exp",
    "nbf",
    "iss",
    "aud",
    "jti",
    "token_type",
    "tenant",
    "swarm",
    "pii_level",
    "tools",
    "collections",
];

/// Decoded claims of a capability token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityClaims {
    /// Caller identity (user or service).
    pub sub: String,

    pub tenant: String,
    pub swarm: String,
    pub pii_level: PiiLevel,
    pub tools: BTreeSet<String>,
    pub collections: BTreeSet<String>,

    /// Issued at (unix seconds).
    pub iat: i64,

    /// Expires at (unix seconds).
    pub exp: i64,

    pub iss: String,

    /// Unique issuance id, for audit tracing.
    pub jti: String,

    pub token_type: String,

    /// Every other claim (e.g. the service-token marker).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CapabilityClaims {
    /// The scope envelope of this token.
    pub fn scope(&self) -> Scope {
        Scope {
            tenant: self.tenant.clone(),
            swarm: self.swarm.clone(),
            pii_level: self.pii_level,
            tools: self.tools.clone(),
            collections: self.collections.clone(),
        }
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Check if the token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Get time until expiration.
    pub fn time_until_expiration(&self) -> Option<chrono::Duration> {
        self.expires_at().map(|exp| exp - Utc::now())
    }

    /// Whether this token was minted for service-to-service use.
    pub fn is_service_token(&self) -> bool {
        self.extra.get("service_token") == Some(&Value::Bool(true))
    }

    /// The full claims map, as it appears in the token payload.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Check this token against `requirements`.
    ///
    /// Requirements are checked in order (tenant, swarm, pii_level, tools,
    /// collections) and the first unmet one is reported.
    pub fn authorize(&self, requirements: &Requirements) -> Result<(), TokenError> {
        if let Some(required) = &requirements.tenant {
            if *required != self.tenant {
                return Err(TokenError::InsufficientScope(ScopeDenial::Tenant {
                    required: required.clone(),
                    actual: self.tenant.clone(),
                }));
            }
        }

        if let Some(required) = &requirements.swarm {
            if *required != self.swarm {
                return Err(TokenError::InsufficientScope(ScopeDenial::Swarm {
                    required: required.clone(),
                    actual: self.swarm.clone(),
                }));
            }
        }

        if let Some(required) = requirements.pii_level {
            if !self.pii_level.satisfies(required) {
                return Err(TokenError::InsufficientScope(ScopeDenial::PiiLevel {
                    required,
                    actual: self.pii_level,
                }));
            }
        }

        let missing_tools = missing(&requirements.tools, &self.tools);
        if !missing_tools.is_empty() {
            return Err(TokenError::InsufficientScope(ScopeDenial::MissingTools(
                missing_tools,
            )));
        }

        let missing_collections = missing(&requirements.collections, &self.collections);
        if !missing_collections.is_empty() {
            return Err(TokenError::InsufficientScope(
                ScopeDenial::MissingCollections(missing_collections),
            ));
        }

        Ok(())
    }
}

fn missing(required: &BTreeSet<String>, granted: &BTreeSet<String>) -> Vec<String> {
    required.difference(granted).cloned().collect()
}
