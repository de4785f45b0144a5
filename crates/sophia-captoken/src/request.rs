//! Issuance requests and authorization requirements.

use serde_json::{Map, Value};
use sophia_core::PiiLevel;
use std::collections::BTreeSet;

/// Token lifetime when a request names none.
pub const DEFAULT_TTL_MINUTES: i64 = 60;

/// Lifetime of service-to-service tokens (12 hours).
pub const SERVICE_TTL_MINUTES: i64 = 720;

/// Parameters for [`crate::CapabilityTokenService::issue`].
///
/// Scope fields are raw caller input; they are checked against the
/// allow-lists at issue time. Unset fields take the documented defaults.
#[derive(Debug, Clone, Default)]
pub struct IssueRequest {
    pub subject: String,
    pub tenant: String,
    /// Defaults to `default`.
    pub swarm: Option<String>,
    /// Defaults to `none`.
    pub pii_level: Option<String>,
    /// Defaults to `read`, `health`, `status`.
    pub tools: Option<BTreeSet<String>>,
    /// Defaults to `metadata`, `cache`.
    pub collections: Option<BTreeSet<String>>,
    /// Defaults to [`DEFAULT_TTL_MINUTES`]. Zero or negative values yield
    /// tokens that are already expired.
    pub ttl_minutes: Option<i64>,
    pub extra_claims: Map<String, Value>,
}

impl IssueRequest {
    pub fn new(subject: impl Into<String>, tenant: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            tenant: tenant.into(),
            ..Default::default()
        }
    }

    pub fn swarm(mut self, swarm: impl Into<String>) -> Self {
        self.swarm = Some(swarm.into());
        self
    }

    pub fn pii_level(mut self, pii_level: impl Into<String>) -> Self {
        self.pii_level = Some(pii_level.into());
        self
    }

    pub fn tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools = Some(tools.into_iter().map(Into::into).collect());
        self
    }

    pub fn collections<I, S>(mut self, collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.collections = Some(collections.into_iter().map(Into::into).collect());
        self
    }

    pub fn ttl_minutes(mut self, ttl_minutes: i64) -> Self {
        self.ttl_minutes = Some(ttl_minutes);
        self
    }

    /// Add one extra claim. Reserved names are rejected at issue time.
    pub fn claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra_claims.insert(name.into(), value.into());
        self
    }
}

/// What a caller demands of a presented token.
///
/// Every field is optional; an unset field (or empty set) is satisfied by
/// any token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirements {
    pub tenant: Option<String>,
    pub swarm: Option<String>,
    pub pii_level: Option<PiiLevel>,
    pub tools: BTreeSet<String>,
    pub collections: BTreeSet<String>,
}

impl Requirements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    pub fn swarm(mut self, swarm: impl Into<String>) -> Self {
        self.swarm = Some(swarm.into());
        self
    }

    pub fn pii_level(mut self, pii_level: PiiLevel) -> Self {
        self.pii_level = Some(pii_level);
        self
    }

    pub fn tool(mut self, tool: impl Into<String>) -> Self {
        self.tools.insert(tool.into());
        self
    }

    pub fn tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools.extend(tools.into_iter().map(Into::into));
        self
    }

    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.collections.insert(collection.into());
        self
    }

    pub fn collections<I, S>(mut self, collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.collections
            .extend(collections.into_iter().map(Into::into));
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
