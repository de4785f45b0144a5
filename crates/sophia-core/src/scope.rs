//! Capability scope model.
//!
//! A [`Scope`] is the authorization envelope a capability token carries. Every
//! field is drawn from a fixed allow-list; a `Scope` can only be built through
//! [`Scope::new`], which rejects (never clamps) values outside those lists.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Tenants a token may be scoped to.
pub const TENANTS: &[&str] = &["pay-ready", "dev", "staging", "test"];

/// Agent swarms a token may be scoped to.
pub const SWARMS: &[&str] = &["default", "research", "business", "context", "github"];

/// Operation names a token may grant.
pub const TOOLS: &[&str] = &[
    "read",
    "write",
    "search",
    "admin",
    "health",
    "status",
    "analyze",
    "embed",
    "index",
    "crm_read",
    "crm_write",
    "github_read",
    "github_write",
];

/// Data collections a token may grant access to.
pub const COLLECTIONS: &[&str] = &[
    "documents",
    "prospects",
    "metadata",
    "cache",
    "research",
    "business",
    "context",
    "embeddings",
    "code",
    "conversations",
];

pub const DEFAULT_SWARM: &str = "default";
pub const DEFAULT_TOOLS: &[&str] = &["read", "health", "status"];
pub const DEFAULT_COLLECTIONS: &[&str] = &["metadata", "cache"];

/// Tenant used for service-to-service tokens when the caller names none.
pub const DEFAULT_SERVICE_TENANT: &str = "pay-ready";

/// Sensitivity of personal data a token may touch.
///
/// Variants are declared in ordinal order, so the derived `Ord` is the
/// `none < low < medium < high` hierarchy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PiiLevel {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl PiiLevel {
    /// All levels, lowest first.
    pub const ALL: [PiiLevel; 4] = [
        PiiLevel::None,
        PiiLevel::Low,
        PiiLevel::Medium,
        PiiLevel::High,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PiiLevel::None => "none",
            PiiLevel::Low => "low",
            PiiLevel::Medium => "medium",
            PiiLevel::High => "high",
        }
    }

    /// Position in the hierarchy (0 = none).
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Whether a holder of `self` may access data requiring `required`.
    pub fn satisfies(self, required: PiiLevel) -> bool {
        self >= required
    }
}

impl fmt::Display for PiiLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PiiLevel {
    type Err = ScopeViolation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PiiLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| ScopeViolation::UnknownValue {
                field: ScopeField::PiiLevel,
                value: s.to_string(),
            })
    }
}

impl From<PiiLevel> for String {
    fn from(level: PiiLevel) -> Self {
        level.as_str().to_string()
    }
}

/// Names a scope field in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeField {
    Tenant,
    Swarm,
    PiiLevel,
    Tools,
    Collections,
}

impl ScopeField {
    pub fn as_str(self) -> &'static str {
        match self {
            ScopeField::Tenant => "tenant",
            ScopeField::Swarm => "swarm",
            ScopeField::PiiLevel => "pii_level",
            ScopeField::Tools => "tools",
            ScopeField::Collections => "collections",
        }
    }
}

impl fmt::Display for ScopeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requested scope value outside its allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeViolation {
    #[error("invalid {field}: '{value}' is not an allowed value")]
    UnknownValue { field: ScopeField, value: String },

    /// Members are sorted.
    #[error("invalid {field}: unknown members [{}]", .members.join(", "))]
    UnknownMembers {
        field: ScopeField,
        members: Vec<String>,
    },
}

/// The authorization envelope carried by a capability token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub tenant: String,
    pub swarm: String,
    pub pii_level: PiiLevel,
    pub tools: BTreeSet<String>,
    pub collections: BTreeSet<String>,
}

impl Scope {
    /// Build a scope, checking every field against its allow-list.
    ///
    /// Checks run in field order (tenant, swarm, pii_level, tools,
    /// collections) and the first violation is returned.
    pub fn new<T, C>(
        tenant: &str,
        swarm: &str,
        pii_level: &str,
        tools: T,
        collections: C,
    ) -> Result<Self, ScopeViolation>
    where
        T: IntoIterator,
        T::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        check_value(ScopeField::Tenant, tenant, TENANTS)?;
        check_value(ScopeField::Swarm, swarm, SWARMS)?;
        let pii_level = pii_level.parse::<PiiLevel>()?;

        let tools: BTreeSet<String> = tools.into_iter().map(Into::into).collect();
        check_members(ScopeField::Tools, &tools, TOOLS)?;

        let collections: BTreeSet<String> = collections.into_iter().map(Into::into).collect();
        check_members(ScopeField::Collections, &collections, COLLECTIONS)?;

        Ok(Self {
            tenant: tenant.to_string(),
            swarm: swarm.to_string(),
            pii_level,
            tools,
            collections,
        })
    }
}

fn check_value(field: ScopeField, value: &str, allowed: &[&str]) -> Result<(), ScopeViolation> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ScopeViolation::UnknownValue {
            field,
            value: value.to_string(),
        })
    }
}

fn check_members(
    field: ScopeField,
    members: &BTreeSet<String>,
    allowed: &[&str],
) -> Result<(), ScopeViolation> {
    let unknown: Vec<String> = members
        .iter()
        .filter(|m| !allowed.contains(&m.as_str()))
        .cloned()
        .collect();

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(ScopeViolation::UnknownMembers {
            field,
            members: unknown,
        })
    }
}

/// Least-privilege footprint of a known internal service.
#[derive(Debug, Clone, Copy)]
pub struct ServiceProfile {
    pub name: &'static str,
    pub swarm: &'static str,
    pub pii_level: PiiLevel,
    pub tools: &'static [&'static str],
    pub collections: &'static [&'static str],
}

impl ServiceProfile {
    /// Materialize this profile as a scope for `tenant`.
    pub fn scope(&self, tenant: &str) -> Result<Scope, ScopeViolation> {
        Scope::new(
            tenant,
            self.swarm,
            self.pii_level.as_str(),
            self.tools.iter().copied(),
            self.collections.iter().copied(),
        )
    }
}

pub const SERVICE_PROFILES: &[ServiceProfile] = &[
    ServiceProfile {
        name: "research",
        swarm: "research",
        pii_level: PiiLevel::Low,
        tools: &["search", "read", "analyze", "health", "status"],
        collections: &["research", "documents", "cache", "metadata"],
    },
    ServiceProfile {
        name: "business",
        swarm: "business",
        pii_level: PiiLevel::Medium,
        tools: &["search", "read", "crm_read", "analyze", "health", "status"],
        collections: &["prospects", "business", "documents", "cache", "metadata"],
    },
    ServiceProfile {
        name: "context",
        swarm: "context",
        pii_level: PiiLevel::Low,
        tools: &["search", "read", "embed", "index", "health", "status"],
        collections: &["context", "embeddings", "documents", "cache", "metadata"],
    },
    ServiceProfile {
        name: "github",
        swarm: "github",
        pii_level: PiiLevel::None,
        tools: &[
            "read",
            "search",
            "github_read",
            "github_write",
            "health",
            "status",
        ],
        collections: &["code", "metadata", "cache"],
    },
];

/// Look up a service profile by name.
pub fn service_profile(name: &str) -> Option<&'static ServiceProfile> {
    SERVICE_PROFILES.iter().find(|p| p.name == name)
}
