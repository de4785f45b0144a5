//! Token issuance and verification.

use crate::claims::{CapabilityClaims, REQUIRED_CLAIMS, RESERVED_CLAIMS, TOKEN_TYPE};
use crate::error::TokenError;
use crate::keys::{KeyPair, parse_algorithm};
use crate::request::{DEFAULT_TTL_MINUTES, IssueRequest, Requirements, SERVICE_TTL_MINUTES};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Header, Validation};
use serde_json::{Map, Value};
use sophia_core::{
    DEFAULT_COLLECTIONS, DEFAULT_SWARM, DEFAULT_TOOLS, PiiLevel, Scope, TokenConfig,
    service_profile,
};

/// Verifies capability tokens with a public key alone.
///
/// Independent parties build one from the PEM returned by
/// [`CapabilityTokenService::export_public_key`].
#[derive(Clone)]
pub struct TokenVerifier {
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Create a verifier from a PEM public key.
    pub fn from_public_pem(
        public_pem: &[u8],
        issuer: &str,
        algorithm: Algorithm,
    ) -> Result<Self, TokenError> {
        let decoding = match algorithm {
            Algorithm::EdDSA => DecodingKey::from_ed_pem(public_pem),
            Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(public_pem),
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => DecodingKey::from_rsa_pem(public_pem),
            other => return Err(TokenError::UnsupportedAlgorithm(format!("{other:?}"))),
        }
        .map_err(|e| TokenError::InvalidPublicKey(e.to_string()))?;

        Ok(Self::new(decoding, issuer, algorithm))
    }

    fn new(decoding: DecodingKey, issuer: &str, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        Self {
            decoding,
            validation,
        }
    }

    /// Decode a token, verify its signature, issuer and expiry, and check it
    /// is a complete capability token.
    pub fn validate(&self, token: &str) -> Result<CapabilityClaims, TokenError> {
        let data = jsonwebtoken::decode::<Map<String, Value>>(
            token.trim(),
            &self.decoding,
            &self.validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::TokenExpired,
            _ => TokenError::TokenMalformed(e.to_string()),
        })?;
        let claims = data.claims;

        match claims.get("token_type") {
            Some(Value::String(t)) if t == TOKEN_TYPE => {}
            Some(Value::String(t)) => return Err(TokenError::TokenType { found: t.clone() }),
            Some(other) => {
                return Err(TokenError::TokenType {
                    found: other.to_string(),
                });
            }
            None => {
                return Err(TokenError::TokenType {
                    found: "<none>".to_string(),
                });
            }
        }

        let missing: Vec<String> = REQUIRED_CLAIMS
            .iter()
            .filter(|name| !claims.contains_key(**name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(TokenError::TokenIncomplete { missing });
        }

        serde_json::from_value(Value::Object(claims))
            .map_err(|e| TokenError::TokenMalformed(e.to_string()))
    }
}

/// Issues and validates capability tokens with one held keypair.
///
/// Key material is immutable after construction; share one instance behind
/// an `Arc` for concurrent use.
pub struct CapabilityTokenService {
    keypair: KeyPair,
    issuer: String,
    verifier: TokenVerifier,
}

impl CapabilityTokenService {
    /// Create a service from an existing keypair.
    pub fn new(keypair: KeyPair, issuer: impl Into<String>) -> Self {
        let issuer = issuer.into();
        let verifier = TokenVerifier::new(
            keypair.decoding_key().clone(),
            &issuer,
            keypair.algorithm(),
        );

        Self {
            keypair,
            issuer,
            verifier,
        }
    }

    /// Create a service from PEM-encoded key material.
    pub fn from_pem(
        private_pem: &[u8],
        public_pem: &[u8],
        issuer: impl Into<String>,
        algorithm: Algorithm,
    ) -> Result<Self, TokenError> {
        let keypair = KeyPair::from_pem(private_pem, public_pem, algorithm)?;
        Ok(Self::new(keypair, issuer))
    }

    /// Create a service with a freshly generated Ed25519 keypair.
    ///
    /// Only this instance can verify the tokens it issues.
    pub fn ephemeral(issuer: impl Into<String>) -> Result<Self, TokenError> {
        let issuer = issuer.into();
        tracing::warn!(
            issuer = %issuer,
            "generated ephemeral signing keys; tokens will not verify on other instances"
        );
        Ok(Self::new(KeyPair::generate()?, issuer))
    }

    /// Create a service from configuration, resolving keys from env or file.
    pub fn from_config(config: &TokenConfig) -> Result<Self, TokenError> {
        let algorithm = parse_algorithm(&config.algorithm)?;

        let Some(private_pem) = config.resolve_private_key()? else {
            if !config.ephemeral_keys {
                return Err(TokenError::KeyMaterialMissing("private key".to_string()));
            }
            if algorithm != Algorithm::EdDSA {
                return Err(TokenError::UnsupportedAlgorithm(format!(
                    "{} (ephemeral keys are EdDSA only)",
                    config.algorithm
                )));
            }
            return Self::ephemeral(config.issuer.clone());
        };

        let keypair = match config.resolve_public_key()? {
            Some(public_pem) => {
                KeyPair::from_pem(private_pem.as_bytes(), public_pem.as_bytes(), algorithm)?
            }
            None if algorithm == Algorithm::EdDSA => KeyPair::from_ed25519_private_pem(&private_pem)?,
            None => return Err(TokenError::KeyMaterialMissing("public key".to_string())),
        };

        Ok(Self::new(keypair, config.issuer.clone()))
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn algorithm(&self) -> Algorithm {
        self.keypair.algorithm()
    }

    /// A public-key-only verifier equivalent to [`Self::validate`].
    pub fn verifier(&self) -> TokenVerifier {
        self.verifier.clone()
    }

    /// The public key as PEM, for distribution to verifying parties.
    pub fn export_public_key(&self) -> &str {
        self.keypair.public_key_pem()
    }

    /// Issue a signed capability token.
    pub fn issue(&self, request: IssueRequest) -> Result<String, TokenError> {
        let swarm = request.swarm.as_deref().unwrap_or(DEFAULT_SWARM);
        let pii_level = request
            .pii_level
            .as_deref()
            .unwrap_or(PiiLevel::None.as_str());
        let tools = request
            .tools
            .unwrap_or_else(|| DEFAULT_TOOLS.iter().map(|t| t.to_string()).collect());
        let collections = request
            .collections
            .unwrap_or_else(|| DEFAULT_COLLECTIONS.iter().map(|c| c.to_string()).collect());

        let scope = Scope::new(&request.tenant, swarm, pii_level, tools, collections)?;

        if let Some(claim) = request
            .extra_claims
            .keys()
            .find(|k| RESERVED_CLAIMS.contains(&k.as_str()))
        {
            return Err(TokenError::ReservedClaim {
                claim: claim.clone(),
            });
        }

        let ttl_minutes = request.ttl_minutes.unwrap_or(DEFAULT_TTL_MINUTES);
        let now = Utc::now();
        let expires_at = Duration::try_minutes(ttl_minutes)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                TokenError::TokenIssuance(format!("ttl of {ttl_minutes} minutes is out of range"))
            })?;

        let claims = CapabilityClaims {
            sub: request.subject,
            tenant: scope.tenant,
            swarm: scope.swarm,
            pii_level: scope.pii_level,
            tools: scope.tools,
            collections: scope.collections,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.issuer.clone(),
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: TOKEN_TYPE.to_string(),
            extra: request.extra_claims,
        };

        let token = jsonwebtoken::encode(
            &Header::new(self.keypair.algorithm()),
            &claims,
            self.keypair.encoding_key(),
        )
        .map_err(|e| TokenError::TokenIssuance(e.to_string()))?;

        tracing::debug!(
            subject = %claims.sub,
            tenant = %claims.tenant,
            swarm = %claims.swarm,
            pii_level = %claims.pii_level,
            token_id = %claims.jti,
            "issued capability token"
        );

        Ok(token)
    }

    /// Issue a service-to-service token from a fixed service profile.
    pub fn issue_service_token(&self, service: &str, tenant: &str) -> Result<String, TokenError> {
        let profile = service_profile(service).ok_or_else(|| TokenError::UnknownService {
            name: service.to_string(),
        })?;

        let request = IssueRequest::new(format!("svc:{}", profile.name), tenant)
            .swarm(profile.swarm)
            .pii_level(profile.pii_level)
            .tools(profile.tools.iter().copied())
            .collections(profile.collections.iter().copied())
            .ttl_minutes(SERVICE_TTL_MINUTES)
            .claim("service_token", true)
            .claim("service", profile.name);

        self.issue(request)
    }

    /// Decode and verify a presented token.
    pub fn validate(&self, token: &str) -> Result<CapabilityClaims, TokenError> {
        self.verifier.validate(token)
    }

    /// Check decoded claims against `requirements`.
    pub fn authorize(
        &self,
        claims: &CapabilityClaims,
        requirements: &Requirements,
    ) -> Result<(), TokenError> {
        claims.authorize(requirements)
    }
}

/// Information about a token (for inspection).
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub header: Value,
    pub claims: Map<String, Value>,
}

/// Decode a token without verifying its signature (for debugging).
pub fn inspect_token_unverified(token: &str) -> Result<TokenInfo, TokenError> {
    let mut parts = token.trim().split('.');
    let (Some(header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::TokenMalformed(
            "expected three dot-separated segments".to_string(),
        ));
    };

    let header: Value = decode_segment(header)?;
    let claims: Map<String, Value> = decode_segment(payload)?;

    Ok(TokenInfo { header, claims })
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| TokenError::TokenMalformed(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| TokenError::TokenMalformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScopeDenial;
    use sophia_core::{DEFAULT_SERVICE_TENANT, ScopeField, ScopeViolation};
    use std::collections::BTreeSet;

    fn service() -> CapabilityTokenService {
        CapabilityTokenService::ephemeral("sophia-test").unwrap()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// Sign arbitrary claims with the service key, bypassing `issue`.
    fn sign_raw(service: &CapabilityTokenService, claims: &Value) -> String {
        jsonwebtoken::encode(
            &Header::new(service.algorithm()),
            claims,
            service.keypair.encoding_key(),
        )
        .unwrap()
    }

    #[test]
    fn test_issue_and_validate_roundtrip() {
        let service = service();
        let token = service
            .issue(
                IssueRequest::new("user:alice", "dev")
                    .swarm("business")
                    .pii_level("medium")
                    .tools(["search", "crm_read", "read"])
                    .collections(["prospects", "documents"]),
            )
            .unwrap();

        let claims = service.validate(&token).unwrap();
        assert_eq!(claims.sub, "user:alice");
        assert_eq!(claims.tenant, "dev");
        assert_eq!(claims.swarm, "business");
        assert_eq!(claims.pii_level, PiiLevel::Medium);
        assert_eq!(claims.tools, set(&["crm_read", "read", "search"]));
        assert_eq!(claims.collections, set(&["documents", "prospects"]));
        assert_eq!(claims.iss, "sophia-test");
        assert_eq!(claims.token_type, TOKEN_TYPE);
        assert_eq!(claims.exp - claims.iat, 60 * 60);
        assert!(uuid::Uuid::parse_str(&claims.jti).is_ok());
        assert!(claims.extra.is_empty());
    }

    #[test]
    fn test_issue_applies_defaults() {
        let service = service();
        let token = service.issue(IssueRequest::new("user:bob", "test")).unwrap();
        let claims = service.validate(&token).unwrap();

        assert_eq!(claims.swarm, "default");
        assert_eq!(claims.pii_level, PiiLevel::None);
        assert_eq!(claims.tools, set(&["health", "read", "status"]));
        assert_eq!(claims.collections, set(&["cache", "metadata"]));
    }

    #[test]
    fn test_token_ids_are_unique() {
        let service = service();
        let a = service
            .validate(&service.issue(IssueRequest::new("user:a", "dev")).unwrap())
            .unwrap();
        let b = service
            .validate(&service.issue(IssueRequest::new("user:a", "dev")).unwrap())
            .unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = service();
        let token = service
            .issue(IssueRequest::new("user:alice", "dev").ttl_minutes(-1))
            .unwrap();

        assert!(matches!(
            service.validate(&token),
            Err(TokenError::TokenExpired)
        ));
    }

    #[test]
    fn test_long_lived_token_validates_immediately() {
        let service = service();
        let token = service
            .issue(IssueRequest::new("user:alice", "dev").ttl_minutes(60 * 24 * 365))
            .unwrap();
        let claims = service.validate(&token).unwrap();
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_out_of_range_ttl_fails_issuance() {
        let service = service();
        let err = service
            .issue(IssueRequest::new("user:alice", "dev").ttl_minutes(i64::MAX))
            .unwrap_err();
        assert!(matches!(err, TokenError::TokenIssuance(_)));
    }

    #[test]
    fn test_unknown_tenant_never_issues() {
        let service = service();
        let err = service
            .issue(IssueRequest::new("user:alice", "not-a-real-tenant"))
            .unwrap_err();

        match err {
            TokenError::InvalidScope(ScopeViolation::UnknownValue { field, value }) => {
                assert_eq!(field, ScopeField::Tenant);
                assert_eq!(value, "not-a-real-tenant");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_swarm_and_pii_level_rejected() {
        let service = service();

        let err = service
            .issue(IssueRequest::new("user:alice", "dev").swarm("hive"))
            .unwrap_err();
        assert!(err.to_string().contains("swarm"));

        let err = service
            .issue(IssueRequest::new("user:alice", "dev").pii_level("extreme"))
            .unwrap_err();
        assert!(matches!(
            err,
            TokenError::InvalidScope(ScopeViolation::UnknownValue {
                field: ScopeField::PiiLevel,
                ..
            })
        ));
    }

    #[test]
    fn test_unknown_tool_is_named() {
        let service = service();
        let err = service
            .issue(IssueRequest::new("user:alice", "dev").tools(["read", "not-a-real-tool"]))
            .unwrap_err();

        assert_eq!(err.category(), "invalid_scope");
        match err {
            TokenError::InvalidScope(ScopeViolation::UnknownMembers { field, members }) => {
                assert_eq!(field, ScopeField::Tools);
                assert_eq!(members, vec!["not-a-real-tool".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_collection_is_named() {
        let service = service();
        let err = service
            .issue(IssueRequest::new("user:alice", "dev").collections(["secrets"]))
            .unwrap_err();
        assert!(err.to_string().contains("secrets"));
    }

    #[test]
    fn test_reserved_extra_claims_rejected() {
        let service = service();
        for reserved in ["exp", "tenant", "token_type", "pii_level"] {
            let err = service
                .issue(IssueRequest::new("user:alice", "dev").claim(reserved, "override"))
                .unwrap_err();
            assert!(
                matches!(err, TokenError::ReservedClaim { ref claim } if claim == reserved),
                "{reserved} was accepted"
            );
        }
    }

    #[test]
    fn test_extra_claims_roundtrip() {
        let service = service();
        let token = service
            .issue(IssueRequest::new("user:alice", "dev").claim("request_id", "req-42"))
            .unwrap();
        let claims = service.validate(&token).unwrap();
        assert_eq!(
            claims.extra.get("request_id"),
            Some(&Value::String("req-42".into()))
        );
        assert_eq!(
            claims.to_map().get("request_id"),
            Some(&Value::String("req-42".into()))
        );
    }

    #[test]
    fn test_research_service_token_mapping() {
        let service = service();
        let token = service
            .issue_service_token("research", DEFAULT_SERVICE_TENANT)
            .unwrap();
        let claims = service.validate(&token).unwrap();

        assert_eq!(claims.sub, "svc:research");
        assert_eq!(claims.tenant, "pay-ready");
        assert_eq!(claims.swarm, "research");
        assert_eq!(claims.pii_level, PiiLevel::Low);
        assert_eq!(
            claims.tools,
            set(&["analyze", "health", "read", "search", "status"])
        );
        assert_eq!(
            claims.collections,
            set(&["cache", "documents", "metadata", "research"])
        );
        assert_eq!(claims.exp - claims.iat, 720 * 60);
        assert!(claims.is_service_token());
        assert_eq!(
            claims.extra.get("service"),
            Some(&Value::String("research".into()))
        );
    }

    #[test]
    fn test_every_service_profile_issues() {
        let service = service();
        for name in ["research", "business", "context", "github"] {
            let token = service.issue_service_token(name, "staging").unwrap();
            let claims = service.validate(&token).unwrap();
            assert_eq!(claims.swarm, name);
            assert_eq!(claims.tenant, "staging");
        }
    }

    #[test]
    fn test_unknown_service_rejected() {
        let service = service();
        let err = service
            .issue_service_token("not-a-service", DEFAULT_SERVICE_TENANT)
            .unwrap_err();
        assert!(matches!(err, TokenError::UnknownService { ref name } if name == "not-a-service"));
    }

    #[test]
    fn test_tampered_token_is_malformed() {
        let service = service();
        let token = service
            .issue(IssueRequest::new("user:alice", "dev"))
            .unwrap();

        // Flip one character in each segment (header, payload, signature).
        let dots: Vec<usize> = token.match_indices('.').map(|(i, _)| i).collect();
        for index in [dots[0] / 2, (dots[0] + dots[1]) / 2, (dots[1] + token.len()) / 2] {
            let mut bytes = token.clone().into_bytes();
            bytes[index] = if bytes[index] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();

            let result = service.validate(&tampered);
            assert!(
                matches!(result, Err(TokenError::TokenMalformed(_))),
                "tampering at {index} gave {result:?}"
            );
        }
    }

    #[test]
    fn test_foreign_key_is_malformed() {
        let issuer = service();
        let other = service();
        let token = issuer.issue(IssueRequest::new("user:alice", "dev")).unwrap();

        assert!(matches!(
            other.validate(&token),
            Err(TokenError::TokenMalformed(_))
        ));
    }

    #[test]
    fn test_foreign_issuer_is_malformed() {
        let keypair = KeyPair::generate().unwrap();
        let issuing = CapabilityTokenService::new(keypair.clone(), "someone-else");
        let validating = CapabilityTokenService::new(keypair, "sophia-test");

        let token = issuing.issue(IssueRequest::new("user:alice", "dev")).unwrap();
        assert!(matches!(
            validating.validate(&token),
            Err(TokenError::TokenMalformed(_))
        ));
    }

    #[test]
    fn test_wrong_token_type_rejected() {
        let service = service();
        let now = Utc::now().timestamp();
        let token = sign_raw(
            &service,
            &serde_json::json!({
                "sub": "user:alice",
                "iss": "sophia-test",
                "iat": now,
                "exp": now + 600,
                "token_type": "refresh",
            }),
        );

        match service.validate(&token) {
            Err(TokenError::TokenType { found }) => assert_eq!(found, "refresh"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_missing_fields_are_named() {
        let service = service();
        let now = Utc::now().timestamp();
        let token = sign_raw(
            &service,
            &serde_json::json!({
                "sub": "user:alice",
                "iss": "sophia-test",
                "iat": now,
                "exp": now + 600,
                "jti": "x",
                "token_type": "capability",
                "tenant": "dev",
                "tools": ["read"],
            }),
        );

        match service.validate(&token) {
            Err(TokenError::TokenIncomplete { missing }) => {
                assert_eq!(missing, vec!["swarm", "pii_level", "collections"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_research_scenario() {
        let service = service();
        let token = service
            .issue(
                IssueRequest::new("svc:research", "pay-ready")
                    .swarm("research")
                    .pii_level("low")
                    .tools(["search", "read"])
                    .collections(["research", "cache"])
                    .ttl_minutes(60),
            )
            .unwrap();

        let claims = service.validate(&token).unwrap();
        assert_eq!(claims.sub, "svc:research");
        assert_eq!(claims.tenant, "pay-ready");
        assert_eq!(claims.swarm, "research");
        assert_eq!(claims.pii_level, PiiLevel::Low);
        assert_eq!(claims.tools, set(&["read", "search"]));
        assert_eq!(claims.collections, set(&["cache", "research"]));

        service
            .authorize(
                &claims,
                &Requirements::new()
                    .tool("search")
                    .pii_level(PiiLevel::None),
            )
            .unwrap();

        let err = service
            .authorize(&claims, &Requirements::new().pii_level(PiiLevel::High))
            .unwrap_err();
        assert!(matches!(
            err,
            TokenError::InsufficientScope(ScopeDenial::PiiLevel { .. })
        ));
    }

    #[test]
    fn test_exported_public_key_verifies_independently() {
        let service = service();
        let token = service.issue(IssueRequest::new("user:alice", "dev")).unwrap();

        let verifier = TokenVerifier::from_public_pem(
            service.export_public_key().as_bytes(),
            "sophia-test",
            Algorithm::EdDSA,
        )
        .unwrap();
        assert_eq!(verifier.validate(&token).unwrap().sub, "user:alice");
    }

    #[test]
    fn test_from_config_requires_keys_unless_ephemeral() {
        let config = TokenConfig::default();
        assert!(matches!(
            CapabilityTokenService::from_config(&config),
            Err(TokenError::KeyMaterialMissing(_))
        ));

        let config = TokenConfig {
            ephemeral_keys: true,
            ..Default::default()
        };
        let service = CapabilityTokenService::from_config(&config).unwrap();
        assert_eq!(service.issuer(), "sophia-ai");
    }

    #[test]
    fn test_from_config_loads_key_files() {
        let keypair = KeyPair::generate().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let private_path = dir.path().join("private.pem");
        let public_path = dir.path().join("public.pem");
        keypair.save_to_files(&private_path, &public_path).unwrap();

        let config = TokenConfig {
            private_key_file: Some(private_path.clone()),
            public_key_file: Some(public_path),
            ..Default::default()
        };
        let a = CapabilityTokenService::from_config(&config).unwrap();

        // Public key derived from the private key alone.
        let config = TokenConfig {
            private_key_file: Some(private_path),
            ..Default::default()
        };
        let b = CapabilityTokenService::from_config(&config).unwrap();

        let token = a.issue(IssueRequest::new("user:alice", "dev")).unwrap();
        assert_eq!(b.validate(&token).unwrap().sub, "user:alice");
        assert_eq!(a.export_public_key(), keypair.public_key_pem());
    }

    #[test]
    fn test_inspect_token_unverified() {
        let service = service();
        let token = service.issue(IssueRequest::new("user:alice", "dev")).unwrap();

        let info = inspect_token_unverified(&token).unwrap();
        assert_eq!(info.header["alg"], "EdDSA");
        assert_eq!(info.claims["sub"], "user:alice");

        assert!(inspect_token_unverified("not.a-token").is_err());
    }

    #[test]
    fn test_claims_match_schema() {
        let service = service();
        let token = service.issue_service_token("business", "dev").unwrap();
        let claims = service.validate(&token).unwrap();

        let instance = Value::Object(claims.to_map());
        let schema: Value = serde_json::from_str(include_str!(
            "../../../schemas/CapabilityClaims.schema.json"
        ))
        .expect("schema must parse");

        let validator = jsonschema::draft202012::options()
            .build(&schema)
            .expect("schema must compile");

        if !validator.is_valid(&instance) {
            let msgs: Vec<String> = validator
                .iter_errors(&instance)
                .take(20)
                .map(|e| e.to_string())
                .collect();
            panic!("claims did not validate: {}", msgs.join("; "));
        }
    }
}
