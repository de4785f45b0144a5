//! Bearer-token middleware and extractor.
//!
//! Layer a route with [`require_capability`] through
//! `axum::middleware::from_fn_with_state`, passing a [`CapabilityGuard`] that
//! names the route's requirements. On success the decoded
//! [`CapabilityClaims`] are attached to the request and handlers read them
//! with the [`Capability`] extractor.

use crate::error::AuthRejection;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use sophia_captoken::{CapabilityClaims, CapabilityTokenService, Requirements, TokenVerifier};
use std::sync::Arc;

/// Verifier plus the requirements one route enforces.
#[derive(Clone)]
pub struct CapabilityGuard {
    verifier: Arc<TokenVerifier>,
    requirements: Arc<Requirements>,
}

impl CapabilityGuard {
    pub fn new(verifier: TokenVerifier, requirements: Requirements) -> Self {
        Self {
            verifier: Arc::new(verifier),
            requirements: Arc::new(requirements),
        }
    }

    pub fn from_service(service: &CapabilityTokenService, requirements: Requirements) -> Self {
        Self::new(service.verifier(), requirements)
    }

    pub fn requirements(&self) -> &Requirements {
        &self.requirements
    }

    /// Validate the bearer token in `headers` and authorize it.
    pub fn check(&self, headers: &HeaderMap) -> Result<CapabilityClaims, AuthRejection> {
        let token = extract_bearer(headers)?;
        let claims = self.verifier.validate(token)?;
        claims.authorize(&self.requirements)?;
        Ok(claims)
    }
}

/// Axum middleware enforcing a [`CapabilityGuard`].
pub async fn require_capability(
    State(guard): State<CapabilityGuard>,
    mut req: Request,
    next: Next,
) -> Response {
    match guard.check(req.headers()) {
        Ok(claims) => {
            tracing::debug!(
                subject = %claims.sub,
                tenant = %claims.tenant,
                token_id = %claims.jti,
                path = %req.uri().path(),
                "capability accepted"
            );
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(rejection) => {
            tracing::warn!(
                path = %req.uri().path(),
                category = rejection.category(),
                "capability rejected: {rejection}"
            );
            rejection.into_response()
        }
    }
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthRejection> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthRejection::MissingHeader)?
        .to_str()
        .map_err(|_| AuthRejection::MalformedHeader("header is not valid ASCII".to_string()))?;

    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or_else(|| AuthRejection::MalformedHeader("expected 'Bearer <token>'".to_string()))?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthRejection::MalformedHeader(format!(
            "unsupported scheme '{scheme}'"
        )));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthRejection::MalformedHeader("empty bearer token".to_string()));
    }
    Ok(token)
}

/// Claims attached by [`require_capability`].
#[derive(Debug, Clone)]
pub struct Capability(pub CapabilityClaims);

impl<S> FromRequestParts<S> for Capability
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CapabilityClaims>()
            .cloned()
            .map(Capability)
            .ok_or_else(|| {
                AuthRejection::Internal("route is not guarded by require_capability".to_string())
            })
    }
}
