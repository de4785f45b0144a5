//! Demo API guarded by capability tokens.

use crate::auth::{Capability, CapabilityGuard, require_capability};
use axum::extract::Query;
use axum::routing::get;
use axum::{Json, Router, middleware};
use serde::Deserialize;
use serde_json::{Value, json};
use sophia_captoken::{CapabilityTokenService, Requirements};
use tower_http::trace::TraceLayer;

/// Build the demo router.
///
/// - `GET /health` is open.
/// - `GET /v1/whoami` accepts any valid capability token.
/// - `GET /v1/search` requires `tenant`, the `search` tool and the
///   `documents` collection.
pub fn create_router(service: &CapabilityTokenService, tenant: &str) -> Router {
    let any_token = CapabilityGuard::from_service(service, Requirements::new());
    let search_guard = CapabilityGuard::from_service(
        service,
        Requirements::new()
            .tenant(tenant)
            .tool("search")
            .collection("documents"),
    );

    let whoami_routes = Router::new()
        .route("/v1/whoami", get(whoami))
        .route_layer(middleware::from_fn_with_state(any_token, require_capability));

    let search_routes = Router::new()
        .route("/v1/search", get(search))
        .route_layer(middleware::from_fn_with_state(
            search_guard,
            require_capability,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(whoami_routes)
        .merge(search_routes)
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "sophia",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn whoami(Capability(claims): Capability) -> Json<Value> {
    Json(json!({
        "subject": claims.sub,
        "tenant": claims.tenant,
        "swarm": claims.swarm,
        "pii_level": claims.pii_level,
        "tools": claims.tools,
        "collections": claims.collections,
        "token_id": claims.jti,
        "expires_at": claims.expires_at().map(|t| t.to_rfc3339()),
        "service_token": claims.is_service_token(),
    }))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

async fn search(
    Capability(claims): Capability,
    Query(query): Query<SearchQuery>,
) -> Json<Value> {
    Json(json!({
        "query": query.q,
        "tenant": claims.tenant,
        "collection": "documents",
        "results": [],
    }))
}
