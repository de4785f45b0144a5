//! # sophia-http
//!
//! axum integration for Sophia capability tokens.
//!
//! Requests carry `Authorization: Bearer <token>`. The middleware validates
//! the token, authorizes it against the route's requirements and either
//! passes the decoded claims downstream or answers with
//! `{"error", "message", "timestamp"}`:
//!
//! | Status | Cause |
//! |--------|-------|
//! | 401 | header missing or not `Bearer <token>` |
//! | 403 | token rejected (expired, bad signature, wrong type, incomplete, insufficient scope) |
//! | 500 | local fault (key material, unguarded route) |

pub mod auth;
pub mod error;
pub mod routes;

pub use auth::{Capability, CapabilityGuard, require_capability};
pub use error::{AuthRejection, ErrorBody};
pub use routes::create_router;
