//! Rejections produced by the capability middleware.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use sophia_captoken::TokenError;
use thiserror::Error;

/// Why a request was turned away.
#[derive(Debug, Error)]
pub enum AuthRejection {
    /// No `Authorization` header.
    #[error("missing Authorization header")]
    MissingHeader,

    /// `Authorization` header is not `Bearer <token>`.
    #[error("malformed Authorization header: {0}")]
    MalformedHeader(String),

    /// Token failed validation or authorization (or the service faulted).
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Anything else that should never happen.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Body of every rejection response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    /// RFC 3339.
    pub timestamp: String,
}

impl AuthRejection {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthRejection::MissingHeader | AuthRejection::MalformedHeader(_) => {
                StatusCode::UNAUTHORIZED
            }
            AuthRejection::Token(e) if e.is_rejection() => StatusCode::FORBIDDEN,
            AuthRejection::Token(_) | AuthRejection::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            AuthRejection::MissingHeader => "missing_authorization",
            AuthRejection::MalformedHeader(_) => "malformed_authorization",
            AuthRejection::Token(e) => e.category(),
            AuthRejection::Internal(_) => "internal_error",
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.category().to_string(),
            message: self.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
