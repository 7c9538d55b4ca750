//! HTTP error responses for the imgmux server.
//!
//! Core errors map to the status codes clients of the search endpoint expect:
//! validation 400, credentials 401, all providers down 503, anything else 500.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use imgmux_core::Error;

/// Challenge sent with every 401.
pub const BASIC_AUTH_CHALLENGE: &str = r#"Basic realm="restricted", charset="UTF-8""#;

/// Errors surfaced by request handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] Error),

    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Core(Error::InvalidInput(reason)) => {
                tracing::debug!(reason, "rejected search request");
                (StatusCode::BAD_REQUEST, "Query Search Parameter ?q= missing").into_response()
            }
            ApiError::Core(Error::Unauthorized) => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, BASIC_AUTH_CHALLENGE)],
                "Unauthorized",
            )
                .into_response(),
            ApiError::Core(Error::Unavailable(reason)) => {
                tracing::warn!(reason, "error connecting to upstream services");
                StatusCode::SERVICE_UNAVAILABLE.into_response()
            }
            other => {
                tracing::error!(error = %other, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
