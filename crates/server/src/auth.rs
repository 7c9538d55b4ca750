//! HTTP Basic authentication in front of the search route.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use imgmux_core::Error;

use crate::app::AppState;
use crate::error::ApiError;

/// Let the request through only if its Basic credentials verify.
pub async fn require_basic_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some((username, password)) = basic_credentials(request.headers()) {
        if state.verifier.verify(&username, &password).await {
            return next.run(request).await;
        }
        tracing::debug!(username, "rejected credentials");
    }
    ApiError::from(Error::Unauthorized).into_response()
}

/// Decode `Authorization: Basic base64(user:pass)`.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = String::from_utf8(STANDARD.decode(encoded.trim()).ok()?).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}
