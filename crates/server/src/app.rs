//! Router and shared request state.

use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::get;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use imgmux_core::{Aggregator, CredentialVerifier};

use crate::{auth, search};

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Aggregator,
    pub verifier: Arc<CredentialVerifier>,
    pub pretty_json: bool,
}

impl AppState {
    pub fn new(aggregator: Aggregator, verifier: CredentialVerifier, pretty_json: bool) -> Self {
        Self { aggregator, verifier: Arc::new(verifier), pretty_json }
    }
}

/// `/search` behind Basic auth; every other path is a plain 404.
pub fn router(state: AppState) -> Router {
    let search = get(search::search)
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_basic_auth));

    Router::new()
        .route("/search", search)
        .fallback(not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}
