//! `GET /search?q=...&page=...`

use axum::extract::{RawQuery, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use url::form_urlencoded;

use imgmux_core::SearchParams;

use crate::app::AppState;
use crate::error::ApiError;

/// Search every provider for one unified page.
pub async fn search(State(state): State<AppState>, RawQuery(raw): RawQuery) -> Result<Response, ApiError> {
    let pairs: Vec<(String, String)> = form_urlencoded::parse(raw.unwrap_or_default().as_bytes())
        .into_owned()
        .collect();

    let queries = pairs.iter().filter(|(key, _)| key == "q").map(|(_, value)| value.as_str());
    let page = pairs.iter().find(|(key, _)| key == "page").map(|(_, value)| value.as_str());
    let params = SearchParams::parse(queries, page)?;

    let images = state.aggregator.search(params.page, &params.query).await?;

    json_response(&images, state.pretty_json)
}

/// Serialize `value` as the response body, indented two spaces when `pretty`.
fn json_response<T: Serialize>(value: &T, pretty: bool) -> Result<Response, ApiError> {
    let body = if pretty { serde_json::to_vec_pretty(value)? } else { serde_json::to_vec(value)? };
    Ok((StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], body).into_response())
}

