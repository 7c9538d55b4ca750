//! Pixabay image search.
//!
//! - **Endpoint**: `https://pixabay.com/api/`
//! - **Authentication**: `key` query parameter.
//! - **Paging**: `page` / `per_page`, 100 hits per native page.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use imgmux_core::{ImageProvider, NormalizedImage, SearchOutcome, image::aspect_ratio};

use super::{PROVIDER_TTL_SECS, ProviderError, fetch_json, null_as_default, parse_base_url};
use crate::cache::ResponseCache;

/// Default base URL for the Pixabay API.
pub const PIXABAY_BASE_URL: &str = "https://pixabay.com/api/";

const NAME: &str = "pixabay";
const SOURCE_LABEL: &str = "Pixabay";
const PAGE_SIZE: usize = 100;

/// Raw response from the Pixabay search API.
#[derive(Debug, Deserialize)]
pub struct PixabayResponse {
    pub hits: Vec<PixabayHit>,
}

/// Individual hit from Pixabay.
#[derive(Debug, Default, Deserialize)]
pub struct PixabayHit {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: String,
    #[serde(rename = "pageURL", default, deserialize_with = "null_as_default")]
    pub page_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: String,
    #[serde(rename = "webformatURL", default, deserialize_with = "null_as_default")]
    pub webformat_url: String,
    #[serde(rename = "webformatWidth", default, deserialize_with = "null_as_default")]
    pub webformat_width: f32,
    #[serde(rename = "webformatHeight", default, deserialize_with = "null_as_default")]
    pub webformat_height: f32,
    #[serde(rename = "imageURL", default, deserialize_with = "null_as_default")]
    pub image_url: String,
}

impl From<PixabayHit> for NormalizedImage {
    fn from(hit: PixabayHit) -> Self {
        Self {
            id: NormalizedImage::namespaced_id(NAME, hit.id),
            tags: hit.tags,
            source_name: SOURCE_LABEL.to_string(),
            source_url: hit.page_url,
            artist: hit.user,
            aspect_ratio: aspect_ratio(hit.webformat_width, hit.webformat_height),
            preview_url: hit.webformat_url,
            download_url: hit.image_url,
        }
    }
}

impl PixabayResponse {
    pub fn into_images(self) -> Vec<NormalizedImage> {
        self.hits.into_iter().map(NormalizedImage::from).collect()
    }
}

/// Pixabay adapter.
pub struct PixabayProvider {
    http: reqwest::Client,
    cache: Arc<ResponseCache>,
    key: String,
    base_url: Url,
}

impl PixabayProvider {
    pub fn new(http: reqwest::Client, cache: Arc<ResponseCache>, key: impl Into<String>) -> Result<Self, ProviderError> {
        Self::with_base_url(http, cache, key, PIXABAY_BASE_URL)
    }

    pub fn with_base_url(
        http: reqwest::Client, cache: Arc<ResponseCache>, key: impl Into<String>, base_url: &str,
    ) -> Result<Self, ProviderError> {
        Ok(Self { http, cache, key: key.into(), base_url: parse_base_url(base_url)? })
    }

    /// Build the search request for one native page.
    pub fn build_request(&self, page: u64, query: &str) -> Result<reqwest::Request, ProviderError> {
        self.http
            .get(self.base_url.clone())
            .query(&[
                ("key", self.key.clone()),
                ("q", query.to_string()),
                ("page", page.to_string()),
                ("per_page", PAGE_SIZE.to_string()),
            ])
            .build()
            .map_err(ProviderError::from)
    }
}

#[async_trait]
impl ImageProvider for PixabayProvider {
    async fn search(&self, page: u64, query: &str) -> SearchOutcome {
        let request = self.build_request(page, query)?;
        tracing::debug!(provider = NAME, page, "fetching native page");
        let body: PixabayResponse = fetch_json(&self.cache, &self.http, request).await?;
        Ok(body.into_images())
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn ttl_seconds(&self) -> i64 {
        PROVIDER_TTL_SECS
    }

    fn page_size(&self) -> usize {
        PAGE_SIZE
    }
}
