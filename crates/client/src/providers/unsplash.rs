//! Unsplash photo search.
//!
//! - **Endpoint**: `https://api.unsplash.com/search/photos`
//! - **Authentication**: `Authorization: Client-ID <access key>`, pinned to
//!   `Accept-Version: v1`.
//! - **Paging**: `page` / `per_page`, 30 results per native page.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header;
use serde::Deserialize;
use url::Url;

use imgmux_core::{ImageProvider, NormalizedImage, SearchOutcome, image::aspect_ratio};

use super::{PROVIDER_TTL_SECS, ProviderError, fetch_json, null_as_default, parse_base_url};
use crate::cache::ResponseCache;

/// Default base URL for the Unsplash search API.
pub const UNSPLASH_BASE_URL: &str = "https://api.unsplash.com/search/photos";

const NAME: &str = "unsplash";
const SOURCE_LABEL: &str = "Unsplash";
const PAGE_SIZE: usize = 30;

#[derive(Debug, Deserialize)]
pub struct UnsplashResponse {
    pub results: Vec<UnsplashPhoto>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UnsplashPhoto {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub width: f32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub height: f32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: UnsplashUser,
    #[serde(default, deserialize_with = "null_as_default")]
    pub urls: UnsplashUrls,
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: UnsplashLinks,
}

#[derive(Debug, Default, Deserialize)]
pub struct UnsplashUser {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UnsplashUrls {
    #[serde(default, deserialize_with = "null_as_default")]
    pub raw: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub regular: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UnsplashLinks {
    #[serde(default, deserialize_with = "null_as_default")]
    pub html: String,
}

impl From<UnsplashPhoto> for NormalizedImage {
    fn from(photo: UnsplashPhoto) -> Self {
        Self {
            id: NormalizedImage::namespaced_id(NAME, &photo.id),
            tags: photo.description,
            source_name: SOURCE_LABEL.to_string(),
            source_url: photo.links.html,
            artist: photo.user.name,
            aspect_ratio: aspect_ratio(photo.width, photo.height),
            preview_url: photo.urls.regular,
            download_url: photo.urls.raw,
        }
    }
}

impl UnsplashResponse {
    pub fn into_images(self) -> Vec<NormalizedImage> {
        self.results.into_iter().map(NormalizedImage::from).collect()
    }
}

/// Unsplash adapter.
pub struct UnsplashProvider {
    http: reqwest::Client,
    cache: Arc<ResponseCache>,
    access_key: String,
    base_url: Url,
}

impl UnsplashProvider {
    pub fn new(
        http: reqwest::Client, cache: Arc<ResponseCache>, access_key: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        Self::with_base_url(http, cache, access_key, UNSPLASH_BASE_URL)
    }

    pub fn with_base_url(
        http: reqwest::Client, cache: Arc<ResponseCache>, access_key: impl Into<String>, base_url: &str,
    ) -> Result<Self, ProviderError> {
        Ok(Self { http, cache, access_key: access_key.into(), base_url: parse_base_url(base_url)? })
    }

    pub fn build_request(&self, page: u64, query: &str) -> Result<reqwest::Request, ProviderError> {
        self.http
            .get(self.base_url.clone())
            .header("Accept-Version", "v1")
            .header(header::AUTHORIZATION, format!("Client-ID {}", self.access_key))
            .query(&[("query", query.to_string()), ("page", page.to_string()), ("per_page", PAGE_SIZE.to_string())])
            .build()
            .map_err(ProviderError::from)
    }
}

#[async_trait]
impl ImageProvider for UnsplashProvider {
    async fn search(&self, page: u64, query: &str) -> SearchOutcome {
        let request = self.build_request(page, query)?;
        tracing::debug!(provider = NAME, page, "fetching native page");
        let body: UnsplashResponse = fetch_json(&self.cache, &self.http, request).await?;
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
