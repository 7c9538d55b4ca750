//! Pexels photo search.
//!
//! - **Endpoint**: `https://api.pexels.com/v1/search`
//! - **Authentication**: raw API key in the `Authorization` header.
//! - **Paging**: `page` / `per_page`, 80 photos per native page.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header;
use serde::Deserialize;
use url::Url;

use imgmux_core::{ImageProvider, NormalizedImage, SearchOutcome, image::aspect_ratio};

use super::{PROVIDER_TTL_SECS, ProviderError, fetch_json, null_as_default, parse_base_url};
use crate::cache::ResponseCache;

/// Default base URL for the Pexels search API.
pub const PEXELS_BASE_URL: &str = "https://api.pexels.com/v1/search";

const NAME: &str = "pexels";
const SOURCE_LABEL: &str = "Pexels";
const PAGE_SIZE: usize = 80;

#[derive(Debug, Deserialize)]
pub struct PexelsResponse {
    pub photos: Vec<PexelsPhoto>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PexelsPhoto {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub width: f32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub height: f32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub alt: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub photographer: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub src: PexelsSources,
}

/// Rendition URLs; only the two we expose are decoded.
#[derive(Debug, Default, Deserialize)]
pub struct PexelsSources {
    #[serde(default, deserialize_with = "null_as_default")]
    pub original: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub large: String,
}

impl From<PexelsPhoto> for NormalizedImage {
    fn from(photo: PexelsPhoto) -> Self {
        Self {
            id: NormalizedImage::namespaced_id(NAME, photo.id),
            tags: photo.alt,
            source_name: SOURCE_LABEL.to_string(),
            source_url: photo.url,
            artist: photo.photographer,
            aspect_ratio: aspect_ratio(photo.width, photo.height),
            preview_url: photo.src.large,
            download_url: photo.src.original,
        }
    }
}

impl PexelsResponse {
    pub fn into_images(self) -> Vec<NormalizedImage> {
        self.photos.into_iter().map(NormalizedImage::from).collect()
    }
}

/// Pexels adapter.
pub struct PexelsProvider {
    http: reqwest::Client,
    cache: Arc<ResponseCache>,
    key: String,
    base_url: Url,
}

impl PexelsProvider {
    pub fn new(http: reqwest::Client, cache: Arc<ResponseCache>, key: impl Into<String>) -> Result<Self, ProviderError> {
        Self::with_base_url(http, cache, key, PEXELS_BASE_URL)
    }

    pub fn with_base_url(
        http: reqwest::Client, cache: Arc<ResponseCache>, key: impl Into<String>, base_url: &str,
    ) -> Result<Self, ProviderError> {
        Ok(Self { http, cache, key: key.into(), base_url: parse_base_url(base_url)? })
    }

    pub fn build_request(&self, page: u64, query: &str) -> Result<reqwest::Request, ProviderError> {
        self.http
            .get(self.base_url.clone())
            .header(header::AUTHORIZATION, &self.key)
            .query(&[("query", query.to_string()), ("page", page.to_string()), ("per_page", PAGE_SIZE.to_string())])
            .build()
            .map_err(ProviderError::from)
    }
}

#[async_trait]
impl ImageProvider for PexelsProvider {
    async fn search(&self, page: u64, query: &str) -> SearchOutcome {
        let request = self.build_request(page, query)?;
        tracing::debug!(provider = NAME, page, "fetching native page");
        let body: PexelsResponse = fetch_json(&self.cache, &self.http, request).await?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::testing::seed_response;
    use imgmux_core::{CacheDb, Error};

    const FIXTURE_JSON: &str = r##"{
        "page": 1,
        "per_page": 80,
        "total_results": 8000,
        "photos": [
            {
                "id": 2014422,
                "width": 3024,
                "height": 3024,
                "url": "https://www.pexels.com/photo/brown-rocks-during-golden-hour-2014422/",
                "photographer": "Joey Farina",
                "photographer_url": "https://www.pexels.com/@joey",
                "avg_color": "#978E82",
                "src": {
                    "original": "https://images.pexels.com/photos/2014422/pexels-photo-2014422.jpeg",
                    "large": "https://images.pexels.com/photos/2014422/pexels-photo-2014422.jpeg?h=650&w=940",
                    "tiny": "https://images.pexels.com/photos/2014422/pexels-photo-2014422.jpeg?h=200&w=280"
                },
                "alt": "Brown Rocks During Golden Hour"
            },
            {
                "id": 7,
                "width": 1200,
                "height": 800,
                "url": "https://www.pexels.com/photo/7/",
                "photographer": "Anon",
                "src": null,
                "alt": null
            }
        ]
    }"##;

    async fn provider() -> (PexelsProvider, CacheDb) {
        let db = CacheDb::open_in_memory().await.unwrap();
        let cache = Arc::new(ResponseCache::new(db.clone()));
        (PexelsProvider::new(reqwest::Client::new(), cache, "px-secret").unwrap(), db)
    }

    #[test]
    fn test_normalize_photos() {
        let raw: PexelsResponse = serde_json::from_str(FIXTURE_JSON).unwrap();
        let images = raw.into_images();
        assert_eq!(images.len(), 2);

        let first = &images[0];
        assert_eq!(first.id, "pexels/2014422");
        assert_eq!(first.tags, "Brown Rocks During Golden Hour");
        assert_eq!(first.source_name, "Pexels");
        assert_eq!(first.source_url, "https://www.pexels.com/photo/brown-rocks-during-golden-hour-2014422/");
        assert_eq!(first.artist, "Joey Farina");
        assert_eq!(first.aspect_ratio, 1.0);
        assert_eq!(first.preview_url, "https://images.pexels.com/photos/2014422/pexels-photo-2014422.jpeg?h=650&w=940");
        assert_eq!(first.download_url, "https://images.pexels.com/photos/2014422/pexels-photo-2014422.jpeg");

        let second = &images[1];
        assert_eq!(second.tags, "");
        assert_eq!(second.preview_url, "");
        assert!((second.aspect_ratio - 1.5).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_build_request_sends_key_as_header() {
        let (provider, _db) = provider().await;
        let request = provider.build_request(2, "ocean").unwrap();
        assert_eq!(request.url().as_str(), "https://api.pexels.com/v1/search?query=ocean&page=2&per_page=80");
        assert_eq!(request.headers()[header::AUTHORIZATION], "px-secret");
    }

    #[tokio::test]
    async fn test_search_replays_cached_response() {
        let (provider, db) = provider().await;
        seed_response(&db, &provider.build_request(1, "rocks").unwrap(), 200, FIXTURE_JSON).await;

        let images = provider.search(1, "rocks").await.unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(provider.page_size(), 80);
    }

    #[tokio::test]
    async fn test_search_rejects_unauthorized() {
        let (provider, db) = provider().await;
        seed_response(&db, &provider.build_request(1, "rocks").unwrap(), 401, r#"{"error":"bad key"}"#).await;

        assert!(matches!(provider.search(1, "rocks").await, Err(Error::ProviderTransport(_))));
    }
}
