//! Build the provider set from configuration.

use std::sync::Arc;

use imgmux_core::{AppConfig, ImageProvider};

use crate::cache::ResponseCache;
use crate::providers::{PexelsProvider, PixabayProvider, ProviderError, UnsplashProvider};

/// Shared HTTP client for every adapter.
///
/// The configured timeout bounds each live upstream call.
pub fn build_http_client(config: &AppConfig) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(config.timeout())
        .use_rustls_tls()
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .build()
        .map_err(ProviderError::from)
}

/// Instantiate every provider whose credentials are configured.
///
/// Order is fixed (Pixabay, Pexels, Unsplash) and becomes the interleave
/// order of merged results.
pub fn providers_from_config(
    config: &AppConfig, http: &reqwest::Client, cache: &Arc<ResponseCache>,
) -> Result<Vec<Arc<dyn ImageProvider>>, ProviderError> {
    let mut providers: Vec<Arc<dyn ImageProvider>> = Vec::with_capacity(3);

    if let Some(key) = config.pixabay_key() {
        providers.push(Arc::new(PixabayProvider::new(http.clone(), cache.clone(), key)?));
    }
    if let Some(key) = config.pexels_key() {
        providers.push(Arc::new(PexelsProvider::new(http.clone(), cache.clone(), key)?));
    }
    if let Some(access_key) = config.unsplash_access_key() {
        providers.push(Arc::new(UnsplashProvider::new(http.clone(), cache.clone(), access_key)?));
    }

    if providers.is_empty() {
        tracing::warn!("no image providers configured; every search will report unavailable");
    } else {
        let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
        tracing::info!(providers = ?names, "registered image providers");
    }

    Ok(providers)
}
