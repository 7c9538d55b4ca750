//! Upstream image API adapters.
//!
//! Each adapter builds its provider-specific request, sends it through the
//! shared [`ResponseCache`], decodes the JSON payload and maps it onto
//! [`imgmux_core::NormalizedImage`].
//!
//! | provider | native page | auth |
//! |----------|-------------|------|
//! | Pixabay  | 100 | `key` query parameter |
//! | Pexels   | 80  | `Authorization: <key>` |
//! | Unsplash | 30  | `Authorization: Client-ID <access key>`, `Accept-Version: v1` |

pub mod error;
pub mod pexels;
pub mod pixabay;
pub mod unsplash;

pub use error::ProviderError;
pub use pexels::PexelsProvider;
pub use pixabay::PixabayProvider;
pub use unsplash::UnsplashProvider;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use url::Url;

use crate::cache::ResponseCache;

/// Seconds every adapter reports as its native cache lifetime.
pub const PROVIDER_TTL_SECS: i64 = 86_400;

/// Send `request` through the cache and decode a successful JSON body.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    cache: &ResponseCache, http: &reqwest::Client, request: reqwest::Request,
) -> Result<T, ProviderError> {
    let response = cache.fetch(http, request).await?;

    if !response.status.is_success() {
        return Err(ProviderError::HttpError { status: response.status.as_u16() });
    }

    serde_json::from_slice(&response.body).map_err(|e| ProviderError::Parse(e.to_string()))
}

pub(crate) fn parse_base_url(base: &str) -> Result<Url, ProviderError> {
    Url::parse(base).map_err(|e| ProviderError::InvalidBaseUrl(format!("{base}: {e}")))
}

/// Decode `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
