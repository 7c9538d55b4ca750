//! Fingerprinted cache for upstream HTTP exchanges.
//!
//! Every provider call goes through [`ResponseCache::fetch`]. The outbound
//! request is rendered to its canonical wire form and hashed; a live row for
//! that fingerprint is replayed without touching the network, otherwise the
//! live response is returned and (when 2xx) stored for a day.
//!
//! Storage trouble is never the caller's problem: lookup and write failures
//! are logged and the request proceeds as a miss.

pub mod wire;

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use imgmux_core::CacheDb;
use imgmux_core::cache::{RESPONSE_TTL_SECS, compute_fingerprint};

pub use wire::{RawResponse, encode_request};

use crate::providers::ProviderError;

/// Read-through cache over the `response_cache` table.
#[derive(Debug)]
pub struct ResponseCache {
    db: CacheDb,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResponseCache {
    pub fn new(db: CacheDb) -> Self {
        Self { db, hits: AtomicU64::new(0), misses: AtomicU64::new(0) }
    }

    /// Execute `request` with `http`, or replay a stored response for it.
    pub async fn fetch(&self, http: &reqwest::Client, request: reqwest::Request) -> Result<RawResponse, ProviderError> {
        let wire = encode_request(&request);
        self.fetch_with(&wire, || async move {
            let response = http.execute(request).await?;
            RawResponse::read(response).await
        })
        .await
    }

    /// Cache lookup keyed on an already-encoded request; `live` runs on a miss.
    pub async fn fetch_with<F, Fut>(&self, wire_request: &[u8], live: F) -> Result<RawResponse, ProviderError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<RawResponse, ProviderError>>,
    {
        let fingerprint = compute_fingerprint(wire_request);
        let now = Utc::now().timestamp();

        match self.db.get_response(&fingerprint, now).await {
            Ok(Some(stored)) => match RawResponse::from_wire(&stored) {
                Ok(response) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(fingerprint = %fingerprint, "response cache hit");
                    return Ok(response);
                }
                Err(e) => tracing::warn!(fingerprint = %fingerprint, error = %e, "discarding undecodable cached response"),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!(fingerprint = %fingerprint, error = %e, "response cache lookup failed"),
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(fingerprint = %fingerprint, "response cache miss");

        let response = live().await?;

        if response.status.is_success() {
            let expires_at = now + RESPONSE_TTL_SECS;
            if let Err(e) = self.db.put_response(&fingerprint, response.to_wire(), expires_at).await {
                tracing::warn!(fingerprint = %fingerprint, error = %e, "failed to store response");
            }
        } else {
            tracing::debug!(status = %response.status, "not caching unsuccessful response");
        }

        Ok(response)
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
