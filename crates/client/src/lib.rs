//! Client code for imgmux.
//!
//! This crate provides the upstream side of the service: the fingerprinted
//! response cache that every provider call goes through, the Pixabay, Pexels
//! and Unsplash adapters, and the registry that builds them from
//! configuration.

pub mod cache;
pub mod providers;
pub mod registry;

pub use cache::{RawResponse, ResponseCache};
pub use providers::{PexelsProvider, PixabayProvider, ProviderError, UnsplashProvider};
pub use registry::{build_http_client, providers_from_config};
