//! Core types and shared functionality for imgmux.
//!
//! This crate provides:
//! - The normalized image model and the provider capability contract
//! - Unified-to-native page translation and the concurrent merge engine
//! - SQLite-backed store for cached upstream responses and credentials
//! - Credential verification with a bounded success cache
//! - Unified error types and configuration structures

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod credentials;
pub mod error;
pub mod image;
pub mod paging;
pub mod provider;
pub mod query;

pub use aggregate::Aggregator;
pub use cache::CacheDb;
pub use config::{AppConfig, ConfigError};
pub use credentials::{CredentialVerifier, hash_password};
pub use error::Error;
pub use image::{NormalizedImage, SearchOutcome};
pub use paging::{FetchPlan, UNIFIED_PAGE_SIZE, translate};
pub use provider::{ImageProvider, ProviderRegistration};
pub use query::SearchParams;
