//! SQLite-backed store for upstream responses and credentials.
//!
//! This module provides a persistent, content-addressed cache using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Content-addressed storage using SHA-256 request fingerprints
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - A background purge loop for expired responses

pub mod connection;
pub mod hash;
pub mod migrations;
pub mod purge;
pub mod responses;
pub mod users;

pub use crate::Error;

pub use connection::CacheDb;
pub use hash::compute_fingerprint;
pub use purge::{DEFAULT_PURGE_INTERVAL, spawn_purger};
pub use responses::RESPONSE_TTL_SECS;
pub use users::UserRecord;
