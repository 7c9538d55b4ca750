//! Unified error types for imgmux.
//!
//! Provider failures stay isolated to the task that hit them; only
//! `Unavailable` reports that a whole search failed.

use tokio_rusqlite::rusqlite;

/// Unified error types for the imgmux service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., missing or blank query).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Network failure or non-success status talking to a provider.
    #[error("PROVIDER_TRANSPORT: {0}")]
    ProviderTransport(String),

    /// Provider answered with a payload we could not decode.
    #[error("PROVIDER_DECODE: {0}")]
    ProviderDecode(String),

    /// Every provider task failed.
    #[error("UNAVAILABLE: {0}")]
    Unavailable(String),

    /// Wrong or missing credentials.
    #[error("UNAUTHORIZED")]
    Unauthorized,

    /// Database operation failed.
    #[error("STORAGE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORAGE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Password hashing or hash parsing failed.
    #[error("PASSWORD_HASH: {0}")]
    PasswordHash(String),

    /// Stored HTTP exchange could not be decoded.
    #[error("WIRE_FORMAT: {0}")]
    Wire(String),
}

impl Error {
    /// Whether this error came from talking to an upstream provider.
    pub fn is_provider_failure(&self) -> bool {
        matches!(self, Error::ProviderTransport(_) | Error::ProviderDecode(_))
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}
