//! Provider adapter error types.

use std::sync::Arc;

use imgmux_core::Error;

/// Errors from talking to an upstream image API.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// HTTP error response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),

    /// Endpoint override is not a usable URL.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { ProviderError::Timeout } else { ProviderError::Network(Arc::new(err)) }
    }
}

impl From<ProviderError> for Error {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Parse(msg) => Error::ProviderDecode(msg),
            other => Error::ProviderTransport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(ProviderError::HttpError { status: 429 }.to_string(), "HTTP error: 429");
        assert!(ProviderError::Parse("eof".into()).to_string().contains("parse error"));
    }

    #[test]
    fn test_conversion_to_core_error() {
        assert!(matches!(Error::from(ProviderError::Timeout), Error::ProviderTransport(_)));
        assert!(matches!(Error::from(ProviderError::HttpError { status: 500 }), Error::ProviderTransport(msg) if msg.contains("500")));
        assert!(matches!(Error::from(ProviderError::Parse("bad".into())), Error::ProviderDecode(msg) if msg == "bad"));
        assert!(Error::from(ProviderError::InvalidBaseUrl("x".into())).is_provider_failure());
    }
}
