//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (IMGMUX_*, nested keys split on `__`)
//! 2. TOML config file (if IMGMUX_CONFIG_FILE set)
//! 3. Built-in defaults

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Pixabay credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PixabayConfig {
    /// Set via IMGMUX_PIXABAY__KEY.
    #[serde(default)]
    pub key: Option<String>,
}

/// Pexels credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PexelsConfig {
    /// Set via IMGMUX_PEXELS__KEY.
    #[serde(default)]
    pub key: Option<String>,
}

/// Unsplash credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnsplashConfig {
    /// Set via IMGMUX_UNSPLASH__ACCESS_KEY.
    #[serde(default)]
    pub access_key: Option<String>,

    /// Accepted for completeness; the search API only needs the access key.
    #[serde(default)]
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Indent JSON responses.
    #[serde(default)]
    pub pretty_json: bool,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (IMGMUX_*)
/// 2. TOML config file (if IMGMUX_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite database holding cached responses and users.
    ///
    /// Set via IMGMUX_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Address the HTTP server binds to.
    ///
    /// Set via IMGMUX_LISTEN_ADDR environment variable.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// User-Agent string for upstream requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Upstream HTTP request timeout in milliseconds.
    ///
    /// Set via IMGMUX_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Seconds between purges of expired cached responses.
    #[serde(default = "default_purge_interval_secs")]
    pub purge_interval_secs: u64,

    #[serde(default)]
    pub pixabay: PixabayConfig,

    #[serde(default)]
    pub pexels: PexelsConfig,

    #[serde(default)]
    pub unsplash: UnsplashConfig,

    #[serde(default)]
    pub debug: DebugConfig,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/cache.db")
}

fn default_listen_addr() -> String {
    "0.0.0.0:8081".into()
}

fn default_user_agent() -> String {
    "imgmux/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_purge_interval_secs() -> u64 {
    3600
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            listen_addr: default_listen_addr(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            purge_interval_secs: default_purge_interval_secs(),
            pixabay: PixabayConfig::default(),
            pexels: PexelsConfig::default(),
            unsplash: UnsplashConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

/// Treat blank secrets as unset.
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.purge_interval_secs)
    }

    /// Parsed listen address.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `listen_addr` is not `host:port`.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.listen_addr.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
            field: "listen_addr".into(),
            reason: e.to_string(),
        })
    }

    pub fn pixabay_key(&self) -> Option<&str> {
        non_blank(&self.pixabay.key)
    }

    pub fn pexels_key(&self) -> Option<&str> {
        non_blank(&self.pexels.key)
    }

    pub fn unsplash_access_key(&self) -> Option<&str> {
        non_blank(&self.unsplash.access_key)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `IMGMUX_`
    /// 2. TOML file from `IMGMUX_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment()
            .extract()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("IMGMUX_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment.merge(
            Env::prefixed("IMGMUX_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        )
    }
}
