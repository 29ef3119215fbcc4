//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (FOLIO_*)
//! 2. TOML config file (if FOLIO_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (FOLIO_*)
/// 2. TOML config file (if FOLIO_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Address the edge server listens on.
    ///
    /// Set via FOLIO_BIND_ADDR environment variable.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Origin of the upstream site that pages and assets are served from.
    ///
    /// Set via FOLIO_SITE_ORIGIN environment variable.
    #[serde(default = "default_site_origin")]
    pub site_origin: String,

    /// Path to SQLite cache database.
    ///
    /// Set via FOLIO_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Versioned name of the offline cache store. Changing it invalidates
    /// every previously stored entry on the next activation.
    ///
    /// Set via FOLIO_CACHE_NAME environment variable.
    #[serde(default = "default_cache_name")]
    pub cache_name: String,

    /// Paths fetched and stored when the worker installs.
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,

    /// Page served to navigations when both network and cache miss.
    #[serde(default = "default_offline_path")]
    pub offline_path: String,

    /// Path segment marking requests that must never touch the cache.
    #[serde(default = "default_api_marker")]
    pub api_marker: String,

    /// User-Agent string for link preview requests.
    ///
    /// Set via FOLIO_PREVIEW_USER_AGENT environment variable.
    #[serde(default = "default_preview_user_agent")]
    pub preview_user_agent: String,

    /// Link preview request timeout in milliseconds.
    #[serde(default = "default_preview_timeout_ms")]
    pub preview_timeout_ms: u64,

    /// How long callers may cache a successful preview, in seconds.
    #[serde(default = "default_preview_max_age_secs")]
    pub preview_max_age_secs: u64,

    /// Timeout for requests forwarded to the site origin, in milliseconds.
    #[serde(default = "default_origin_timeout_ms")]
    pub origin_timeout_ms: u64,

    /// Maximum bytes to read from a preview target.
    ///
    /// Set via FOLIO_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Refuse preview targets that resolve to private or reserved addresses.
    #[serde(default = "default_true")]
    pub block_private_addresses: bool,
}

fn default_bind_addr() -> String {
    "127.0.0.1:4321".into()
}

fn default_site_origin() -> String {
    "http://127.0.0.1:4322".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./folio-cache.sqlite")
}

fn default_cache_name() -> String {
    "folio-v1".into()
}

fn default_precache() -> Vec<String> {
    ["/", "/projects", "/experience", "/offline.html"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_offline_path() -> String {
    "/offline.html".into()
}

fn default_api_marker() -> String {
    "/api/".into()
}

fn default_preview_user_agent() -> String {
    "Mozilla/5.0 (compatible; LinkPreviewBot/1.0)".into()
}

fn default_preview_timeout_ms() -> u64 {
    5_000
}

fn default_preview_max_age_secs() -> u64 {
    86_400
}

fn default_origin_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            site_origin: default_site_origin(),
            db_path: default_db_path(),
            cache_name: default_cache_name(),
            precache: default_precache(),
            offline_path: default_offline_path(),
            api_marker: default_api_marker(),
            preview_user_agent: default_preview_user_agent(),
            preview_timeout_ms: default_preview_timeout_ms(),
            preview_max_age_secs: default_preview_max_age_secs(),
            origin_timeout_ms: default_origin_timeout_ms(),
            max_bytes: default_max_bytes(),
            block_private_addresses: true,
        }
    }
}

impl AppConfig {
    /// Preview timeout as Duration for use with reqwest/tokio.
    pub fn preview_timeout(&self) -> Duration {
        Duration::from_millis(self.preview_timeout_ms)
    }

    /// Origin timeout as Duration for use with reqwest/tokio.
    pub fn origin_timeout(&self) -> Duration {
        Duration::from_millis(self.origin_timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `FOLIO_`
    /// 2. TOML file from `FOLIO_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    /// The layered provider stack used by [`AppConfig::load`].
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("FOLIO_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment.merge(
            Env::prefixed("FOLIO_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        )
    }

    /// Extract and validate a configuration from any figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
