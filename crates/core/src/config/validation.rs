//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - a timeout is less than 100ms or exceeds 5 minutes
    /// - `cache_name` or `preview_user_agent` is empty
    /// - `offline_path`, `api_marker` or a precache entry is not root-relative
    /// - `offline_path` is not part of `precache`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        for (field, value) in [("preview_timeout_ms", self.preview_timeout_ms), ("origin_timeout_ms", self.origin_timeout_ms)]
        {
            if value < 100 {
                return Err(invalid(field, "must be at least 100ms"));
            }
            if value > 300_000 {
                return Err(invalid(field, "must not exceed 5 minutes (300000ms)"));
            }
        }

        if self.cache_name.trim().is_empty() {
            return Err(invalid("cache_name", "must not be empty"));
        }

        if self.preview_user_agent.is_empty() {
            return Err(invalid("preview_user_agent", "must not be empty"));
        }

        if !self.offline_path.starts_with('/') {
            return Err(invalid("offline_path", "must start with '/'"));
        }

        if !self.api_marker.starts_with('/') {
            return Err(invalid("api_marker", "must start with '/'"));
        }

        if let Some(path) = self.precache.iter().find(|p| !p.starts_with('/')) {
            return Err(ConfigError::Invalid {
                field: "precache".into(),
                reason: format!("entry '{path}' must start with '/'"),
            });
        }

        if !self.precache.contains(&self.offline_path) {
            return Err(invalid("precache", "must include offline_path"));
        }

        if self.precache.iter().any(|p| p.contains(&self.api_marker)) {
            tracing::warn!(
                api_marker = %self.api_marker,
                "precache lists paths under the API marker; they will be stored but never served from cache"
            );
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}
