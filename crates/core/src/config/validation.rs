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

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the prefix or version is empty, and
    /// `ConfigError::Invalid` if:
    /// - the prefix or version contains whitespace
    /// - `origin` is not an absolute http(s) URL with a host
    /// - `app_marker` or `user_agent` is empty, or a suffix is empty
    /// - `timeout_ms` is set below 100ms or above 5 minutes
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_prefix.is_empty() {
            return Err(ConfigError::Missing {
                field: "cache_prefix".into(),
                hint: "Set PWA_OFFLINE_CACHE_PREFIX environment variable".into(),
            });
        }
        if self.cache_version.is_empty() {
            return Err(ConfigError::Missing {
                field: "cache_version".into(),
                hint: "Set PWA_OFFLINE_CACHE_VERSION environment variable".into(),
            });
        }
        if self.cache_prefix.chars().any(char::is_whitespace) {
            return Err(invalid("cache_prefix", "must not contain whitespace"));
        }
        if self.cache_version.chars().any(char::is_whitespace) {
            return Err(invalid("cache_version", "must not contain whitespace"));
        }

        match url::Url::parse(&self.origin) {
            Ok(origin) if matches!(origin.scheme(), "http" | "https") && origin.host().is_some() => {}
            Ok(_) => return Err(invalid("origin", "must be an http(s) URL with a host")),
            Err(e) => return Err(invalid("origin", &e.to_string())),
        }

        if self.app_marker.is_empty() {
            return Err(invalid("app_marker", "must not be empty"));
        }
        if self.network_first_suffixes.iter().any(String::is_empty) {
            return Err(invalid("network_first_suffixes", "entries must not be empty"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if let Some(timeout_ms) = self.timeout_ms {
            if timeout_ms < 100 {
                return Err(invalid("timeout_ms", "must be at least 100ms"));
            }
            if timeout_ms > 300_000 {
                return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
            }
        }

        if self.network_first_suffixes.is_empty() {
            tracing::warn!("network_first_suffixes is empty; only the root path and app marker prefer the network");
        }

        Ok(())
    }
}
