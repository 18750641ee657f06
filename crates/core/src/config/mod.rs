//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PWA_OFFLINE_*)
//! 2. TOML config file (if PWA_OFFLINE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::strategy::StrategySelector;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PWA_OFFLINE_*)
/// 2. TOML config file (if PWA_OFFLINE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Prefix of every store name.
    ///
    /// Set via PWA_OFFLINE_CACHE_PREFIX environment variable.
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// Version identifier. Changing it is what invalidates older stores.
    ///
    /// Set via PWA_OFFLINE_CACHE_VERSION environment variable.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Origin of the application. Requests outside it are not intercepted.
    ///
    /// Set via PWA_OFFLINE_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Substring identifying the application's own bundle entry points.
    ///
    /// Set via PWA_OFFLINE_APP_MARKER environment variable.
    #[serde(default = "default_app_marker")]
    pub app_marker: String,

    /// Path suffixes always served network-first.
    #[serde(default = "default_network_first_suffixes")]
    pub network_first_suffixes: Vec<String>,

    /// Activate right after install instead of waiting for a control message.
    ///
    /// Set via PWA_OFFLINE_SKIP_WAITING_ON_INSTALL environment variable.
    #[serde(default = "default_true")]
    pub skip_waiting_on_install: bool,

    /// Path to the SQLite database backing the stores.
    ///
    /// Set via PWA_OFFLINE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for network requests.
    ///
    /// Set via PWA_OFFLINE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Optional transport timeout in milliseconds. Unset means none.
    ///
    /// Set via PWA_OFFLINE_TIMEOUT_MS environment variable.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Maximum redirects followed by the transport.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

fn default_cache_prefix() -> String {
    "pwa-cache".into()
}

fn default_cache_version() -> String {
    "v1.0.3".into()
}

fn default_origin() -> String {
    "http://localhost:8080".into()
}

fn default_app_marker() -> String {
    "recog".into()
}

fn default_network_first_suffixes() -> Vec<String> {
    vec![".js".into(), ".wasm".into(), ".html".into()]
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./pwa-offline-cache.sqlite")
}

fn default_user_agent() -> String {
    "pwa-offline/0.1".into()
}

fn default_max_redirects() -> usize {
    20
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_prefix: default_cache_prefix(),
            cache_version: default_cache_version(),
            origin: default_origin(),
            app_marker: default_app_marker(),
            network_first_suffixes: default_network_first_suffixes(),
            skip_waiting_on_install: true,
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            timeout_ms: None,
            max_redirects: default_max_redirects(),
        }
    }
}

impl AppConfig {
    /// Name of the store owned by the configured version.
    pub fn cache_name(&self) -> String {
        format!("{}-{}", self.cache_prefix, self.cache_version)
    }

    /// Strategy selector built from the configured suffixes and marker.
    pub fn selector(&self) -> StrategySelector {
        StrategySelector::new(&self.network_first_suffixes, &self.app_marker)
    }

    /// Timeout as Duration for use with reqwest, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PWA_OFFLINE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PWA_OFFLINE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
