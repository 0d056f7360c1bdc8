//! Cache configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PAGE_CACHE_*)
//! 2. TOML config file (if PAGE_CACHE_CONFIG_FILE set)
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

/// Cache budgets, TTL bases and background timer intervals.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PAGE_CACHE_*)
/// 2. TOML config file (if PAGE_CACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Upper bound on the summed size of all entries.
    ///
    /// Set via PAGE_CACHE_MAX_SIZE_BYTES environment variable.
    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: u64,

    /// Upper bound on the number of entries.
    ///
    /// Set via PAGE_CACHE_MAX_ENTRIES environment variable.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// TTL for general and ecommerce pages, in milliseconds.
    #[serde(default = "default_ttl_ms")]
    pub default_ttl_ms: u64,

    /// TTL base for volatile pages (news; social gets half), in milliseconds.
    #[serde(default = "default_short_ttl_ms")]
    pub short_ttl_ms: u64,

    /// TTL base for stable pages (documentation; static gets double), in milliseconds.
    #[serde(default = "default_long_ttl_ms")]
    pub long_ttl_ms: u64,

    /// Minimum main content length (in characters) admitted into the cache.
    #[serde(default = "default_min_content_chars")]
    pub min_content_chars: usize,

    /// How often unexpired entries are written to durable storage.
    #[serde(default = "default_persist_interval_ms")]
    pub persist_interval_ms: u64,

    /// How often expired entries are swept from memory.
    #[serde(default = "default_cleanup_interval_ms")]
    pub cleanup_interval_ms: u64,

    /// Prefix for the two keys written to durable storage.
    ///
    /// Instances sharing a namespace overwrite each other's snapshots.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Path to the SQLite database backing durable storage.
    ///
    /// Set via PAGE_CACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

fn default_max_size_bytes() -> u64 {
    50 * 1024 * 1024
}

fn default_max_entries() -> usize {
    1000
}

fn default_ttl_ms() -> u64 {
    5 * 60 * 1000
}

fn default_short_ttl_ms() -> u64 {
    2 * 60 * 1000
}

fn default_long_ttl_ms() -> u64 {
    30 * 60 * 1000
}

fn default_min_content_chars() -> usize {
    100
}

fn default_persist_interval_ms() -> u64 {
    30_000
}

fn default_cleanup_interval_ms() -> u64 {
    2 * 60 * 1000
}

fn default_namespace() -> String {
    "page_cache".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./page-cache.sqlite")
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: default_max_size_bytes(),
            max_entries: default_max_entries(),
            default_ttl_ms: default_ttl_ms(),
            short_ttl_ms: default_short_ttl_ms(),
            long_ttl_ms: default_long_ttl_ms(),
            min_content_chars: default_min_content_chars(),
            persist_interval_ms: default_persist_interval_ms(),
            cleanup_interval_ms: default_cleanup_interval_ms(),
            namespace: default_namespace(),
            db_path: default_db_path(),
        }
    }
}

impl CacheConfig {
    pub fn persist_interval(&self) -> Duration {
        Duration::from_millis(self.persist_interval_ms)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.cleanup_interval_ms)
    }

    /// Durable storage key holding the serialized entry map.
    pub fn entries_key(&self) -> String {
        format!("{}:entries", self.namespace)
    }

    /// Durable storage key holding the serialized metrics.
    pub fn metrics_key(&self) -> String {
        format!("{}:metrics", self.namespace)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PAGE_CACHE_`
    /// 2. TOML file from `PAGE_CACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PAGE_CACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PAGE_CACHE_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
