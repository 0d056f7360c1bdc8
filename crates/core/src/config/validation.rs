//! Configuration validation rules.
//!
//! This module provides validation logic for `CacheConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::CacheConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

const MAX_SIZE_LIMIT: u64 = 1024 * 1024 * 1024;
const MIN_TIMER_MS: u64 = 1000;

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl CacheConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `max_size_bytes` is 0 or exceeds 1GB
    /// - `max_entries` is 0
    /// - any TTL base is 0 (`short_ttl_ms` must be at least 2 so social pages keep a non-zero TTL)
    /// - a timer interval is below one second
    /// - `namespace` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_size_bytes == 0 {
            return Err(invalid("max_size_bytes", "must be greater than 0"));
        }
        if self.max_size_bytes > MAX_SIZE_LIMIT {
            return Err(invalid("max_size_bytes", "must not exceed 1GB"));
        }

        if self.max_entries == 0 {
            return Err(invalid("max_entries", "must be greater than 0"));
        }

        if self.default_ttl_ms == 0 {
            return Err(invalid("default_ttl_ms", "must be greater than 0"));
        }
        if self.short_ttl_ms < 2 {
            return Err(invalid("short_ttl_ms", "must be at least 2ms"));
        }
        if self.long_ttl_ms == 0 {
            return Err(invalid("long_ttl_ms", "must be greater than 0"));
        }

        if self.persist_interval_ms < MIN_TIMER_MS {
            return Err(invalid("persist_interval_ms", "must be at least 1000ms"));
        }
        if self.cleanup_interval_ms < MIN_TIMER_MS {
            return Err(invalid("cleanup_interval_ms", "must be at least 1000ms"));
        }

        if self.namespace.trim().is_empty() {
            return Err(invalid("namespace", "must not be empty"));
        }

        if self.short_ttl_ms > self.long_ttl_ms {
            tracing::warn!(
                short_ttl_ms = self.short_ttl_ms,
                long_ttl_ms = self.long_ttl_ms,
                "short_ttl_ms exceeds long_ttl_ms; volatile pages will outlive stable ones"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = CacheConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_max_size_zero() {
        let config = CacheConfig { max_size_bytes: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_size_bytes"));
    }

    #[test]
    fn test_validate_max_size_exceeds_limit() {
        let config = CacheConfig { max_size_bytes: MAX_SIZE_LIMIT + 1, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_size_bytes"));
    }

    #[test]
    fn test_validate_max_entries_zero() {
        let config = CacheConfig { max_entries: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_entries"));
    }

    #[test]
    fn test_validate_short_ttl_too_small() {
        let config = CacheConfig { short_ttl_ms: 1, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "short_ttl_ms"));
    }

    #[test]
    fn test_validate_timer_too_fast() {
        let config = CacheConfig { cleanup_interval_ms: 10, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "cleanup_interval_ms"));
    }

    #[test]
    fn test_validate_empty_namespace() {
        let config = CacheConfig { namespace: "  ".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "namespace"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = CacheConfig {
            max_size_bytes: 1,
            max_entries: 1,
            short_ttl_ms: 2,
            persist_interval_ms: 1000,
            cleanup_interval_ms: 1000,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
