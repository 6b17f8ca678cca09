//! Engine configuration loaded from TOML files.
//!
//! All sections are optional and fall back to defaults, so an empty file is
//! a valid configuration. Timeouts bound every ledger call; the retry
//! section only applies to failures classified as transient.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::logging::LoggingConfig;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub retry: RetryConfig,
    pub timeouts: TimeoutConfig,
    pub logging: LoggingConfig,
}

/// Retry policy for transient ledger failures.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay_ms: u64,
    /// Upper bound on the backoff delay.
    pub max_delay_ms: u64,
    /// Multiplier applied to the delay after each failed attempt.
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 50,
            max_delay_ms: 1_000,
            backoff_multiplier: 2.0,
        }
    }
}

/// Bounds on blocking engine operations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Per-call bound on ledger store operations.
    pub storage_ms: u64,
    /// How long a finalize waits for the per-market lock before reporting
    /// a conflict.
    pub finalize_lock_wait_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            storage_ms: 5_000,
            finalize_lock_wait_ms: 10_000,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Self = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retry.max_attempts",
                reason: "must be at least 1".into(),
            });
        }
        if self.retry.backoff_multiplier < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "retry.backoff_multiplier",
                reason: format!("must be >= 1.0, got {}", self.retry.backoff_multiplier),
            });
        }
        if self.retry.max_delay_ms < self.retry.initial_delay_ms {
            return Err(ConfigError::InvalidValue {
                field: "retry.max_delay_ms",
                reason: "must be >= retry.initial_delay_ms".into(),
            });
        }
        if self.timeouts.storage_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeouts.storage_ms",
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }

    /// Per-call bound on ledger store operations.
    #[must_use]
    pub fn storage_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.storage_ms)
    }

    /// Bound on waiting for the per-market finalize lock.
    #[must_use]
    pub fn finalize_lock_wait(&self) -> Duration {
        Duration::from_millis(self.timeouts.finalize_lock_wait_ms)
    }
}
