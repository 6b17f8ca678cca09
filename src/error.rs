use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::error::DomainError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Persistence failures surfaced by [`LedgerStore`](crate::port::LedgerStore)
/// implementations.
///
/// The transient/permanent split drives the engine's retry policy:
/// [`is_transient`](StorageError::is_transient) failures are retried with
/// backoff, everything else is surfaced immediately.
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    /// The store is temporarily unreachable or overloaded. Retryable.
    #[error("storage unavailable: {reason}")]
    Unavailable { reason: String },

    /// A store call exceeded the caller-supplied timeout. Retryable.
    #[error("storage operation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// An optimistic write was rejected because the row changed underneath
    /// the caller. Not retryable by the store layer; the caller must re-read
    /// and decide again.
    #[error("write conflict: {reason}")]
    Conflict { reason: String },

    /// Stored data violates an invariant (e.g. payouts exceeding volume).
    #[error("data integrity violation: {reason}")]
    Integrity { reason: String },

    /// Permanent persistence failure.
    #[error("storage failure: {reason}")]
    Internal { reason: String },
}

impl StorageError {
    /// Whether this failure is worth retrying with backoff.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Timeout { .. })
    }
}

/// Errors returned by [`ResolutionEngine`](crate::engine::ResolutionEngine)
/// operations.
///
/// Validation errors (`NotFound`, `InvalidState`, `Unauthorized`,
/// `InvalidTrade`) are detected before any write and leave no partial
/// effect. `Storage` is surfaced only after bounded retries with the
/// transaction rolled back. `Conflict` means a concurrent writer won; the
/// caller should re-read and decide again.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("invalid state: {reason}")]
    InvalidState { reason: String },

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("invalid trade: {0}")]
    InvalidTrade(#[from] DomainError),

    #[error("no stake on the winning outcome (total volume {total_volume})")]
    NoWinningStake { total_volume: Decimal },

    #[error("concurrent modification: {reason}")]
    Conflict { reason: String },

    #[error(transparent)]
    Storage(StorageError),
}

impl EngineError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState {
            reason: reason.into(),
        }
    }

    pub(crate) fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized {
            reason: reason.into(),
        }
    }
}

impl From<StorageError> for EngineError {
    fn from(err: StorageError) -> Self {
        match err {
            // A store-level write conflict is the engine-level conflict
            // signal: some other finalize/propose won the race.
            StorageError::Conflict { reason } => Self::Conflict { reason },
            other => Self::Storage(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Result alias for store implementations.
pub type StoreResult<T> = std::result::Result<T, StorageError>;
