//! Domain validation errors for core domain types.
//!
//! These errors are returned by `try_new` constructors and other methods
//! that validate domain rules, and are detected before anything reaches
//! the settlement calculator or the ledger.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Wagered amounts must be positive.
    #[error("amount must be positive, got {amount}")]
    NonPositiveAmount {
        /// The invalid amount that was provided.
        amount: Decimal,
    },

    /// Entry prices must be in (0, 1].
    #[error("price must be in (0, 1], got {price}")]
    PriceOutOfRange {
        /// The invalid price that was provided.
        price: Decimal,
    },

    /// Markets must have at least one outcome.
    #[error("outcomes cannot be empty")]
    EmptyOutcomes,

    /// Outcome ids within a market must be unique.
    #[error("duplicate outcome id: {outcome_id}")]
    DuplicateOutcome { outcome_id: String },
}
