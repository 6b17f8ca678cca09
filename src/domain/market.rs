//! Market-related domain types.
//!
//! - [`Market`] - A question with N mutually-exclusive outcomes and a
//!   resolution lifecycle
//! - [`Outcome`] - A single tradeable outcome with a running probability
//! - [`MarketStatus`] - Lifecycle states from tradeable to resolved

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{MarketId, OutcomeId, UserId};

/// Market lifecycle state.
///
/// Transitions: `Open → PendingResolution → Resolved`. A market in
/// `PendingResolution` no longer accepts trades; `Resolved` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketStatus {
    /// Tradeable; a resolution may be proposed.
    Open,
    /// A resolution is pending (possibly disputed); trading is halted.
    PendingResolution,
    /// Resolution approved and payouts distributed. Terminal.
    Resolved,
}

impl MarketStatus {
    /// Stable name used in logs and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::PendingResolution => "pending_resolution",
            Self::Resolved => "resolved",
        }
    }
}

/// A single outcome within a market.
///
/// Tracks a running probability in `[0, 1]`. After the market resolves the
/// winning outcome settles to probability 1.0 and every other outcome to
/// 0.0, with `is_resolved` set on all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    outcome_id: OutcomeId,
    name: String,
    probability: Decimal,
    is_resolved: bool,
}

impl Outcome {
    /// Create a new unresolved outcome with probability 0.
    pub fn new(outcome_id: OutcomeId, name: impl Into<String>) -> Self {
        Self {
            outcome_id,
            name: name.into(),
            probability: Decimal::ZERO,
            is_resolved: false,
        }
    }

    /// Get the outcome ID.
    #[must_use]
    pub const fn outcome_id(&self) -> &OutcomeId {
        &self.outcome_id
    }

    /// Get the name of this outcome.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the current probability.
    #[must_use]
    pub const fn probability(&self) -> Decimal {
        self.probability
    }

    /// Whether this outcome has been settled by a resolution.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.is_resolved
    }

    /// Settle this outcome: winners go to probability 1.0, losers to 0.0.
    pub(crate) fn finalize(&mut self, won: bool) {
        self.probability = if won { Decimal::ONE } else { Decimal::ZERO };
        self.is_resolved = true;
    }
}

/// A prediction market: a question with discrete mutually-exclusive
/// outcomes, tradeable until resolved.
///
/// Carries a version counter for optimistic concurrency: the ledger store
/// rejects writes whose expected version no longer matches the stored row,
/// which is what prevents two finalizes from both paying out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    market_id: MarketId,
    question: String,
    creator: UserId,
    outcomes: Vec<Outcome>,
    status: MarketStatus,
    expires_at: DateTime<Utc>,
    version: u64,
}

impl Market {
    /// Create a new open market with domain invariant validation.
    ///
    /// # Domain Invariants
    ///
    /// - `outcomes` must not be empty
    /// - outcome ids must be unique within the market
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if any invariant is violated.
    pub fn try_new(
        market_id: MarketId,
        question: impl Into<String>,
        creator: UserId,
        outcomes: Vec<Outcome>,
        expires_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if outcomes.is_empty() {
            return Err(DomainError::EmptyOutcomes);
        }
        for (i, outcome) in outcomes.iter().enumerate() {
            if outcomes[..i]
                .iter()
                .any(|o| o.outcome_id() == outcome.outcome_id())
            {
                return Err(DomainError::DuplicateOutcome {
                    outcome_id: outcome.outcome_id().to_string(),
                });
            }
        }

        Ok(Self {
            market_id,
            question: question.into(),
            creator,
            outcomes,
            status: MarketStatus::Open,
            expires_at,
            version: 0,
        })
    }

    /// Get the market ID.
    #[must_use]
    pub const fn market_id(&self) -> &MarketId {
        &self.market_id
    }

    /// Get the market question.
    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Get the creator's user id.
    #[must_use]
    pub const fn creator(&self) -> &UserId {
        &self.creator
    }

    /// Get all outcomes.
    #[must_use]
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// Get the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> MarketStatus {
        self.status
    }

    /// Get the expiry timestamp.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Current optimistic-concurrency version.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Whether the market currently accepts trades.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == MarketStatus::Open
    }

    /// Find an outcome by id.
    #[must_use]
    pub fn outcome(&self, id: &OutcomeId) -> Option<&Outcome> {
        self.outcomes.iter().find(|o| o.outcome_id() == id)
    }

    /// Whether the given outcome belongs to this market.
    #[must_use]
    pub fn contains_outcome(&self, id: &OutcomeId) -> bool {
        self.outcome(id).is_some()
    }

    /// Halt trading while a resolution is pending.
    pub(crate) fn mark_pending_resolution(&mut self) {
        self.status = MarketStatus::PendingResolution;
    }

    /// Transition to `Resolved` and settle every outcome's probability.
    pub(crate) fn mark_resolved(&mut self, winning: &OutcomeId) {
        self.status = MarketStatus::Resolved;
        for outcome in &mut self.outcomes {
            let won = outcome.outcome_id() == winning;
            outcome.finalize(won);
        }
    }

    /// Bump the version counter. Called by stores on successful writes.
    pub fn bump_version(&mut self) {
        self.version += 1;
    }
}
