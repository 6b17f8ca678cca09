//! Notifier port for resolution lifecycle events.
//!
//! The engine commits first and notifies second: an event always
//! describes an already-committed state transition. Delivery is
//! at-least-once; consumers deduplicate on resolution id + status.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{MarketId, OutcomeId, ResolutionId, SettlementSheet, UserId};

/// Events emitted after each committed resolution state transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResolutionEvent {
    /// A resolution was proposed; the market stopped trading.
    Proposed(ProposedEvent),
    /// A resolution was finalized and payouts distributed.
    Finalized(FinalizedEvent),
    /// A pending resolution was disputed.
    Disputed(DisputedEvent),
}

impl ResolutionEvent {
    /// The resolution this event concerns.
    #[must_use]
    pub fn resolution_id(&self) -> &ResolutionId {
        match self {
            Self::Proposed(e) => &e.resolution_id,
            Self::Finalized(e) => &e.resolution_id,
            Self::Disputed(e) => &e.resolution_id,
        }
    }

    /// Stable event name used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Proposed(_) => "RESOLUTION_PROPOSED",
            Self::Finalized(_) => "RESOLUTION_FINALIZED",
            Self::Disputed(_) => "RESOLUTION_DISPUTED",
        }
    }
}

/// Proposal event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposedEvent {
    pub resolution_id: ResolutionId,
    pub market_id: MarketId,
    pub proposed_outcome_id: OutcomeId,
    pub proposed_by: UserId,
}

/// Finalization event, carrying the payout summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizedEvent {
    pub resolution_id: ResolutionId,
    pub market_id: MarketId,
    pub resolved_outcome_id: OutcomeId,
    pub summary: SettlementSummary,
}

/// Dispute event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisputedEvent {
    pub resolution_id: ResolutionId,
    pub market_id: MarketId,
    pub disputed_by: UserId,
    pub reason: String,
}

/// Aggregate view of a settlement, suitable for broadcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementSummary {
    pub total_volume: Decimal,
    pub winning_volume: Decimal,
    pub reward_multiplier: Option<Decimal>,
    pub positions_settled: usize,
    pub winners: usize,
    pub total_paid: Decimal,
}

impl From<&SettlementSheet> for SettlementSummary {
    fn from(sheet: &SettlementSheet) -> Self {
        Self {
            total_volume: sheet.total_volume,
            winning_volume: sheet.winning_volume,
            reward_multiplier: sheet.reward_multiplier,
            positions_settled: sheet.payouts.len(),
            winners: sheet.winner_count(),
            total_paid: sheet.total_paid(),
        }
    }
}

/// Trait for notification handlers.
///
/// Implement this trait to receive resolution events from the engine.
/// Notifications are fire-and-forget.
///
/// # Implementation Notes
///
/// - Implementations must be thread-safe (`Send + Sync`)
/// - The `notify` method should not block or perform slow I/O
///   synchronously; spawn an async task for slow operations
pub trait SettlementNotifier: Send + Sync {
    /// Handle an event describing a committed state transition.
    fn notify(&self, event: ResolutionEvent);
}
