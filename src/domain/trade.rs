//! Trade (position) domain types.
//!
//! A trade is a user's stake on one outcome at a given entry price. Trades
//! are recorded at the submitter-specified price; there is no order book.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{MarketId, OutcomeId, TradeId, UserId};

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    /// Stable name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

/// Trade lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeStatus {
    /// Recorded but not yet live; the owner may still cancel.
    Pending,
    /// Live position, counted by the settlement calculator.
    Active,
    /// Cancelled by its owner while pending. Never settled.
    Cancelled,
    /// Settled by a market resolution.
    Resolved,
}

impl TradeStatus {
    /// Stable name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Cancelled => "cancelled",
            Self::Resolved => "resolved",
        }
    }
}

/// A user's position on one outcome of a market.
///
/// Owned by the user who created it; mutated only by its owner while
/// `Pending` (cancel) or by settlement once the market resolves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    trade_id: TradeId,
    user_id: UserId,
    market_id: MarketId,
    outcome_id: OutcomeId,
    side: TradeSide,
    amount: Decimal,
    price: Decimal,
    status: TradeStatus,
    payout: Option<Decimal>,
    placed_at: DateTime<Utc>,
}

impl Trade {
    /// Create a pending trade with domain invariant validation.
    ///
    /// # Domain Invariants
    ///
    /// - `amount` must be positive
    /// - `price` must be in `(0, 1]`
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if any invariant is violated.
    pub fn try_new(
        user_id: UserId,
        market_id: MarketId,
        outcome_id: OutcomeId,
        side: TradeSide,
        amount: Decimal,
        price: Decimal,
    ) -> Result<Self, DomainError> {
        if amount <= Decimal::ZERO {
            return Err(DomainError::NonPositiveAmount { amount });
        }
        if price <= Decimal::ZERO || price > Decimal::ONE {
            return Err(DomainError::PriceOutOfRange { price });
        }

        Ok(Self {
            trade_id: TradeId::generate(),
            user_id,
            market_id,
            outcome_id,
            side,
            amount,
            price,
            status: TradeStatus::Pending,
            payout: None,
            placed_at: Utc::now(),
        })
    }

    /// Get the trade ID.
    #[must_use]
    pub const fn trade_id(&self) -> &TradeId {
        &self.trade_id
    }

    /// Get the owning user's id.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Get the market this trade belongs to.
    #[must_use]
    pub const fn market_id(&self) -> &MarketId {
        &self.market_id
    }

    /// Get the outcome this trade is staked on.
    #[must_use]
    pub const fn outcome_id(&self) -> &OutcomeId {
        &self.outcome_id
    }

    /// Get the trade direction.
    #[must_use]
    pub const fn side(&self) -> TradeSide {
        self.side
    }

    /// Get the wagered quantity.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// Get the entry price.
    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.price
    }

    /// Get the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TradeStatus {
        self.status
    }

    /// Payout credited at settlement, if settled.
    #[must_use]
    pub const fn payout(&self) -> Option<Decimal> {
        self.payout
    }

    /// When the trade was placed.
    #[must_use]
    pub const fn placed_at(&self) -> DateTime<Utc> {
        self.placed_at
    }

    /// Entry cost of the position (`amount × price`).
    #[must_use]
    pub fn cost(&self) -> Decimal {
        self.amount * self.price
    }

    /// Whether the settlement calculator counts this trade.
    #[must_use]
    pub fn is_settleable(&self) -> bool {
        self.status == TradeStatus::Active
    }

    /// Make the position live.
    pub fn activate(&mut self) {
        self.status = TradeStatus::Active;
    }

    /// Cancel a pending position.
    pub(crate) fn cancel(&mut self) {
        self.status = TradeStatus::Cancelled;
    }

    /// Settle the position with the given payout.
    pub(crate) fn settle(&mut self, payout: Decimal) {
        self.status = TradeStatus::Resolved;
        self.payout = Some(payout);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn trade(amount: Decimal, price: Decimal) -> Result<Trade, DomainError> {
        Trade::try_new(
            UserId::from("u1"),
            MarketId::from("m1"),
            OutcomeId::from("yes"),
            TradeSide::Buy,
            amount,
            price,
        )
    }

    #[test]
    fn valid_trade_starts_pending() {
        let trade = trade(dec!(100), dec!(0.4)).unwrap();
        assert_eq!(trade.status(), TradeStatus::Pending);
        assert_eq!(trade.payout(), None);
        assert!(!trade.is_settleable());
    }

    #[test]
    fn rejects_zero_amount() {
        let err = trade(dec!(0), dec!(0.4)).unwrap_err();
        assert!(matches!(err, DomainError::NonPositiveAmount { .. }));
    }

    #[test]
    fn rejects_negative_amount() {
        let err = trade(dec!(-5), dec!(0.4)).unwrap_err();
        assert!(matches!(err, DomainError::NonPositiveAmount { .. }));
    }

    #[test]
    fn rejects_zero_price() {
        let err = trade(dec!(10), dec!(0)).unwrap_err();
        assert!(matches!(err, DomainError::PriceOutOfRange { .. }));
    }

    #[test]
    fn rejects_price_above_one() {
        let err = trade(dec!(10), dec!(1.01)).unwrap_err();
        assert!(matches!(err, DomainError::PriceOutOfRange { .. }));
    }

    #[test]
    fn price_of_exactly_one_is_allowed() {
        assert!(trade(dec!(10), dec!(1)).is_ok());
    }

    #[test]
    fn cost_is_amount_times_price() {
        let trade = trade(dec!(100), dec!(0.4)).unwrap();
        assert_eq!(trade.cost(), dec!(40));
    }

    #[test]
    fn activate_makes_trade_settleable() {
        let mut trade = trade(dec!(100), dec!(0.4)).unwrap();
        trade.activate();
        assert_eq!(trade.status(), TradeStatus::Active);
        assert!(trade.is_settleable());
    }

    #[test]
    fn settle_records_payout() {
        let mut trade = trade(dec!(100), dec!(0.4)).unwrap();
        trade.activate();
        trade.settle(dec!(150));
        assert_eq!(trade.status(), TradeStatus::Resolved);
        assert_eq!(trade.payout(), Some(dec!(150)));
        assert!(!trade.is_settleable());
    }

    #[test]
    fn cancelled_trade_is_not_settleable() {
        let mut trade = trade(dec!(100), dec!(0.4)).unwrap();
        trade.cancel();
        assert_eq!(trade.status(), TradeStatus::Cancelled);
        assert!(!trade.is_settleable());
    }
}
