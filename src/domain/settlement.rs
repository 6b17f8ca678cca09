//! Winner-take-pool settlement calculator.
//!
//! Pure computation over a snapshot of trades and the winning outcome:
//! no I/O, no clocks, no randomness. The caller applies the resulting
//! [`SettlementSheet`] as a single atomic ledger write.
//!
//! The pool model is proportional to stake: the entire wagered volume is
//! redistributed to buy positions on the winning outcome, scaled by
//! `total_volume / winning_volume`. Value is conserved - the calculator
//! refuses to produce a sheet that pays out more than was wagered.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error::DomainError;
use super::id::{OutcomeId, TradeId, UserId};
use super::trade::{Trade, TradeSide};

/// Slack allowed on the conservation check, covering decimal rounding in
/// the multiplier division.
const CONSERVATION_TOLERANCE: Decimal = dec!(0.000000001);

/// Errors from the settlement computation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettlementError {
    /// No buy position holds the winning outcome, so the reward multiplier
    /// is undefined. The market must not transition to resolved.
    #[error("no stake on the winning outcome (total volume {total_volume})")]
    NoWinningStake { total_volume: Decimal },

    /// A trade in the snapshot fails validation. These should have been
    /// rejected before reaching the calculator.
    #[error(transparent)]
    InvalidTrade(#[from] DomainError),

    /// Computed payouts exceed the wagered volume.
    #[error("conservation violated: paying {paid} out of {total_volume} wagered")]
    Conservation {
        paid: Decimal,
        total_volume: Decimal,
    },
}

/// Settlement result for a single position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub user_id: UserId,
    pub trade_id: TradeId,
    /// Amount credited to the user's balance. Zero for losing positions.
    pub payout: Decimal,
    /// Realized P&L: `payout - amount × price`.
    pub profit: Decimal,
}

/// The full output of settling one market.
///
/// Stored on the approved resolution so a retried finalize can replay the
/// identical result without recomputing or re-crediting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementSheet {
    /// Total quantity wagered across all settleable trades.
    pub total_volume: Decimal,
    /// Quantity wagered on buy positions of the winning outcome.
    pub winning_volume: Decimal,
    /// `total_volume / winning_volume`. `None` when there were no trades.
    pub reward_multiplier: Option<Decimal>,
    /// One entry per settleable trade, winners and losers alike.
    pub payouts: Vec<Payout>,
}

impl SettlementSheet {
    /// An empty sheet for a market with zero trades.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            total_volume: Decimal::ZERO,
            winning_volume: Decimal::ZERO,
            reward_multiplier: None,
            payouts: Vec::new(),
        }
    }

    /// Sum of all payouts on the sheet.
    #[must_use]
    pub fn total_paid(&self) -> Decimal {
        self.payouts.iter().map(|p| p.payout).sum()
    }

    /// Whether the sheet settles any positions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payouts.is_empty()
    }

    /// Number of positions with a non-zero payout.
    #[must_use]
    pub fn winner_count(&self) -> usize {
        self.payouts
            .iter()
            .filter(|p| p.payout > Decimal::ZERO)
            .count()
    }
}

/// Compute the settlement sheet for a market.
///
/// `trades` is the snapshot of the market's trades; only settleable
/// (active) trades are counted. Winning buy positions receive
/// `amount × total_volume / winning_volume`, every other position
/// receives zero, and every settled position's profit is
/// `payout - amount × price`.
///
/// # Errors
///
/// - [`SettlementError::NoWinningStake`] when volume was wagered but no
///   buy position holds the winning outcome (division by zero otherwise).
/// - [`SettlementError::InvalidTrade`] when a snapshot trade carries a
///   non-positive amount or an out-of-range price.
/// - [`SettlementError::Conservation`] when the computed payouts exceed
///   the wagered volume beyond rounding tolerance.
pub fn settle(trades: &[Trade], winning: &OutcomeId) -> Result<SettlementSheet, SettlementError> {
    let settleable: Vec<&Trade> = trades.iter().filter(|t| t.is_settleable()).collect();

    for trade in &settleable {
        if trade.amount() <= Decimal::ZERO {
            return Err(DomainError::NonPositiveAmount {
                amount: trade.amount(),
            }
            .into());
        }
        if trade.price() <= Decimal::ZERO || trade.price() > Decimal::ONE {
            return Err(DomainError::PriceOutOfRange {
                price: trade.price(),
            }
            .into());
        }
    }

    if settleable.is_empty() {
        return Ok(SettlementSheet::empty());
    }

    let total_volume: Decimal = settleable.iter().map(|t| t.amount()).sum();
    let winning_volume: Decimal = settleable
        .iter()
        .filter(|t| t.outcome_id() == winning && t.side() == TradeSide::Buy)
        .map(|t| t.amount())
        .sum();

    let multiplier = total_volume
        .checked_div(winning_volume)
        .ok_or(SettlementError::NoWinningStake { total_volume })?;

    let payouts: Vec<Payout> = settleable
        .iter()
        .map(|trade| {
            let is_winner =
                trade.outcome_id() == winning && trade.side() == TradeSide::Buy;
            let payout = if is_winner {
                trade.amount() * multiplier
            } else {
                Decimal::ZERO
            };
            Payout {
                user_id: trade.user_id().clone(),
                trade_id: trade.trade_id().clone(),
                payout,
                profit: payout - trade.cost(),
            }
        })
        .collect();

    let sheet = SettlementSheet {
        total_volume,
        winning_volume,
        reward_multiplier: Some(multiplier),
        payouts,
    };

    let paid = sheet.total_paid();
    if paid > total_volume + CONSERVATION_TOLERANCE {
        return Err(SettlementError::Conservation { paid, total_volume });
    }

    Ok(sheet)
}
