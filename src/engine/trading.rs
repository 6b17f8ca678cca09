//! Trade submission and cancellation.
//!
//! Submission takes the same per-market lock as finalize, so a trade is
//! either rejected because the market left its tradeable state or fully
//! recorded before a settlement snapshot is taken - never silently lost
//! mid-finalize.

use rust_decimal::Decimal;
use tracing::info;

use crate::domain::{MarketId, OutcomeId, Trade, TradeId, TradeSide, TradeStatus};
use crate::error::{EngineError, Result};

use super::{Actor, ResolutionEngine};

impl ResolutionEngine {
    /// Record a trade at the submitter-specified price.
    ///
    /// The position goes live immediately; there is no pending window for
    /// engine-submitted trades. Fails with
    /// [`EngineError::InvalidTrade`] on a non-positive amount or an
    /// out-of-range price, before any read or write.
    pub async fn submit_trade(
        &self,
        actor: &Actor,
        market_id: &MarketId,
        outcome_id: &OutcomeId,
        side: TradeSide,
        amount: Decimal,
        price: Decimal,
    ) -> Result<Trade> {
        let mut trade = Trade::try_new(
            actor.user_id().clone(),
            market_id.clone(),
            outcome_id.clone(),
            side,
            amount,
            price,
        )?;

        let lock = self.market_lock(market_id);
        let _guard = lock.lock().await;

        let market = self
            .store_op("market", || self.store().market(market_id))
            .await?
            .ok_or_else(|| EngineError::not_found("market", market_id))?;
        if !market.is_open() {
            return Err(EngineError::invalid_state(format!(
                "market {market_id} is {}, not open for trading",
                market.status().as_str()
            )));
        }
        if !market.contains_outcome(outcome_id) {
            return Err(EngineError::not_found("outcome", outcome_id));
        }

        trade.activate();
        self.store_op("save_trade", || self.store().save_trade(&trade))
            .await?;

        info!(
            trade = %trade.trade_id(),
            market = %market_id,
            outcome = %outcome_id,
            side = side.as_str(),
            amount = %amount,
            price = %price,
            "trade recorded"
        );

        Ok(trade)
    }

    /// Cancel a pending trade. Owner-only.
    ///
    /// Only `Pending` positions can be cancelled. [`submit_trade`]
    /// activates immediately, so this applies to positions the platform
    /// records directly in the ledger and activates later (e.g. held for
    /// funds checks).
    ///
    /// [`submit_trade`]: Self::submit_trade
    pub async fn cancel_trade(&self, actor: &Actor, trade_id: &TradeId) -> Result<Trade> {
        let mut trade = self
            .store_op("trade", || self.store().trade(trade_id))
            .await?
            .ok_or_else(|| EngineError::not_found("trade", trade_id))?;

        if trade.user_id() != actor.user_id() {
            return Err(EngineError::unauthorized(
                "only the trade owner may cancel it",
            ));
        }
        if trade.status() != TradeStatus::Pending {
            return Err(EngineError::invalid_state(format!(
                "trade {trade_id} is {}, only pending trades can be cancelled",
                trade.status().as_str()
            )));
        }

        trade.cancel();
        self.store_op("save_trade", || self.store().save_trade(&trade))
            .await?;

        info!(trade = %trade_id, "trade cancelled");
        Ok(trade)
    }
}
