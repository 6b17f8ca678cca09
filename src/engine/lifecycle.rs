//! Resolution lifecycle operations.
//!
//! State machine: `Open → PendingResolution → Resolved` on the market,
//! `Pending → {Approved | Disputed → Pending}` on the resolution.
//! Proposing halts trading; only a pending resolution can be finalized or
//! disputed; finalize on an approved resolution replays the stored result.
//!
//! Every operation validates before writing, commits atomically, and
//! notifies only after the commit.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::domain::settlement::{settle, SettlementError, SettlementSheet};
use crate::domain::{
    MarketId, MarketStatus, OutcomeId, Resolution, ResolutionId, Trade, TradeId, TradeStatus,
    UserId,
};
use crate::error::{EngineError, Result, StorageError};
use crate::port::notifier::{
    DisputedEvent, FinalizedEvent, ProposedEvent, ResolutionEvent, SettlementSummary,
};
use crate::port::SettlementWrite;

use super::{Actor, Capability, ResolutionEngine};

/// The result of a finalize call.
#[derive(Debug, Clone)]
pub struct FinalizeReceipt {
    /// The approved resolution, including its settled sheet.
    pub resolution: Resolution,
    /// The payout sheet that was applied (or replayed).
    pub sheet: SettlementSheet,
    /// True when this call observed an already-approved resolution and
    /// returned the stored result without writing anything.
    pub replayed: bool,
}

/// Trade activity on one outcome, part of the resolution read view.
#[derive(Debug, Clone)]
pub struct OutcomeVolume {
    pub outcome_id: OutcomeId,
    pub name: String,
    pub trade_count: usize,
    pub volume: Decimal,
}

/// Read-only view of a market's resolution with per-outcome volume.
#[derive(Debug, Clone)]
pub struct ResolutionView {
    pub resolution: Resolution,
    pub outcomes: Vec<OutcomeVolume>,
}

impl ResolutionEngine {
    /// Propose a resolution for an open market.
    ///
    /// Only the market creator or an admin may propose. On success the
    /// market stops trading (`PendingResolution`) and a pending
    /// [`Resolution`] is recorded atomically with it.
    pub async fn propose(
        &self,
        actor: &Actor,
        market_id: &MarketId,
        outcome_id: &OutcomeId,
        evidence: &str,
    ) -> Result<Resolution> {
        let lock = self.market_lock(market_id);
        let _guard = lock.lock().await;

        let market = self
            .store_op("market", || self.store().market(market_id))
            .await?
            .ok_or_else(|| EngineError::not_found("market", market_id))?;

        if !market.is_open() {
            return Err(EngineError::invalid_state(format!(
                "market {market_id} is {}, not open",
                market.status().as_str()
            )));
        }
        if !market.contains_outcome(outcome_id) {
            return Err(EngineError::not_found("outcome", outcome_id));
        }
        if actor.user_id() != market.creator() && !actor.has(Capability::Admin) {
            return Err(EngineError::unauthorized(
                "only the market creator or an admin may propose a resolution",
            ));
        }
        if self
            .store_op("resolution_for_market", || {
                self.store().resolution_for_market(market_id)
            })
            .await?
            .is_some()
        {
            return Err(EngineError::invalid_state(format!(
                "market {market_id} already has a resolution"
            )));
        }

        let resolution = Resolution::new(
            market_id.clone(),
            outcome_id.clone(),
            actor.user_id().clone(),
            evidence,
        );
        let mut halted = market;
        halted.mark_pending_resolution();

        self.store_op("apply_proposal", || {
            self.store().apply_proposal(&halted, &resolution)
        })
        .await?;

        info!(
            market = %market_id,
            resolution = %resolution.resolution_id(),
            outcome = %outcome_id,
            proposed_by = %actor.user_id(),
            "resolution proposed, trading halted"
        );
        self.notifier()
            .notify(ResolutionEvent::Proposed(ProposedEvent {
                resolution_id: resolution.resolution_id().clone(),
                market_id: market_id.clone(),
                proposed_outcome_id: outcome_id.clone(),
                proposed_by: actor.user_id().clone(),
            }));

        Ok(resolution)
    }

    /// Finalize a pending resolution: settle the market and distribute
    /// payouts.
    ///
    /// Requires settlement authority (admin or arbiter). Exactly one
    /// finalize runs per market at a time; a caller that cannot acquire
    /// the market lock within the configured wait gets
    /// [`EngineError::Conflict`]. Retrying on an already-approved
    /// resolution replays the stored sheet without re-crediting, and
    /// re-runs the reputation recompute for the affected users.
    pub async fn finalize(
        &self,
        actor: &Actor,
        resolution_id: &ResolutionId,
    ) -> Result<FinalizeReceipt> {
        if !actor.can_settle() {
            return Err(EngineError::unauthorized(
                "finalizing a resolution requires settlement authority",
            ));
        }

        let resolution = self
            .store_op("resolution", || self.store().resolution(resolution_id))
            .await?
            .ok_or_else(|| EngineError::not_found("resolution", resolution_id))?;

        if resolution.is_approved() {
            return Ok(self.replay(resolution).await);
        }
        let market_id = resolution.market_id().clone();

        let lock = self.market_lock(&market_id);
        let guard = tokio::time::timeout(self.config().finalize_lock_wait(), lock.lock())
            .await
            .map_err(|_| EngineError::Conflict {
                reason: format!("finalize already in progress for market {market_id}"),
            })?;

        // Re-read under the lock: another finalize may have won the race.
        let resolution = self
            .store_op("resolution", || self.store().resolution(resolution_id))
            .await?
            .ok_or_else(|| EngineError::not_found("resolution", resolution_id))?;
        if resolution.is_approved() {
            return Ok(self.replay(resolution).await);
        }
        if !resolution.is_pending() {
            return Err(EngineError::invalid_state(format!(
                "resolution {resolution_id} is {}, not pending",
                resolution.status().as_str()
            )));
        }

        let market = self
            .store_op("market", || self.store().market(&market_id))
            .await?
            .ok_or_else(|| EngineError::not_found("market", &market_id))?;
        if market.status() != MarketStatus::PendingResolution {
            return Err(EngineError::invalid_state(format!(
                "market {market_id} is {}, not pending resolution",
                market.status().as_str()
            )));
        }

        let trades = self
            .store_op("trades_for_market", || {
                self.store().trades_for_market(&market_id)
            })
            .await?;

        let winning = resolution.resolved_outcome_id().clone();
        let sheet = settle(&trades, &winning).map_err(map_settlement_error)?;

        let mut resolved_market = market;
        resolved_market.mark_resolved(&winning);
        let mut approved = resolution;
        approved.approve(sheet.clone(), Utc::now());

        let payout_by_trade: HashMap<&TradeId, Decimal> = sheet
            .payouts
            .iter()
            .map(|p| (&p.trade_id, p.payout))
            .collect();
        let settled_trades: Vec<Trade> = trades
            .iter()
            .filter(|t| t.is_settleable())
            .map(|t| {
                let mut settled = t.clone();
                settled.settle(
                    payout_by_trade
                        .get(t.trade_id())
                        .copied()
                        .unwrap_or(Decimal::ZERO),
                );
                settled
            })
            .collect();
        let credits: Vec<(UserId, Decimal)> = sheet
            .payouts
            .iter()
            .filter(|p| p.payout > Decimal::ZERO)
            .map(|p| (p.user_id.clone(), p.payout))
            .collect();

        let write = SettlementWrite {
            market: resolved_market,
            resolution: approved.clone(),
            trades: settled_trades,
            credits,
        };
        self.store_op("apply_settlement", || {
            self.store().apply_settlement(&write)
        })
        .await?;
        drop(guard);

        info!(
            market = %market_id,
            resolution = %resolution_id,
            outcome = %winning,
            total_volume = %sheet.total_volume,
            winners = sheet.winner_count(),
            total_paid = %sheet.total_paid(),
            "resolution finalized"
        );

        // The settlement is committed; the event describes committed
        // state and must not be held up by anything that can still fail.
        self.notifier()
            .notify(ResolutionEvent::Finalized(FinalizedEvent {
                resolution_id: resolution_id.clone(),
                market_id: market_id.clone(),
                resolved_outcome_id: winning,
                summary: SettlementSummary::from(&sheet),
            }));

        self.recompute_affected(&sheet).await;

        Ok(FinalizeReceipt {
            resolution: approved,
            sheet,
            replayed: false,
        })
    }

    /// Dispute a pending resolution, blocking finalize until it is
    /// reconsidered. Any actor with evidence may dispute.
    pub async fn dispute(
        &self,
        actor: &Actor,
        resolution_id: &ResolutionId,
        reason: &str,
        evidence: &str,
    ) -> Result<Resolution> {
        let resolution = self
            .store_op("resolution", || self.store().resolution(resolution_id))
            .await?
            .ok_or_else(|| EngineError::not_found("resolution", resolution_id))?;

        let lock = self.market_lock(resolution.market_id());
        let _guard = lock.lock().await;

        // Re-read under the lock so a racing finalize cannot be undone.
        let mut resolution = self
            .store_op("resolution", || self.store().resolution(resolution_id))
            .await?
            .ok_or_else(|| EngineError::not_found("resolution", resolution_id))?;
        if !resolution.is_pending() {
            return Err(EngineError::invalid_state(format!(
                "resolution {resolution_id} is {}, only pending resolutions can be disputed",
                resolution.status().as_str()
            )));
        }

        resolution.dispute(actor.user_id().clone(), reason, evidence);
        self.store_op("save_resolution", || {
            self.store().save_resolution(&resolution)
        })
        .await?;

        info!(
            resolution = %resolution_id,
            market = %resolution.market_id(),
            disputed_by = %actor.user_id(),
            "resolution disputed"
        );
        self.notifier()
            .notify(ResolutionEvent::Disputed(DisputedEvent {
                resolution_id: resolution_id.clone(),
                market_id: resolution.market_id().clone(),
                disputed_by: actor.user_id().clone(),
                reason: reason.to_string(),
            }));

        Ok(resolution)
    }

    /// Return a disputed resolution to pending for another finalize
    /// attempt, optionally amending the proposed outcome.
    ///
    /// Restricted to the market creator or an admin.
    pub async fn reconsider(
        &self,
        actor: &Actor,
        resolution_id: &ResolutionId,
        new_outcome: Option<&OutcomeId>,
        note: &str,
    ) -> Result<Resolution> {
        let resolution = self
            .store_op("resolution", || self.store().resolution(resolution_id))
            .await?
            .ok_or_else(|| EngineError::not_found("resolution", resolution_id))?;

        let lock = self.market_lock(resolution.market_id());
        let _guard = lock.lock().await;

        let mut resolution = self
            .store_op("resolution", || self.store().resolution(resolution_id))
            .await?
            .ok_or_else(|| EngineError::not_found("resolution", resolution_id))?;
        if resolution.status() != crate::domain::ResolutionStatus::Disputed {
            return Err(EngineError::invalid_state(format!(
                "resolution {resolution_id} is {}, only disputed resolutions can be reconsidered",
                resolution.status().as_str()
            )));
        }

        let market = self
            .store_op("market", || self.store().market(resolution.market_id()))
            .await?
            .ok_or_else(|| EngineError::not_found("market", resolution.market_id()))?;
        if actor.user_id() != market.creator() && !actor.has(Capability::Admin) {
            return Err(EngineError::unauthorized(
                "only the market creator or an admin may reconsider a resolution",
            ));
        }
        if let Some(outcome_id) = new_outcome {
            if !market.contains_outcome(outcome_id) {
                return Err(EngineError::not_found("outcome", outcome_id));
            }
        }

        resolution.reconsider(actor.user_id().clone(), note, new_outcome.cloned());
        self.store_op("save_resolution", || {
            self.store().save_resolution(&resolution)
        })
        .await?;

        info!(
            resolution = %resolution_id,
            market = %resolution.market_id(),
            outcome = %resolution.resolved_outcome_id(),
            "resolution reconsidered, back to pending"
        );

        Ok(resolution)
    }

    /// Read a market's resolution together with a per-outcome trade and
    /// volume summary.
    pub async fn resolution(&self, market_id: &MarketId) -> Result<ResolutionView> {
        let resolution = self
            .store_op("resolution_for_market", || {
                self.store().resolution_for_market(market_id)
            })
            .await?
            .ok_or_else(|| EngineError::not_found("resolution", market_id))?;

        let market = self
            .store_op("market", || self.store().market(market_id))
            .await?
            .ok_or_else(|| EngineError::not_found("market", market_id))?;
        let trades = self
            .store_op("trades_for_market", || {
                self.store().trades_for_market(market_id)
            })
            .await?;

        let outcomes = market
            .outcomes()
            .iter()
            .map(|outcome| {
                let on_outcome = trades.iter().filter(|t| {
                    t.outcome_id() == outcome.outcome_id()
                        && matches!(t.status(), TradeStatus::Active | TradeStatus::Resolved)
                });
                let (count, volume) = on_outcome
                    .fold((0usize, Decimal::ZERO), |(c, v), t| (c + 1, v + t.amount()));
                OutcomeVolume {
                    outcome_id: outcome.outcome_id().clone(),
                    name: outcome.name().to_string(),
                    trade_count: count,
                    volume,
                }
            })
            .collect();

        Ok(ResolutionView {
            resolution,
            outcomes,
        })
    }

    async fn replay(&self, resolution: Resolution) -> FinalizeReceipt {
        let sheet = resolution
            .settlement()
            .cloned()
            .unwrap_or_else(SettlementSheet::empty);
        // The recompute is a full rebuild from settled history, so
        // repeating it here recovers any recompute that failed after the
        // original commit.
        self.recompute_affected(&sheet).await;
        FinalizeReceipt {
            resolution,
            sheet,
            replayed: true,
        }
    }

    /// Recompute reputation for every user on the sheet, serialized per
    /// user. The settlement this follows is already committed, so a
    /// failed recompute is logged and left for the next replay rather
    /// than surfaced.
    async fn recompute_affected(&self, sheet: &SettlementSheet) {
        let mut affected: Vec<&UserId> =
            sheet.payouts.iter().map(|p| &p.user_id).collect();
        affected.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        affected.dedup();
        for user_id in affected {
            if let Err(err) = self.recompute_reputation(user_id).await {
                warn!(
                    user = %user_id,
                    error = %err,
                    "reputation recompute failed after committed settlement"
                );
            }
        }
    }
}

fn map_settlement_error(err: SettlementError) -> EngineError {
    match err {
        SettlementError::NoWinningStake { total_volume } => {
            EngineError::NoWinningStake { total_volume }
        }
        SettlementError::InvalidTrade(domain) => EngineError::InvalidTrade(domain),
        SettlementError::Conservation { paid, total_volume } => {
            EngineError::Storage(StorageError::Integrity {
                reason: format!("settlement would pay {paid} out of {total_volume} wagered"),
            })
        }
    }
}
