//! Ledger wrappers for failure-injection tests.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{
    Market, MarketId, Resolution, ResolutionId, Trade, TradeId, UserId, UserReputation,
};
use crate::error::{StorageError, StoreResult};
use crate::port::{LedgerStore, SettlementWrite};

/// A ledger that fails its next `n` calls with a transient
/// [`StorageError::Unavailable`], then delegates to the inner store.
///
/// Useful for exercising the engine's retry/backoff path.
pub struct FlakyLedger<S> {
    inner: S,
    failures_remaining: AtomicU32,
}

impl<S> FlakyLedger<S> {
    /// Wrap `inner`, failing the next `failures` store calls.
    pub fn new(inner: S, failures: u32) -> Self {
        Self {
            inner,
            failures_remaining: AtomicU32::new(failures),
        }
    }

    /// Arm another batch of failures.
    pub fn fail_next(&self, failures: u32) {
        self.failures_remaining.store(failures, Ordering::SeqCst);
    }

    /// Access the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn maybe_fail(&self) -> StoreResult<()> {
        let remaining = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if remaining {
            Err(StorageError::Unavailable {
                reason: "injected transient failure".into(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl<S: LedgerStore> LedgerStore for FlakyLedger<S> {
    async fn market(&self, id: &MarketId) -> StoreResult<Option<Market>> {
        self.maybe_fail()?;
        self.inner.market(id).await
    }

    async fn save_market(&self, market: &Market) -> StoreResult<()> {
        self.maybe_fail()?;
        self.inner.save_market(market).await
    }

    async fn trade(&self, id: &TradeId) -> StoreResult<Option<Trade>> {
        self.maybe_fail()?;
        self.inner.trade(id).await
    }

    async fn save_trade(&self, trade: &Trade) -> StoreResult<()> {
        self.maybe_fail()?;
        self.inner.save_trade(trade).await
    }

    async fn trades_for_market(&self, id: &MarketId) -> StoreResult<Vec<Trade>> {
        self.maybe_fail()?;
        self.inner.trades_for_market(id).await
    }

    async fn resolved_trades_for_user(&self, id: &UserId) -> StoreResult<Vec<Trade>> {
        self.maybe_fail()?;
        self.inner.resolved_trades_for_user(id).await
    }

    async fn resolution(&self, id: &ResolutionId) -> StoreResult<Option<Resolution>> {
        self.maybe_fail()?;
        self.inner.resolution(id).await
    }

    async fn resolution_for_market(&self, id: &MarketId) -> StoreResult<Option<Resolution>> {
        self.maybe_fail()?;
        self.inner.resolution_for_market(id).await
    }

    async fn save_resolution(&self, resolution: &Resolution) -> StoreResult<()> {
        self.maybe_fail()?;
        self.inner.save_resolution(resolution).await
    }

    async fn apply_proposal(&self, market: &Market, resolution: &Resolution) -> StoreResult<()> {
        self.maybe_fail()?;
        self.inner.apply_proposal(market, resolution).await
    }

    async fn apply_settlement(&self, write: &SettlementWrite) -> StoreResult<()> {
        self.maybe_fail()?;
        self.inner.apply_settlement(write).await
    }

    async fn reputation(&self, id: &UserId) -> StoreResult<Option<UserReputation>> {
        self.maybe_fail()?;
        self.inner.reputation(id).await
    }

    async fn save_reputation(&self, reputation: &UserReputation) -> StoreResult<()> {
        self.maybe_fail()?;
        self.inner.save_reputation(reputation).await
    }

    async fn top_reputations(&self, limit: usize) -> StoreResult<Vec<UserReputation>> {
        self.maybe_fail()?;
        self.inner.top_reputations(limit).await
    }

    async fn balance(&self, id: &UserId) -> StoreResult<Decimal> {
        self.maybe_fail()?;
        self.inner.balance(id).await
    }
}

/// A ledger that fails only `save_reputation` (with a permanent
/// [`StorageError::Internal`]) while the outage flag is set, delegating
/// everything else to the inner store.
///
/// Useful for exercising what happens when a settlement commits but the
/// reputation write that follows it does not.
pub struct ReputationOutage<S> {
    inner: S,
    failing: AtomicBool,
}

impl<S> ReputationOutage<S> {
    /// Wrap `inner` with the outage initially off.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            failing: AtomicBool::new(false),
        }
    }

    /// Toggle the outage.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Access the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: LedgerStore> LedgerStore for ReputationOutage<S> {
    async fn market(&self, id: &MarketId) -> StoreResult<Option<Market>> {
        self.inner.market(id).await
    }

    async fn save_market(&self, market: &Market) -> StoreResult<()> {
        self.inner.save_market(market).await
    }

    async fn trade(&self, id: &TradeId) -> StoreResult<Option<Trade>> {
        self.inner.trade(id).await
    }

    async fn save_trade(&self, trade: &Trade) -> StoreResult<()> {
        self.inner.save_trade(trade).await
    }

    async fn trades_for_market(&self, id: &MarketId) -> StoreResult<Vec<Trade>> {
        self.inner.trades_for_market(id).await
    }

    async fn resolved_trades_for_user(&self, id: &UserId) -> StoreResult<Vec<Trade>> {
        self.inner.resolved_trades_for_user(id).await
    }

    async fn resolution(&self, id: &ResolutionId) -> StoreResult<Option<Resolution>> {
        self.inner.resolution(id).await
    }

    async fn resolution_for_market(&self, id: &MarketId) -> StoreResult<Option<Resolution>> {
        self.inner.resolution_for_market(id).await
    }

    async fn save_resolution(&self, resolution: &Resolution) -> StoreResult<()> {
        self.inner.save_resolution(resolution).await
    }

    async fn apply_proposal(&self, market: &Market, resolution: &Resolution) -> StoreResult<()> {
        self.inner.apply_proposal(market, resolution).await
    }

    async fn apply_settlement(&self, write: &SettlementWrite) -> StoreResult<()> {
        self.inner.apply_settlement(write).await
    }

    async fn reputation(&self, id: &UserId) -> StoreResult<Option<UserReputation>> {
        self.inner.reputation(id).await
    }

    async fn save_reputation(&self, reputation: &UserReputation) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Internal {
                reason: "injected reputation write failure".into(),
            });
        }
        self.inner.save_reputation(reputation).await
    }

    async fn top_reputations(&self, limit: usize) -> StoreResult<Vec<UserReputation>> {
        self.inner.top_reputations(limit).await
    }

    async fn balance(&self, id: &UserId) -> StoreResult<Decimal> {
        self.inner.balance(id).await
    }
}
