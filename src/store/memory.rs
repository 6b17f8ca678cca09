//! In-memory ledger implementation.
//!
//! All entity maps live behind one lock, which makes the multi-row
//! settlement write trivially atomic: a writer either commits every row
//! or none. Market writes are version-checked so a stale writer gets
//! [`StorageError::Conflict`] instead of silently overwriting.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::domain::{
    Market, MarketId, Resolution, ResolutionId, Trade, TradeId, UserId, UserReputation,
};
use crate::error::{StorageError, StoreResult};
use crate::port::{LedgerStore, SettlementWrite};

#[derive(Debug, Default)]
struct LedgerState {
    markets: HashMap<MarketId, Market>,
    trades: HashMap<TradeId, Trade>,
    resolutions: HashMap<ResolutionId, Resolution>,
    resolution_by_market: HashMap<MarketId, ResolutionId>,
    reputations: HashMap<UserId, UserReputation>,
    balances: HashMap<UserId, Decimal>,
}

impl LedgerState {
    /// Version-checked market upsert. The incoming market must carry the
    /// version that was read; a fresh market must carry version 0.
    fn put_market(&mut self, market: &Market) -> StoreResult<()> {
        let stored_version = self.markets.get(market.market_id()).map(Market::version);
        match stored_version {
            Some(v) if v != market.version() => {
                return Err(StorageError::Conflict {
                    reason: format!(
                        "market {} is at version {v}, write expected {}",
                        market.market_id(),
                        market.version()
                    ),
                });
            }
            None if market.version() != 0 => {
                return Err(StorageError::Conflict {
                    reason: format!(
                        "market {} does not exist, write expected version {}",
                        market.market_id(),
                        market.version()
                    ),
                });
            }
            _ => {}
        }
        let mut committed = market.clone();
        committed.bump_version();
        self.markets.insert(committed.market_id().clone(), committed);
        Ok(())
    }

    fn put_resolution(&mut self, resolution: &Resolution) {
        self.resolution_by_market.insert(
            resolution.market_id().clone(),
            resolution.resolution_id().clone(),
        );
        self.resolutions
            .insert(resolution.resolution_id().clone(), resolution.clone());
    }
}

/// In-memory transactional ledger.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: RwLock<LedgerState>,
}

impl MemoryLedger {
    /// Create a new empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn market(&self, id: &MarketId) -> StoreResult<Option<Market>> {
        Ok(self.state.read().markets.get(id).cloned())
    }

    async fn save_market(&self, market: &Market) -> StoreResult<()> {
        self.state.write().put_market(market)
    }

    async fn trade(&self, id: &TradeId) -> StoreResult<Option<Trade>> {
        Ok(self.state.read().trades.get(id).cloned())
    }

    async fn save_trade(&self, trade: &Trade) -> StoreResult<()> {
        self.state
            .write()
            .trades
            .insert(trade.trade_id().clone(), trade.clone());
        Ok(())
    }

    async fn trades_for_market(&self, id: &MarketId) -> StoreResult<Vec<Trade>> {
        let state = self.state.read();
        let mut trades: Vec<Trade> = state
            .trades
            .values()
            .filter(|t| t.market_id() == id)
            .cloned()
            .collect();
        trades.sort_by(|a, b| a.placed_at().cmp(&b.placed_at()));
        Ok(trades)
    }

    async fn resolved_trades_for_user(&self, id: &UserId) -> StoreResult<Vec<Trade>> {
        let state = self.state.read();
        Ok(state
            .trades
            .values()
            .filter(|t| t.user_id() == id && t.status() == crate::domain::TradeStatus::Resolved)
            .cloned()
            .collect())
    }

    async fn resolution(&self, id: &ResolutionId) -> StoreResult<Option<Resolution>> {
        Ok(self.state.read().resolutions.get(id).cloned())
    }

    async fn resolution_for_market(&self, id: &MarketId) -> StoreResult<Option<Resolution>> {
        let state = self.state.read();
        Ok(state
            .resolution_by_market
            .get(id)
            .and_then(|rid| state.resolutions.get(rid))
            .cloned())
    }

    async fn save_resolution(&self, resolution: &Resolution) -> StoreResult<()> {
        self.state.write().put_resolution(resolution);
        Ok(())
    }

    async fn apply_proposal(&self, market: &Market, resolution: &Resolution) -> StoreResult<()> {
        let mut state = self.state.write();
        state.put_market(market)?;
        state.put_resolution(resolution);
        Ok(())
    }

    async fn apply_settlement(&self, write: &SettlementWrite) -> StoreResult<()> {
        let mut state = self.state.write();
        // The version check runs before any row is touched; a conflict
        // leaves the ledger untouched.
        state.put_market(&write.market)?;
        state.put_resolution(&write.resolution);
        for trade in &write.trades {
            state.trades.insert(trade.trade_id().clone(), trade.clone());
        }
        for (user_id, credit) in &write.credits {
            *state.balances.entry(user_id.clone()).or_default() += *credit;
        }
        Ok(())
    }

    async fn reputation(&self, id: &UserId) -> StoreResult<Option<UserReputation>> {
        Ok(self.state.read().reputations.get(id).cloned())
    }

    async fn save_reputation(&self, reputation: &UserReputation) -> StoreResult<()> {
        self.state
            .write()
            .reputations
            .insert(reputation.user_id().clone(), reputation.clone());
        Ok(())
    }

    async fn top_reputations(&self, limit: usize) -> StoreResult<Vec<UserReputation>> {
        let state = self.state.read();
        let mut all: Vec<UserReputation> = state.reputations.values().cloned().collect();
        all.sort_by(|a, b| {
            b.trust_score()
                .cmp(&a.trust_score())
                .then(b.total_predictions().cmp(&a.total_predictions()))
        });
        all.truncate(limit);
        Ok(all)
    }

    async fn balance(&self, id: &UserId) -> StoreResult<Decimal> {
        Ok(self
            .state
            .read()
            .balances
            .get(id)
            .copied()
            .unwrap_or(Decimal::ZERO))
    }
}
