//! Ledger store port for persistence operations.
//!
//! The engine holds no persistent state of its own; everything lives
//! behind this trait. Implementations must expose an atomic multi-row
//! update ([`LedgerStore::apply_settlement`]) - the engine never partially
//! commits a settlement.
//!
//! # Implementation Notes
//!
//! - Implementations must be thread-safe (`Send + Sync`)
//! - Writes that carry a [`Market`] must compare its version against the
//!   stored row and fail with [`StorageError::Conflict`] on mismatch
//!   (optimistic concurrency), committing with the version bumped
//! - Transient failures should be reported as
//!   [`StorageError::Unavailable`]; the engine retries those with backoff
//!
//! [`StorageError::Conflict`]: crate::error::StorageError::Conflict
//! [`StorageError::Unavailable`]: crate::error::StorageError::Unavailable

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{
    Market, MarketId, Resolution, ResolutionId, Trade, TradeId, UserId, UserReputation,
};
use crate::error::StoreResult;

/// Everything a finalize commits, applied as one transaction.
///
/// `market` and `resolution` arrive in their post-settlement state
/// (resolved/approved); `trades` carry their payouts; `credits` are
/// balance increments per user.
#[derive(Debug, Clone)]
pub struct SettlementWrite {
    pub market: Market,
    pub resolution: Resolution,
    pub trades: Vec<Trade>,
    pub credits: Vec<(UserId, Decimal)>,
}

/// Transactional storage for markets, trades, resolutions, reputation
/// records, and balances.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Get a market by id.
    async fn market(&self, id: &MarketId) -> StoreResult<Option<Market>>;

    /// Insert or update a market, enforcing the version check.
    async fn save_market(&self, market: &Market) -> StoreResult<()>;

    /// Get a trade by id.
    async fn trade(&self, id: &TradeId) -> StoreResult<Option<Trade>>;

    /// Insert or update a trade.
    async fn save_trade(&self, trade: &Trade) -> StoreResult<()>;

    /// All trades recorded against a market.
    async fn trades_for_market(&self, id: &MarketId) -> StoreResult<Vec<Trade>>;

    /// A user's settled (resolved) trades, for reputation recompute.
    async fn resolved_trades_for_user(&self, id: &UserId) -> StoreResult<Vec<Trade>>;

    /// Get a resolution by id.
    async fn resolution(&self, id: &ResolutionId) -> StoreResult<Option<Resolution>>;

    /// Get the resolution for a market, if one exists.
    async fn resolution_for_market(&self, id: &MarketId) -> StoreResult<Option<Resolution>>;

    /// Insert or update a resolution.
    async fn save_resolution(&self, resolution: &Resolution) -> StoreResult<()>;

    /// Atomically record a proposal: the pending resolution plus the
    /// market's transition out of its tradeable state.
    async fn apply_proposal(&self, market: &Market, resolution: &Resolution) -> StoreResult<()>;

    /// Atomically commit a settlement: market resolved, resolution
    /// approved, trades settled, balances credited. All or nothing.
    async fn apply_settlement(&self, write: &SettlementWrite) -> StoreResult<()>;

    /// Get a user's reputation record.
    async fn reputation(&self, id: &UserId) -> StoreResult<Option<UserReputation>>;

    /// Insert or update a reputation record.
    async fn save_reputation(&self, reputation: &UserReputation) -> StoreResult<()>;

    /// Top reputation records ordered by trust score, then prediction
    /// count.
    async fn top_reputations(&self, limit: usize) -> StoreResult<Vec<UserReputation>>;

    /// A user's current balance (zero if the user has never been
    /// credited).
    async fn balance(&self, id: &UserId) -> StoreResult<Decimal>;
}
