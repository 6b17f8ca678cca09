//! The resolution engine: orchestration over the ledger store.
//!
//! [`ResolutionEngine`] is invoked by concurrent request handlers and holds
//! no entity state of its own - only two lock registries that serialize
//! finalize per market and reputation recompute per user. Every ledger
//! call is bounded by the configured timeout and retried with backoff on
//! transient failures.
//!
//! Operations are split by concern:
//!
//! - [`lifecycle`] - propose / finalize / dispute / reconsider / read view
//! - [`trading`] - trade submission and cancellation
//! - [`reputation`] - per-user recompute and the leaderboard read

mod lifecycle;
mod reputation;
mod retry;
mod trading;

pub use lifecycle::{FinalizeReceipt, OutcomeVolume, ResolutionView};

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::config::EngineConfig;
use crate::domain::{MarketId, UserId};
use crate::error::{EngineError, Result, StorageError, StoreResult};
use crate::port::{LedgerStore, SettlementNotifier};

/// A privilege an actor may hold beyond plain ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Platform administrator: may propose on any market and settle.
    Admin,
    /// Protocol-defined settlement arbiter: may finalize resolutions.
    Arbiter,
}

/// The authenticated principal invoking an engine operation.
///
/// Authorization is explicit: capabilities are passed in with each call
/// rather than read from ambient context.
#[derive(Debug, Clone)]
pub struct Actor {
    user_id: UserId,
    capabilities: Vec<Capability>,
}

impl Actor {
    /// An actor with no capabilities beyond ownership checks.
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            capabilities: Vec::new(),
        }
    }

    /// Grant a capability.
    #[must_use]
    pub fn with_capability(mut self, capability: Capability) -> Self {
        if !self.capabilities.contains(&capability) {
            self.capabilities.push(capability);
        }
        self
    }

    /// Get the actor's user id.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Whether the actor holds the given capability.
    #[must_use]
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Whether the actor may finalize resolutions.
    #[must_use]
    pub fn can_settle(&self) -> bool {
        self.has(Capability::Admin) || self.has(Capability::Arbiter)
    }
}

/// The market resolution and settlement engine.
///
/// Safe to share across tasks (`Arc<ResolutionEngine>`); all operations
/// take `&self`.
pub struct ResolutionEngine {
    store: Arc<dyn LedgerStore>,
    notifier: Arc<dyn SettlementNotifier>,
    config: EngineConfig,
    /// Serializes lifecycle writes and trade submission per market.
    market_locks: DashMap<MarketId, Arc<Mutex<()>>>,
    /// Serializes reputation recompute per user.
    user_locks: DashMap<UserId, Arc<Mutex<()>>>,
}

impl ResolutionEngine {
    /// Create an engine over the given ledger and notifier.
    pub fn new(
        store: Arc<dyn LedgerStore>,
        notifier: Arc<dyn SettlementNotifier>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            config,
            market_locks: DashMap::new(),
            user_locks: DashMap::new(),
        }
    }

    pub(crate) fn store(&self) -> &dyn LedgerStore {
        self.store.as_ref()
    }

    pub(crate) fn notifier(&self) -> &dyn SettlementNotifier {
        self.notifier.as_ref()
    }

    pub(crate) fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(crate) fn market_lock(&self, id: &MarketId) -> Arc<Mutex<()>> {
        self.market_locks
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub(crate) fn user_lock(&self, id: &UserId) -> Arc<Mutex<()>> {
        self.user_locks
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Run a ledger call bounded by the storage timeout, retrying
    /// transient failures per the configured policy.
    pub(crate) async fn store_op<T, Fut>(
        &self,
        op: &'static str,
        f: impl Fn() -> Fut,
    ) -> Result<T>
    where
        Fut: Future<Output = StoreResult<T>>,
    {
        let timeout = self.config.storage_timeout();
        let timeout_ms = self.config.timeouts.storage_ms;

        retry::with_retry(&self.config.retry, op, || {
            let fut = f();
            async move {
                match tokio::time::timeout(timeout, fut).await {
                    Ok(result) => result,
                    Err(_) => Err(StorageError::Timeout { timeout_ms }),
                }
            }
        })
        .await
        .map_err(EngineError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actor_without_capabilities_cannot_settle() {
        let actor = Actor::new("u1");
        assert!(!actor.can_settle());
        assert!(!actor.has(Capability::Admin));
    }

    #[test]
    fn admin_and_arbiter_can_settle() {
        assert!(Actor::new("a").with_capability(Capability::Admin).can_settle());
        assert!(Actor::new("b")
            .with_capability(Capability::Arbiter)
            .can_settle());
    }

    #[test]
    fn duplicate_capability_grants_are_idempotent() {
        let actor = Actor::new("a")
            .with_capability(Capability::Admin)
            .with_capability(Capability::Admin);
        assert!(actor.has(Capability::Admin));
        assert_eq!(
            actor.capabilities.len(),
            1,
            "capability should not be duplicated"
        );
    }
}
