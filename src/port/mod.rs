//! Traits at the seams of the engine.
//!
//! - [`store`] - `LedgerStore`: transactional persistence with an atomic
//!   multi-row settlement write
//! - [`notifier`] - `SettlementNotifier`: fire-and-forget event sink

pub mod notifier;
pub mod store;

pub use notifier::{
    DisputedEvent, FinalizedEvent, ProposedEvent, ResolutionEvent, SettlementNotifier,
    SettlementSummary,
};
pub use store::{LedgerStore, SettlementWrite};
