//! Exchange-agnostic domain types and pure computations.
//!
//! Nothing in this module performs I/O. Lifecycle transitions that require
//! persistence or locking live in [`crate::engine`]; this module only knows
//! how to represent entities and compute over snapshots of them.

pub mod error;
pub mod id;
pub mod market;
pub mod reputation;
pub mod resolution;
pub mod settlement;
pub mod trade;

pub use error::DomainError;
pub use id::{MarketId, OutcomeId, ResolutionId, TradeId, UserId};
pub use market::{Market, MarketStatus, Outcome};
pub use reputation::{Badge, UserReputation};
pub use resolution::{EvidenceEntry, EvidenceKind, Resolution, ResolutionStatus};
pub use settlement::{settle, Payout, SettlementError, SettlementSheet};
pub use trade::{Trade, TradeSide, TradeStatus};
