//! Settlor - Market resolution and settlement engine for prediction markets.
//!
//! This crate implements the component that takes a prediction market from
//! tradeable to resolved: it enforces the resolution lifecycle, computes
//! value-conserving payouts for position holders, recomputes each trader's
//! reputation, and supports a dispute/appeal sub-workflow that can roll a
//! resolution back before it becomes final.
//!
//! # Architecture
//!
//! The engine is a stateless transformation over a transactional ledger:
//!
//! - **[`domain`]** - Entities and pure computations
//!   - `settlement` - Winner-take-pool payout calculator (no I/O)
//!   - `reputation` - Trust-score and badge model
//!   - `market` / `trade` / `resolution` - Lifecycle state
//! - **[`port`]** - Traits at the seams
//!   - `LedgerStore` - Transactional persistence with an atomic multi-row write
//!   - `SettlementNotifier` - Fire-and-forget event sink
//! - **[`engine`]** - `ResolutionEngine` orchestration: lifecycle operations,
//!   trade submission, per-market and per-user serialization, bounded retry
//! - **[`store`]** - In-memory ledger adapter
//! - **[`notifier`]** - Tracing and channel-backed notifier adapters
//!
//! # Modules
//!
//! - [`config`] - Engine configuration loaded from TOML
//! - [`error`] - Error types for the crate
//! - [`logging`] - Tracing subscriber initialization
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use settlor::config::EngineConfig;
//! use settlor::engine::{Actor, Capability, ResolutionEngine};
//! use settlor::notifier::TracingNotifier;
//! use settlor::store::MemoryLedger;
//!
//! # async fn run() -> settlor::error::Result<()> {
//! let engine = ResolutionEngine::new(
//!     Arc::new(MemoryLedger::new()),
//!     Arc::new(TracingNotifier::new()),
//!     EngineConfig::default(),
//! );
//!
//! let arbiter = Actor::new("arbiter-1").with_capability(Capability::Arbiter);
//! let receipt = engine.finalize(&arbiter, &"res-1".into()).await?;
//! println!("paid out {}", receipt.sheet.total_paid());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod logging;
pub mod notifier;
pub mod port;
pub mod store;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
