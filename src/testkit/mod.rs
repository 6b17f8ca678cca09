//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`] — Builders for domain primitives: markets, trades, actors.
//! - [`store`] — Ledger wrappers that inject failures:
//!   [`FlakyLedger`](store::FlakyLedger) for transient outages and
//!   [`ReputationOutage`](store::ReputationOutage) for failing reputation
//!   writes only.

pub mod domain;
pub mod store;
