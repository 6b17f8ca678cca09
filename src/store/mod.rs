//! Ledger store adapters.

pub mod memory;

pub use memory::MemoryLedger;
