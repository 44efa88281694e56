//! Progression ledger: per-user experience, holdings and claim times.
//!
//! The engines only see the `LedgerStore` trait. `MemoryLedger` is the
//! reference implementation used by tests and single-process hosts.

pub mod store;
pub mod memory;

pub use store::{Holding, LedgerStore, UserRecord};
pub use memory::MemoryLedger;
