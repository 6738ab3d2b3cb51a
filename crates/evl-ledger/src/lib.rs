//! Time-bucketed class ledger for the Expiring Value Ledger (EVL).
//!
//! This crate is the accounting core. It provides:
//! - Per-holder balance entries keyed by day-indexed asset class
//! - An append-only, de-duplicated per-holder class index (no GC)
//! - Mint/credit and oldest-first live debit primitives
//! - Computed live/expired balance queries (re-evaluated per read)
//! - Total-supply accounting (mint-only; transfer- and expiry-neutral)
//! - `BalanceReader` / `BalanceWriter` trait boundaries
//! - `InMemoryLedger` implementation behind a single `RwLock`

pub mod account;
pub mod error;
pub mod memory;
pub mod traits;

pub use account::HolderAccount;
pub use error::LedgerError;
pub use memory::{DebitPlan, InMemoryLedger};
pub use traits::{BalanceReader, BalanceWriter};
