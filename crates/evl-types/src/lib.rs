//! Foundation types for the Expiring Value Ledger (EVL).
//!
//! This crate provides the identity, temporal, and role types used
//! throughout the EVL system. Every other EVL crate depends on `evl-types`.
//!
//! # Key Types
//!
//! - [`AccountId`] — Persistent cryptographic account identity (BLAKE3-derived)
//! - [`ClassId`] — Day-indexed asset class identifier with an expiry predicate
//! - [`Role`] — Protocol roles gating mint and whitelist bypass
//! - [`DayClock`] — Clock boundary producing a non-decreasing current day

pub mod account;
pub mod class;
pub mod clock;
pub mod error;
pub mod role;

pub use account::{AccountId, AccountMaterial};
pub use class::{ClassId, SECONDS_PER_DAY};
pub use clock::{DayClock, ManualClock, SystemClock};
pub use error::TypeError;
pub use role::Role;
