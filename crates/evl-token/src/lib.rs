//! Expiring token facade for the Expiring Value Ledger (EVL).
//!
//! [`ExpiringToken`] composes the class ledger, the role and approval
//! registries, and a day clock into the public token surface:
//!
//! - role-gated minting into the current day's asset class
//! - whitelist-gated transfers (single, per-class, batch), all routed
//!   through the ledger's one oldest-first debit primitive
//! - an ERC20-style veneer (`transfer` / `approve` / `allowance` /
//!   `transfer_from`) over the same debit path
//! - post-commit notification of reactive recipients, with exact
//!   reversal when a recipient refuses a transfer

pub mod config;
pub mod error;
pub mod receiver;
pub mod token;

pub use config::TokenConfig;
pub use error::{TokenError, TokenResult};
pub use receiver::{ReceivedTransfer, ReceiverAck, TransferReceiver};
pub use token::ExpiringToken;
