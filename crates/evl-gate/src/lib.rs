//! Access control for the Expiring Value Ledger (EVL).
//!
//! Two independent gates, never conflated:
//! - the **role gate** ([`RoleRegistry`]): who may mint, who may
//!   administer grants, who holds the protocol-level operator bypass;
//! - the **whitelist gate** ([`TransferPolicy`]): which recipients are
//!   eligible destinations for a given sender's transfer.
//!
//! [`ApprovalRegistry`] carries both the operator approvals that feed
//! the whitelist and the scalar ERC20-style allowances consumed by
//! delegated transfers. Every check fails closed: absence of a grant or
//! approval is a rejection carrying the offending account and the
//! required capability.

pub mod approvals;
pub mod error;
pub mod policy;
pub mod roles;

pub use approvals::ApprovalRegistry;
pub use error::GateError;
pub use policy::TransferPolicy;
pub use roles::RoleRegistry;
