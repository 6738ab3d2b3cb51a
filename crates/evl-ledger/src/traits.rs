use evl_types::{AccountId, ClassId};

use crate::error::LedgerError;
use crate::memory::DebitPlan;

/// Read boundary for balance and enumeration queries.
///
/// Balances are computed against the `today` the caller passes in;
/// nothing is cached, so the same ledger state yields a smaller live
/// balance for a later `today` with no intervening mutation.
pub trait BalanceReader: Send + Sync {
    /// Sum of the holder's entries in non-expired classes.
    fn live_balance(&self, holder: AccountId, today: ClassId, period_days: u64) -> u128;

    /// Sum of the holder's entries in expired classes.
    fn expired_balance(&self, holder: AccountId, today: ClassId, period_days: u64) -> u128;

    /// The raw entry value for one (holder, class) pair.
    fn class_balance(&self, holder: AccountId, class: ClassId) -> u128;

    /// Sum of every entry across all the holder's classes, live and
    /// expired; equals `live_balance + expired_balance` for any read day.
    fn total_held(&self, holder: AccountId) -> u128;

    /// Running supply counter: increased by mint only; transfers are
    /// supply-neutral and expiry never reduces it.
    fn total_supply(&self) -> u128;

    /// Number of classes the holder has ever touched.
    fn class_count(&self, holder: AccountId) -> usize;

    /// The holder's `index`-th class in first-touch (ascending) order.
    /// Out-of-range indices are an error, distinct from a holder that
    /// legitimately has zero classes.
    fn class_at(&self, holder: AccountId, index: usize) -> Result<ClassId, LedgerError>;
}

/// Write boundary for supply- and balance-changing operations.
///
/// Every method executes as one indivisible unit: concurrent callers
/// never observe a partially-applied effect, and a failed call leaves
/// no mutation behind.
pub trait BalanceWriter: Send + Sync {
    /// Create `quantity` new units in the recipient's `today` class and
    /// add them to total supply. Returns the new entry value.
    fn mint(
        &self,
        recipient: AccountId,
        quantity: u128,
        today: ClassId,
    ) -> Result<u128, LedgerError>;

    /// Move `quantity` from the sender's oldest live classes into the
    /// recipient's `today` class. Oldest-first debit preferentially
    /// consumes the value closest to expiry. Returns the per-class
    /// debit plan that was applied.
    fn transfer_live(
        &self,
        sender: AccountId,
        recipient: AccountId,
        quantity: u128,
        today: ClassId,
        period_days: u64,
    ) -> Result<DebitPlan, LedgerError>;

    /// Move value out of explicitly named sender classes into the
    /// recipient's `today` class, all pairs or none. Each pair fails if
    /// its class is expired or short, regardless of the sender's
    /// aggregate live balance.
    fn transfer_classes(
        &self,
        sender: AccountId,
        recipient: AccountId,
        pairs: &[(ClassId, u128)],
        today: ClassId,
        period_days: u64,
    ) -> Result<DebitPlan, LedgerError>;

    /// Exact inverse of a committed transfer, applied when the
    /// recipient refuses it after the fact: restores each debited
    /// (class, quantity) to the sender and removes the matching credit
    /// from the recipient's `credited` class.
    fn reverse_transfer(
        &self,
        sender: AccountId,
        recipient: AccountId,
        plan: &DebitPlan,
        credited: ClassId,
    ) -> Result<(), LedgerError>;
}
