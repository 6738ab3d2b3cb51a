use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use evl_types::{AccountId, ClassId};

use crate::account::HolderAccount;
use crate::error::LedgerError;
use crate::traits::{BalanceReader, BalanceWriter};

/// The per-class debits applied by one transfer, oldest class first.
///
/// A committed plan is the exact record needed to reverse the transfer
/// if the recipient refuses it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DebitPlan {
    debits: Vec<(ClassId, u128)>,
}

impl DebitPlan {
    /// The (class, quantity) debits in application order.
    pub fn debits(&self) -> &[(ClassId, u128)] {
        &self.debits
    }

    /// Total quantity moved.
    pub fn total(&self) -> u128 {
        self.debits.iter().map(|(_, q)| q).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.debits.is_empty()
    }
}

/// In-memory class ledger for tests, local demos, and embedding.
///
/// A single `RwLock` guards the whole state; every mutating operation
/// holds the write lock for its full duration, so operations never
/// interleave and a failed one leaves nothing behind (validation is
/// done against the locked state before any entry is touched).
#[derive(Default)]
pub struct InMemoryLedger {
    inner: RwLock<LedgerState>,
}

#[derive(Default)]
struct LedgerState {
    holders: HashMap<AccountId, HolderAccount>,
    total_supply: u128,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of one holder's account, for inspection and tests.
    pub fn holder(&self, holder: AccountId) -> Option<HolderAccount> {
        let state = self.read_state();
        state.holders.get(&holder).cloned()
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, LedgerState> {
        // Writers only mutate after validating against the locked
        // state, so recovering from a poisoned lock still observes a
        // settled ledger.
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, LedgerState>, LedgerError> {
        self.inner.write().map_err(|_| LedgerError::LockPoisoned)
    }

    /// Oldest-first debit plan for `quantity` of the holder's live
    /// value. Pure planning: no entry is touched. The oldest classes
    /// are the soonest to expire, so consuming them first minimizes
    /// value lost to future expiry.
    fn plan_live_debit(
        state: &LedgerState,
        holder: AccountId,
        quantity: u128,
        today: ClassId,
        period_days: u64,
    ) -> Result<DebitPlan, LedgerError> {
        let account = state.holders.get(&holder);
        let mut remaining = quantity;
        let mut debits = Vec::new();

        if let Some(account) = account {
            for (class, value) in account.iter() {
                if remaining == 0 {
                    break;
                }
                if class.is_expired(today, period_days) || value == 0 {
                    continue;
                }
                let take = remaining.min(value);
                debits.push((class, take));
                remaining -= take;
            }
        }

        if remaining > 0 {
            return Err(LedgerError::InsufficientLiveBalance {
                holder,
                requested: quantity,
                available: quantity - remaining,
            });
        }
        Ok(DebitPlan { debits })
    }

    /// Validate explicitly named (class, quantity) debits against the
    /// locked state, all pairs or none. A batch may name the same class
    /// more than once; the demands accumulate against that one entry.
    fn plan_class_debits(
        state: &LedgerState,
        holder: AccountId,
        pairs: &[(ClassId, u128)],
        today: ClassId,
        period_days: u64,
    ) -> Result<DebitPlan, LedgerError> {
        let account = state.holders.get(&holder);
        let mut demanded: HashMap<ClassId, u128> = HashMap::new();

        for &(class, quantity) in pairs {
            if quantity == 0 {
                return Err(LedgerError::ZeroQuantity);
            }
            let available = if class.is_expired(today, period_days) {
                0
            } else {
                account.map(|a| a.entry(class)).unwrap_or(0)
            };
            let total = demanded
                .entry(class)
                .or_insert(0)
                .checked_add(quantity)
                .ok_or(LedgerError::AmountOverflow { holder })?;
            demanded.insert(class, total);
            if total > available {
                return Err(LedgerError::InsufficientClassBalance {
                    holder,
                    class,
                    requested: total,
                    available,
                });
            }
        }

        Ok(DebitPlan {
            debits: pairs.to_vec(),
        })
    }

    /// Apply a validated plan: debit the sender's classes and credit
    /// the whole quantity to the recipient's `today` class. The plan
    /// was checked against this same locked state, so the arithmetic
    /// here cannot underflow; the recipient-side credit can still
    /// overflow and is checked.
    fn apply_transfer(
        state: &mut LedgerState,
        sender: AccountId,
        recipient: AccountId,
        plan: &DebitPlan,
        today: ClassId,
    ) -> Result<(), LedgerError> {
        let total = plan.total();

        // Check the credit side before debiting anything.
        let recipient_entry = state
            .holders
            .get(&recipient)
            .map(|a| a.entry(today))
            .unwrap_or(0);
        if recipient_entry.checked_add(total).is_none() {
            return Err(LedgerError::AmountOverflow { holder: recipient });
        }

        let sender_account = state
            .holders
            .get_mut(&sender)
            .ok_or(LedgerError::InsufficientLiveBalance {
                holder: sender,
                requested: total,
                available: 0,
            })?;
        for &(class, quantity) in plan.debits() {
            sender_account
                .debit(class, quantity)
                .ok_or(LedgerError::InsufficientClassBalance {
                    holder: sender,
                    class,
                    requested: quantity,
                    available: 0,
                })?;
        }

        let recipient_account = state.holders.entry(recipient).or_default();
        recipient_account
            .credit(today, total)
            .ok_or(LedgerError::AmountOverflow { holder: recipient })?;
        Ok(())
    }

    fn check_parties(
        sender: AccountId,
        recipient: AccountId,
        quantity: u128,
    ) -> Result<(), LedgerError> {
        if sender.is_zero() || recipient.is_zero() {
            return Err(LedgerError::ZeroAccount);
        }
        if quantity == 0 {
            return Err(LedgerError::ZeroQuantity);
        }
        Ok(())
    }
}

impl BalanceWriter for InMemoryLedger {
    fn mint(
        &self,
        recipient: AccountId,
        quantity: u128,
        today: ClassId,
    ) -> Result<u128, LedgerError> {
        if recipient.is_zero() {
            return Err(LedgerError::ZeroAccount);
        }
        if quantity == 0 {
            return Err(LedgerError::ZeroQuantity);
        }

        let mut state = self.write_state()?;
        let supply = state
            .total_supply
            .checked_add(quantity)
            .ok_or(LedgerError::AmountOverflow { holder: recipient })?;
        let account = state.holders.entry(recipient).or_default();
        let entry = account
            .credit(today, quantity)
            .ok_or(LedgerError::AmountOverflow { holder: recipient })?;
        state.total_supply = supply;

        debug!(%recipient, class = %today, quantity, supply, "mint");
        Ok(entry)
    }

    fn transfer_live(
        &self,
        sender: AccountId,
        recipient: AccountId,
        quantity: u128,
        today: ClassId,
        period_days: u64,
    ) -> Result<DebitPlan, LedgerError> {
        Self::check_parties(sender, recipient, quantity)?;

        let mut state = self.write_state()?;
        let plan = Self::plan_live_debit(&state, sender, quantity, today, period_days)?;
        Self::apply_transfer(&mut state, sender, recipient, &plan, today)?;

        debug!(%sender, %recipient, quantity, classes = plan.debits().len(), "transfer");
        Ok(plan)
    }

    fn transfer_classes(
        &self,
        sender: AccountId,
        recipient: AccountId,
        pairs: &[(ClassId, u128)],
        today: ClassId,
        period_days: u64,
    ) -> Result<DebitPlan, LedgerError> {
        if sender.is_zero() || recipient.is_zero() {
            return Err(LedgerError::ZeroAccount);
        }
        if pairs.is_empty() {
            return Err(LedgerError::ZeroQuantity);
        }

        let mut state = self.write_state()?;
        let plan = Self::plan_class_debits(&state, sender, pairs, today, period_days)?;
        Self::apply_transfer(&mut state, sender, recipient, &plan, today)?;

        debug!(%sender, %recipient, pairs = pairs.len(), "class transfer");
        Ok(plan)
    }

    fn reverse_transfer(
        &self,
        sender: AccountId,
        recipient: AccountId,
        plan: &DebitPlan,
        credited: ClassId,
    ) -> Result<(), LedgerError> {
        let total = plan.total();
        let mut state = self.write_state()?;

        // Validate both sides before touching either. The recipient may
        // have re-spent the credit through a reentrant call, in which
        // case the reversal reports insufficiency rather than clamping.
        let recipient_entry = state
            .holders
            .get(&recipient)
            .map(|a| a.entry(credited))
            .unwrap_or(0);
        if recipient_entry < total {
            return Err(LedgerError::InsufficientClassBalance {
                holder: recipient,
                class: credited,
                requested: total,
                available: recipient_entry,
            });
        }
        {
            let sender_account = state.holders.entry(sender).or_default();
            for &(class, quantity) in plan.debits() {
                if sender_account.entry(class).checked_add(quantity).is_none() {
                    return Err(LedgerError::AmountOverflow { holder: sender });
                }
            }
        }

        let recipient_account = state
            .holders
            .get_mut(&recipient)
            .ok_or(LedgerError::ZeroAccount)?;
        recipient_account
            .debit(credited, total)
            .ok_or(LedgerError::AmountOverflow { holder: recipient })?;

        let sender_account = state.holders.entry(sender).or_default();
        for &(class, quantity) in plan.debits() {
            sender_account
                .credit(class, quantity)
                .ok_or(LedgerError::AmountOverflow { holder: sender })?;
        }

        debug!(%sender, %recipient, total, "transfer reversed");
        Ok(())
    }
}

impl BalanceReader for InMemoryLedger {
    fn live_balance(&self, holder: AccountId, today: ClassId, period_days: u64) -> u128 {
        self.read_state()
            .holders
            .get(&holder)
            .map(|a| a.live_balance(today, period_days))
            .unwrap_or(0)
    }

    fn expired_balance(&self, holder: AccountId, today: ClassId, period_days: u64) -> u128 {
        self.read_state()
            .holders
            .get(&holder)
            .map(|a| a.expired_balance(today, period_days))
            .unwrap_or(0)
    }

    fn class_balance(&self, holder: AccountId, class: ClassId) -> u128 {
        self.read_state()
            .holders
            .get(&holder)
            .map(|a| a.entry(class))
            .unwrap_or(0)
    }

    fn total_held(&self, holder: AccountId) -> u128 {
        self.read_state()
            .holders
            .get(&holder)
            .map(|a| a.total_held())
            .unwrap_or(0)
    }

    fn total_supply(&self) -> u128 {
        self.read_state().total_supply
    }

    fn class_count(&self, holder: AccountId) -> usize {
        self.read_state()
            .holders
            .get(&holder)
            .map(|a| a.class_count())
            .unwrap_or(0)
    }

    fn class_at(&self, holder: AccountId, index: usize) -> Result<ClassId, LedgerError> {
        let state = self.read_state();
        let account = state.holders.get(&holder);
        let len = account.map(|a| a.class_count()).unwrap_or(0);
        account
            .and_then(|a| a.class_at(index))
            .ok_or(LedgerError::ClassIndexOutOfRange { holder, index, len })
    }
}
