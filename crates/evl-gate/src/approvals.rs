use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use evl_types::AccountId;

use crate::error::GateError;

/// Standing operator approvals and scalar allowances.
///
/// Two distinct relations live here:
/// - **operator approvals** — `set_approval_for_all(owner, operator)`,
///   a boolean opt-in that whitelists the operator both as a recipient
///   of the owner's value and as an initiator of transfers out of the
///   owner's account;
/// - **allowances** — a single scalar per (owner, spender) pair,
///   consumed by delegated single-balance transfers. An additional
///   gate, not a substitute for the whitelist.
#[derive(Default)]
pub struct ApprovalRegistry {
    inner: RwLock<ApprovalState>,
}

#[derive(Default)]
struct ApprovalState {
    operators: HashMap<AccountId, HashSet<AccountId>>,
    allowances: HashMap<(AccountId, AccountId), u128>,
}

impl ApprovalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, ApprovalState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, ApprovalState>, GateError> {
        self.inner.write().map_err(|_| GateError::LockPoisoned)
    }

    // ---- Operator approvals ----

    /// Set or clear the owner's blanket approval for an operator.
    pub fn set_approval_for_all(
        &self,
        owner: AccountId,
        operator: AccountId,
        approved: bool,
    ) -> Result<(), GateError> {
        if owner.is_zero() || operator.is_zero() {
            return Err(GateError::ZeroAccount);
        }
        if owner == operator {
            return Err(GateError::SelfApproval);
        }
        let mut state = self.write()?;
        if approved {
            state.operators.entry(owner).or_default().insert(operator);
        } else if let Some(ops) = state.operators.get_mut(&owner) {
            ops.remove(&operator);
        }
        debug!(%owner, %operator, approved, "operator approval set");
        Ok(())
    }

    pub fn is_approved_for_all(&self, owner: AccountId, operator: AccountId) -> bool {
        self.read()
            .operators
            .get(&owner)
            .is_some_and(|ops| ops.contains(&operator))
    }

    // ---- Scalar allowances ----

    /// Set the allowance for (owner, spender) to an absolute amount.
    pub fn approve(
        &self,
        owner: AccountId,
        spender: AccountId,
        amount: u128,
    ) -> Result<(), GateError> {
        if owner.is_zero() || spender.is_zero() {
            return Err(GateError::ZeroAccount);
        }
        let mut state = self.write()?;
        state.allowances.insert((owner, spender), amount);
        debug!(%owner, %spender, amount, "allowance set");
        Ok(())
    }

    pub fn allowance(&self, owner: AccountId, spender: AccountId) -> u128 {
        self.read()
            .allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or(0)
    }

    /// Consume part of an allowance, failing closed if it is short.
    /// The check and the decrement happen under one write lock, so two
    /// spenders racing over the same allowance cannot both win more
    /// than it holds.
    pub fn spend_allowance(
        &self,
        owner: AccountId,
        spender: AccountId,
        amount: u128,
    ) -> Result<(), GateError> {
        let mut state = self.write()?;
        let available = state
            .allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or(0);
        let remaining = available.checked_sub(amount).ok_or(
            GateError::InsufficientAllowance {
                owner,
                spender,
                requested: amount,
                available,
            },
        )?;
        state.allowances.insert((owner, spender), remaining);
        Ok(())
    }

    /// Put back an allowance taken by a transfer that was subsequently
    /// refused by its recipient.
    pub fn refund_allowance(
        &self,
        owner: AccountId,
        spender: AccountId,
        amount: u128,
    ) -> Result<(), GateError> {
        let mut state = self.write()?;
        let current = state
            .allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or(0);
        let restored = current.saturating_add(amount);
        state.allowances.insert((owner, spender), restored);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approval_for_all_roundtrip() {
        let registry = ApprovalRegistry::new();
        let owner = AccountId::ephemeral();
        let operator = AccountId::ephemeral();

        assert!(!registry.is_approved_for_all(owner, operator));
        registry.set_approval_for_all(owner, operator, true).unwrap();
        assert!(registry.is_approved_for_all(owner, operator));
        // Direction matters.
        assert!(!registry.is_approved_for_all(operator, owner));
        registry.set_approval_for_all(owner, operator, false).unwrap();
        assert!(!registry.is_approved_for_all(owner, operator));
    }

    #[test]
    fn self_approval_rejected() {
        let registry = ApprovalRegistry::new();
        let owner = AccountId::ephemeral();
        let err = registry.set_approval_for_all(owner, owner, true).unwrap_err();
        assert_eq!(err, GateError::SelfApproval);
    }

    #[test]
    fn zero_account_rejected() {
        let registry = ApprovalRegistry::new();
        let owner = AccountId::ephemeral();
        let err = registry
            .set_approval_for_all(owner, AccountId::zero(), true)
            .unwrap_err();
        assert_eq!(err, GateError::ZeroAccount);
    }

    #[test]
    fn allowance_set_and_spend() {
        let registry = ApprovalRegistry::new();
        let owner = AccountId::ephemeral();
        let spender = AccountId::ephemeral();

        registry.approve(owner, spender, 50).unwrap();
        assert_eq!(registry.allowance(owner, spender), 50);

        registry.spend_allowance(owner, spender, 30).unwrap();
        assert_eq!(registry.allowance(owner, spender), 20);
    }

    #[test]
    fn overspend_fails_closed_with_context() {
        let registry = ApprovalRegistry::new();
        let owner = AccountId::ephemeral();
        let spender = AccountId::ephemeral();
        registry.approve(owner, spender, 50).unwrap();

        let err = registry.spend_allowance(owner, spender, 51).unwrap_err();
        assert_eq!(
            err,
            GateError::InsufficientAllowance {
                owner,
                spender,
                requested: 51,
                available: 50,
            }
        );
        assert_eq!(registry.allowance(owner, spender), 50);
    }

    #[test]
    fn absent_allowance_is_zero() {
        let registry = ApprovalRegistry::new();
        let owner = AccountId::ephemeral();
        let spender = AccountId::ephemeral();
        assert_eq!(registry.allowance(owner, spender), 0);
        assert!(registry.spend_allowance(owner, spender, 1).is_err());
    }

    #[test]
    fn approve_overwrites_rather_than_accumulates() {
        let registry = ApprovalRegistry::new();
        let owner = AccountId::ephemeral();
        let spender = AccountId::ephemeral();
        registry.approve(owner, spender, 50).unwrap();
        registry.approve(owner, spender, 10).unwrap();
        assert_eq!(registry.allowance(owner, spender), 10);
    }

    #[test]
    fn refund_restores_spent_allowance() {
        let registry = ApprovalRegistry::new();
        let owner = AccountId::ephemeral();
        let spender = AccountId::ephemeral();
        registry.approve(owner, spender, 50).unwrap();
        registry.spend_allowance(owner, spender, 50).unwrap();
        registry.refund_allowance(owner, spender, 50).unwrap();
        assert_eq!(registry.allowance(owner, spender), 50);
    }
}
