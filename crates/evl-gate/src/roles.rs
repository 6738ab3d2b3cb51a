use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use tracing::info;

use evl_types::{AccountId, Role};

use crate::error::GateError;

/// In-memory role store.
///
/// A grant is a (role, account) pair; grants have no expiration and are
/// only changed by `grant`/`revoke`, which are themselves `Admin`-gated.
/// `require_role` fails closed: no grant means rejection, with the
/// offending account and the required role in the error.
#[derive(Default)]
pub struct RoleRegistry {
    grants: RwLock<HashMap<Role, HashSet<AccountId>>>,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bootstrap a registry whose initial admin also holds `Minter`.
    /// Used by the token initializer, callable once per instance.
    pub fn bootstrap(admin: AccountId) -> Self {
        let registry = Self::new();
        {
            let mut grants = registry.grants.write().unwrap_or_else(PoisonError::into_inner);
            grants.entry(Role::Admin).or_default().insert(admin);
            grants.entry(Role::Minter).or_default().insert(admin);
        }
        registry
    }

    pub fn has_role(&self, account: AccountId, role: Role) -> bool {
        self.grants
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&role)
            .is_some_and(|holders| holders.contains(&account))
    }

    /// Reject unless `account` holds `role`.
    pub fn require_role(&self, account: AccountId, role: Role) -> Result<(), GateError> {
        if self.has_role(account, role) {
            Ok(())
        } else {
            Err(GateError::MissingRole { account, role })
        }
    }

    /// Grant `role` to `account`. The caller must hold `Admin`.
    pub fn grant(
        &self,
        caller: AccountId,
        account: AccountId,
        role: Role,
    ) -> Result<(), GateError> {
        self.require_role(caller, Role::Admin)?;
        if account.is_zero() {
            return Err(GateError::ZeroAccount);
        }
        let mut grants = self.grants.write().map_err(|_| GateError::LockPoisoned)?;
        grants.entry(role).or_default().insert(account);
        info!(%caller, %account, %role, "role granted");
        Ok(())
    }

    /// Revoke `role` from `account`. The caller must hold `Admin`.
    /// Revoking an absent grant is a no-op.
    pub fn revoke(
        &self,
        caller: AccountId,
        account: AccountId,
        role: Role,
    ) -> Result<(), GateError> {
        self.require_role(caller, Role::Admin)?;
        let mut grants = self.grants.write().map_err(|_| GateError::LockPoisoned)?;
        if let Some(holders) = grants.get_mut(&role) {
            holders.remove(&account);
        }
        info!(%caller, %account, %role, "role revoked");
        Ok(())
    }
}
