use evl_types::{AccountId, Role};

use crate::approvals::ApprovalRegistry;
use crate::error::GateError;
use crate::roles::RoleRegistry;

/// The transfer whitelist and spender gates, evaluated fail-fast
/// before any balance mutation.
///
/// A recipient is an eligible destination for a sender's transfer iff
/// any of the following holds:
/// - the recipient is the sender (self-transfer changes no ownership
///   boundary, though it still re-buckets value into today's class);
/// - the sender has standing approval for the recipient;
/// - the recipient holds the protocol-level `Operator` role;
/// - the initiating caller holds `Operator` (privileged aggregation).
///
/// The arms are a plain disjunction with no precedence. The zero
/// account is never eligible on either side.
pub struct TransferPolicy<'a> {
    roles: &'a RoleRegistry,
    approvals: &'a ApprovalRegistry,
}

impl<'a> TransferPolicy<'a> {
    pub fn new(roles: &'a RoleRegistry, approvals: &'a ApprovalRegistry) -> Self {
        Self { roles, approvals }
    }

    /// Reject unless `recipient` is a whitelisted destination for a
    /// transfer out of `sender` initiated by `caller`.
    pub fn authorize_recipient(
        &self,
        caller: AccountId,
        sender: AccountId,
        recipient: AccountId,
    ) -> Result<(), GateError> {
        if sender.is_zero() || recipient.is_zero() {
            return Err(GateError::RecipientNotApproved { sender, recipient });
        }
        if recipient == sender
            || self.approvals.is_approved_for_all(sender, recipient)
            || self.roles.has_role(recipient, Role::Operator)
            || self.roles.has_role(caller, Role::Operator)
        {
            return Ok(());
        }
        Err(GateError::RecipientNotApproved { sender, recipient })
    }

    /// Reject unless `caller` may initiate a transfer out of `sender`'s
    /// account: the sender themself, an account the sender has approved
    /// for all, or an `Operator`.
    pub fn authorize_spender(
        &self,
        caller: AccountId,
        sender: AccountId,
    ) -> Result<(), GateError> {
        if caller.is_zero() || sender.is_zero() {
            return Err(GateError::ZeroAccount);
        }
        if caller == sender
            || self.approvals.is_approved_for_all(sender, caller)
            || self.roles.has_role(caller, Role::Operator)
        {
            return Ok(());
        }
        Err(GateError::SpenderNotApproved {
            caller,
            owner: sender,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        roles: RoleRegistry,
        approvals: ApprovalRegistry,
        admin: AccountId,
        sender: AccountId,
        recipient: AccountId,
    }

    impl Fixture {
        fn new() -> Self {
            let admin = AccountId::ephemeral();
            Self {
                roles: RoleRegistry::bootstrap(admin),
                approvals: ApprovalRegistry::new(),
                admin,
                sender: AccountId::ephemeral(),
                recipient: AccountId::ephemeral(),
            }
        }

        fn policy(&self) -> TransferPolicy<'_> {
            TransferPolicy::new(&self.roles, &self.approvals)
        }
    }

    #[test]
    fn unapproved_recipient_rejected_with_context() {
        let f = Fixture::new();
        let err = f
            .policy()
            .authorize_recipient(f.sender, f.sender, f.recipient)
            .unwrap_err();
        assert_eq!(
            err,
            GateError::RecipientNotApproved {
                sender: f.sender,
                recipient: f.recipient,
            }
        );
    }

    #[test]
    fn self_transfer_always_eligible() {
        let f = Fixture::new();
        f.policy()
            .authorize_recipient(f.sender, f.sender, f.sender)
            .unwrap();
    }

    #[test]
    fn approval_whitelists_the_recipient() {
        let f = Fixture::new();
        f.approvals
            .set_approval_for_all(f.sender, f.recipient, true)
            .unwrap();
        f.policy()
            .authorize_recipient(f.sender, f.sender, f.recipient)
            .unwrap();
    }

    #[test]
    fn approval_is_directional() {
        let f = Fixture::new();
        f.approvals
            .set_approval_for_all(f.recipient, f.sender, true)
            .unwrap();
        assert!(f
            .policy()
            .authorize_recipient(f.sender, f.sender, f.recipient)
            .is_err());
    }

    #[test]
    fn operator_recipient_bypasses_approval() {
        let f = Fixture::new();
        f.roles.grant(f.admin, f.recipient, Role::Operator).unwrap();
        f.policy()
            .authorize_recipient(f.sender, f.sender, f.recipient)
            .unwrap();
    }

    #[test]
    fn operator_caller_bypasses_approval() {
        let registry_admin = AccountId::ephemeral();
        let roles = RoleRegistry::bootstrap(registry_admin);
        let approvals = ApprovalRegistry::new();
        let caller = AccountId::ephemeral();
        let sender = AccountId::ephemeral();
        let recipient = AccountId::ephemeral();
        roles.grant(registry_admin, caller, Role::Operator).unwrap();

        let policy = TransferPolicy::new(&roles, &approvals);
        policy.authorize_recipient(caller, sender, recipient).unwrap();
    }

    #[test]
    fn zero_recipient_never_eligible() {
        let f = Fixture::new();
        let err = f
            .policy()
            .authorize_recipient(f.sender, f.sender, AccountId::zero())
            .unwrap_err();
        assert!(matches!(err, GateError::RecipientNotApproved { .. }));
    }

    #[test]
    fn spender_gate_owner_approved_and_operator() {
        let registry_admin = AccountId::ephemeral();
        let roles = RoleRegistry::bootstrap(registry_admin);
        let approvals = ApprovalRegistry::new();
        let owner = AccountId::ephemeral();
        let delegate = AccountId::ephemeral();
        let operator = AccountId::ephemeral();
        let stranger = AccountId::ephemeral();

        let policy = TransferPolicy::new(&roles, &approvals);
        policy.authorize_spender(owner, owner).unwrap();

        let err = policy.authorize_spender(stranger, owner).unwrap_err();
        assert!(matches!(err, GateError::SpenderNotApproved { .. }));

        approvals.set_approval_for_all(owner, delegate, true).unwrap();
        policy.authorize_spender(delegate, owner).unwrap();

        roles.grant(registry_admin, operator, Role::Operator).unwrap();
        policy.authorize_spender(operator, owner).unwrap();
    }
}
