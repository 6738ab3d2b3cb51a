use evl_types::{AccountId, Role};

/// Errors produced by role, approval, and whitelist checks.
///
/// Every variant names the offending account and the capability it
/// lacked; all are raised before any balance mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error("account {account} is missing the {role} role")]
    MissingRole { account: AccountId, role: Role },

    #[error("transfer to non-approved recipient {recipient} from {sender} is not allowed")]
    RecipientNotApproved {
        sender: AccountId,
        recipient: AccountId,
    },

    #[error("caller {caller} is not an approved spender for {owner}")]
    SpenderNotApproved { caller: AccountId, owner: AccountId },

    #[error("allowance for {spender} from {owner} is insufficient: requested {requested}, available {available}")]
    InsufficientAllowance {
        owner: AccountId,
        spender: AccountId,
        requested: u128,
        available: u128,
    },

    #[error("the zero account cannot participate in approvals or transfers")]
    ZeroAccount,

    #[error("an account cannot change its own operator approval")]
    SelfApproval,

    #[error("registry lock poisoned")]
    LockPoisoned,
}
