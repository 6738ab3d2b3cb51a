use evl_types::{AccountId, ClassId};

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("insufficient non-expired balance for {holder}: requested {requested}, available {available}")]
    InsufficientLiveBalance {
        holder: AccountId,
        requested: u128,
        available: u128,
    },

    #[error("insufficient non-expired balance in class {class} for {holder}: requested {requested}, available {available}")]
    InsufficientClassBalance {
        holder: AccountId,
        class: ClassId,
        requested: u128,
        available: u128,
    },

    #[error("class index {index} out of range for {holder} (holds {len} classes)")]
    ClassIndexOutOfRange {
        holder: AccountId,
        index: usize,
        len: usize,
    },

    #[error("quantity must be positive")]
    ZeroQuantity,

    #[error("the zero account cannot hold value")]
    ZeroAccount,

    #[error("arithmetic overflow adjusting balance for {holder}")]
    AmountOverflow { holder: AccountId },

    #[error("ledger lock poisoned")]
    LockPoisoned,
}
