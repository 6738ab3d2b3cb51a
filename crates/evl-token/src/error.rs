use evl_types::AccountId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("ledger error: {0}")]
    Ledger(#[from] evl_ledger::LedgerError),

    #[error("gate error: {0}")]
    Gate(#[from] evl_gate::GateError),

    #[error("batch class and quantity lists differ in length: {classes} classes, {quantities} quantities")]
    BatchLengthMismatch { classes: usize, quantities: usize },

    #[error("transfer refused by recipient {recipient}")]
    TransferRefused { recipient: AccountId },
}

pub type TokenResult<T> = Result<T, TokenError>;
