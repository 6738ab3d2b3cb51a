use chrono::{DateTime, Utc};

use evl_types::{AccountId, ClassId};

/// One debited (class, quantity) observed by a reactive recipient.
///
/// A single transfer produces one notification per debited class; a
/// batch produces one per input pair, in input order. Every
/// notification for one enclosing operation carries the same commit
/// timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceivedTransfer {
    /// The account that initiated the enclosing operation.
    pub operator: AccountId,
    /// The debited holder.
    pub from: AccountId,
    /// The sender-side class the value came out of.
    pub class: ClassId,
    /// Quantity debited from that class.
    pub quantity: u128,
    /// Commit time of the enclosing operation.
    pub at: DateTime<Utc>,
}

/// Receiver's verdict on a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReceiverAck {
    Accepted,
    /// Refuse the transfer: the whole enclosing operation fails and its
    /// balance effects are reversed.
    Rejected,
}

/// Boundary for reactive recipients.
///
/// Notification happens strictly after the ledger state for the
/// operation is finalized and the lock released; a reentrant call from
/// the receiver back into the token is an ordinary new top-level
/// operation and observes fully-settled state.
pub trait TransferReceiver: Send + Sync {
    fn on_received(&self, transfer: &ReceivedTransfer) -> ReceiverAck;
}
