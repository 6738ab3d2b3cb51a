use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use evl_types::ClassId;

/// Per-holder bucketed balances.
///
/// `entries` holds the raw quantity per class; an entry is created
/// lazily at first touch and never removed, even at zero balance or
/// past expiry. `classes` is the append-only ordered index of every
/// class the holder has ever touched: membership is decided by key
/// existence in `entries`, never by index position, so the append stays
/// idempotent. Class ids only increase with real time and a holder
/// first touches a class on that class's own day, so the index is
/// ascending by construction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderAccount {
    entries: HashMap<ClassId, u128>,
    classes: Vec<ClassId>,
}

impl HolderAccount {
    pub fn new() -> Self {
        Self::default()
    }

    /// The entry value for a class (zero if never touched).
    pub fn entry(&self, class: ClassId) -> u128 {
        self.entries.get(&class).copied().unwrap_or(0)
    }

    /// Ascending iterator over every class ever touched, with values.
    pub fn iter(&self) -> impl Iterator<Item = (ClassId, u128)> + '_ {
        self.classes.iter().map(|c| (*c, self.entry(*c)))
    }

    /// Number of classes ever touched.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// The class at position `index`, if in range.
    pub fn class_at(&self, index: usize) -> Option<ClassId> {
        self.classes.get(index).copied()
    }

    /// Sum of every entry across all classes, live and expired. Always
    /// equals `live_balance + expired_balance` for any read day.
    pub fn total_held(&self) -> u128 {
        self.iter().map(|(_, value)| value).sum()
    }

    /// Sum of entries in classes not expired as of `today`.
    pub fn live_balance(&self, today: ClassId, period_days: u64) -> u128 {
        self.iter()
            .filter(|(class, _)| !class.is_expired(today, period_days))
            .map(|(_, value)| value)
            .sum()
    }

    /// Sum of entries in classes expired as of `today`.
    pub fn expired_balance(&self, today: ClassId, period_days: u64) -> u128 {
        self.iter()
            .filter(|(class, _)| class.is_expired(today, period_days))
            .map(|(_, value)| value)
            .sum()
    }

    /// Add `quantity` to the entry for `class`, creating it (and
    /// appending to the class index) on first touch. Returns the new
    /// entry value; `None` on entry overflow, with nothing changed.
    pub(crate) fn credit(&mut self, class: ClassId, quantity: u128) -> Option<u128> {
        let current = self.entries.get(&class).copied().unwrap_or(0);
        let updated = current.checked_add(quantity)?;
        if !self.entries.contains_key(&class) {
            self.classes.push(class);
        }
        self.entries.insert(class, updated);
        Some(updated)
    }

    /// Remove `quantity` from the entry for `class`. Underflow means
    /// the caller's validation was wrong and is reported as `None`
    /// rather than a clamp; the class index entry stays (append-only).
    pub(crate) fn debit(&mut self, class: ClassId, quantity: u128) -> Option<u128> {
        let entry = self.entries.get_mut(&class)?;
        let updated = entry.checked_sub(quantity)?;
        *entry = updated;
        Some(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_creates_entry_once() {
        let mut account = HolderAccount::new();
        account.credit(ClassId(10), 100).unwrap();
        account.credit(ClassId(10), 50).unwrap();
        assert_eq!(account.entry(ClassId(10)), 150);
        assert_eq!(account.class_count(), 1);
    }

    #[test]
    fn class_index_is_ascending_and_deduplicated() {
        let mut account = HolderAccount::new();
        account.credit(ClassId(1), 10).unwrap();
        account.credit(ClassId(3), 10).unwrap();
        account.credit(ClassId(3), 10).unwrap();
        account.credit(ClassId(7), 10).unwrap();
        let classes: Vec<_> = account.iter().map(|(c, _)| c).collect();
        assert_eq!(classes, vec![ClassId(1), ClassId(3), ClassId(7)]);
    }

    #[test]
    fn zeroed_entry_stays_in_the_index() {
        let mut account = HolderAccount::new();
        account.credit(ClassId(5), 100).unwrap();
        account.debit(ClassId(5), 100).unwrap();
        assert_eq!(account.entry(ClassId(5)), 0);
        assert_eq!(account.class_count(), 1);
        assert_eq!(account.class_at(0), Some(ClassId(5)));
    }

    #[test]
    fn debit_beyond_entry_is_rejected_not_clamped() {
        let mut account = HolderAccount::new();
        account.credit(ClassId(5), 100).unwrap();
        assert!(account.debit(ClassId(5), 101).is_none());
        assert_eq!(account.entry(ClassId(5)), 100);
    }

    #[test]
    fn live_and_expired_partition_the_total_held() {
        let mut account = HolderAccount::new();
        account.credit(ClassId(100), 100).unwrap();
        account.credit(ClassId(115), 200).unwrap();
        let today = ClassId(135);
        // Day-100 class is 35 days old (> 30), day-115 is 20 days old.
        assert_eq!(account.live_balance(today, 30), 200);
        assert_eq!(account.expired_balance(today, 30), 100);
        assert_eq!(
            account.live_balance(today, 30) + account.expired_balance(today, 30),
            account.total_held()
        );
    }

    #[test]
    fn partition_holds_after_debits() {
        let mut account = HolderAccount::new();
        account.credit(ClassId(100), 100).unwrap();
        account.credit(ClassId(115), 200).unwrap();
        account.debit(ClassId(100), 40).unwrap();
        let today = ClassId(135);
        assert_eq!(
            account.live_balance(today, 30) + account.expired_balance(today, 30),
            account.total_held()
        );
        assert_eq!(account.total_held(), 260);
    }

    #[test]
    fn entry_overflow_leaves_account_unchanged() {
        let mut account = HolderAccount::new();
        account.credit(ClassId(1), u128::MAX).unwrap();
        assert!(account.credit(ClassId(1), 1).is_none());
        assert_eq!(account.entry(ClassId(1)), u128::MAX);
        assert_eq!(account.class_count(), 1);
    }

    #[test]
    fn class_at_out_of_range() {
        let account = HolderAccount::new();
        assert_eq!(account.class_at(0), None);
    }
}
