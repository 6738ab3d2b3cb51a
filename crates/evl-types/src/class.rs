use std::fmt;

use serde::{Deserialize, Serialize};

/// Seconds per day used to map wall-clock time to class ids.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Day-indexed asset class identifier.
///
/// Every unit of value minted on a given day belongs to that day's class:
/// `ClassId(floor(unix_secs / 86_400))`. The class id is a key, not a
/// stored record; two classes are equal iff their day indices are equal.
/// All value in a class shares one expiration clock, started at the
/// class's own day.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ClassId(pub u64);

impl ClassId {
    /// The class for a given UNIX timestamp (seconds).
    pub fn from_unix_secs(secs: u64) -> Self {
        Self(secs / SECONDS_PER_DAY)
    }

    /// The raw day index.
    pub fn day(&self) -> u64 {
        self.0
    }

    /// Whether this class is expired as of `today`, under an expiration
    /// period of `period_days`.
    ///
    /// A class expires strictly after `period_days` whole days have
    /// elapsed: on day `class + period_days` it is still live, on day
    /// `class + period_days + 1` it is expired. A `today` earlier than
    /// the class (a clock that has not caught up) never counts as
    /// expired.
    pub fn is_expired(&self, today: ClassId, period_days: u64) -> bool {
        match today.0.checked_sub(self.0) {
            Some(age) => age > period_days,
            None => false,
        }
    }

    /// The class `days` after this one.
    pub fn plus_days(&self, days: u64) -> Self {
        Self(self.0 + days)
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId(d{})", self.0)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_unix_secs_floors() {
        assert_eq!(ClassId::from_unix_secs(0), ClassId(0));
        assert_eq!(ClassId::from_unix_secs(86_399), ClassId(0));
        assert_eq!(ClassId::from_unix_secs(86_400), ClassId(1));
        assert_eq!(ClassId::from_unix_secs(1_700_000_000), ClassId(19_675));
    }

    #[test]
    fn live_through_the_full_period() {
        let class = ClassId(100);
        assert!(!class.is_expired(ClassId(100), 30));
        assert!(!class.is_expired(ClassId(115), 30));
        // Exactly period_days old: still live.
        assert!(!class.is_expired(ClassId(130), 30));
    }

    #[test]
    fn expired_strictly_after_the_period() {
        let class = ClassId(100);
        assert!(class.is_expired(ClassId(131), 30));
        assert!(class.is_expired(ClassId(1_000), 30));
    }

    #[test]
    fn future_class_is_not_expired() {
        // A class from "tomorrow" relative to a lagging clock.
        let class = ClassId(200);
        assert!(!class.is_expired(ClassId(199), 30));
    }

    #[test]
    fn zero_period_expires_next_day() {
        let class = ClassId(50);
        assert!(!class.is_expired(ClassId(50), 0));
        assert!(class.is_expired(ClassId(51), 0));
    }

    #[test]
    fn ordering_follows_day_index() {
        assert!(ClassId(1) < ClassId(2));
        assert_eq!(ClassId(7), ClassId(7));
    }

    #[test]
    fn serde_roundtrip() {
        let class = ClassId(19_675);
        let json = serde_json::to_string(&class).unwrap();
        let parsed: ClassId = serde_json::from_str(&json).unwrap();
        assert_eq!(class, parsed);
    }

    #[test]
    fn display_format() {
        assert_eq!(format!("{}", ClassId(42)), "d42");
    }

    proptest::proptest! {
        #[test]
        fn expiry_flips_exactly_once(
            class in 0u64..100_000,
            period in 0u64..1_000,
            age in 0u64..2_000,
        ) {
            let today = ClassId(class + age);
            let expired = ClassId(class).is_expired(today, period);
            proptest::prop_assert_eq!(expired, age > period);
        }
    }
}
