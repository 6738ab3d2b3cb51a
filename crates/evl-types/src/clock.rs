use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::class::ClassId;

/// Clock boundary producing the current day index.
///
/// Implementations must be non-decreasing: once a clock has reported a
/// day, it never reports an earlier one. Balance queries re-read the
/// clock on every call, so a holder's live balance can shrink purely
/// from elapsed time with no intervening mutation.
pub trait DayClock: Send + Sync {
    fn today(&self) -> ClassId;
}

/// Wall-clock day source backed by `SystemTime`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl DayClock for SystemClock {
    fn today(&self) -> ClassId {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        ClassId::from_unix_secs(secs)
    }
}

/// Manually driven day counter for tests and simulation.
///
/// `advance` and `set_day` use `fetch_max`, so the reported day never
/// moves backwards even under racing writers.
#[derive(Debug, Default)]
pub struct ManualClock {
    day: AtomicU64,
}

impl ManualClock {
    /// Start the clock at the given day.
    pub fn starting_at(day: ClassId) -> Self {
        Self {
            day: AtomicU64::new(day.0),
        }
    }

    /// Move the clock forward by `days`.
    pub fn advance(&self, days: u64) {
        let target = self.day.load(Ordering::SeqCst) + days;
        self.day.fetch_max(target, Ordering::SeqCst);
    }

    /// Set the clock to `day` if it is not already past it.
    pub fn set_day(&self, day: ClassId) {
        self.day.fetch_max(day.0, Ordering::SeqCst);
    }
}

impl DayClock for ManualClock {
    fn today(&self) -> ClassId {
        ClassId(self.day.load(Ordering::SeqCst))
    }
}
