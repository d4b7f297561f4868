use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current time in milliseconds since UNIX epoch
pub fn current_time_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

/// Source of timestamps for orders and execution reports.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since UNIX epoch.
    fn now(&self) -> u64;
}

/// Wall clock backed by [`current_time_millis`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        current_time_millis()
    }
}

/// A clock that only moves when told to. Every reading advances it by `step`
/// so consecutive timestamps stay distinct.
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicU64,
    step: u64,
}

impl ManualClock {
    /// Create a clock starting at `start`, advancing by `step` per reading.
    pub fn new(start: u64, step: u64) -> Self {
        Self {
            now: AtomicU64::new(start),
            step,
        }
    }

    /// Jump the clock to an absolute time.
    pub fn set(&self, timestamp: u64) {
        self.now.store(timestamp, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.fetch_add(self.step, Ordering::SeqCst)
    }
}
