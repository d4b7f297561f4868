use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// A resettable two-state flag, pending or resolved, that threads can wait on
/// with a deadline.
#[derive(Debug, Default)]
pub struct Latch {
    resolved: Mutex<bool>,
    condition: Condvar,
}

impl Latch {
    /// Create a pending latch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to resolved and wake every waiter. Resolving twice is a no-op.
    pub fn resolve(&self) {
        let mut resolved = self.resolved.lock();
        if *resolved {
            return;
        }
        *resolved = true;
        self.condition.notify_all();
    }

    /// Move back to pending.
    pub fn reset(&self) {
        *self.resolved.lock() = false;
    }

    /// Whether the latch is currently resolved.
    pub fn is_resolved(&self) -> bool {
        *self.resolved.lock()
    }

    /// Block until resolved or until `timeout` elapses. Returns whether the
    /// latch was resolved.
    pub fn wait_for(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut resolved = self.resolved.lock();
        while !*resolved {
            if self
                .condition
                .wait_until(&mut resolved, deadline)
                .timed_out()
            {
                return *resolved;
            }
        }
        true
    }
}
