use crate::order::OrderId;
use std::sync::atomic::{AtomicU64, Ordering};

/// Issues globally unique order ids.
pub trait IdentitySource: Send + Sync {
    /// The next unused order id.
    fn next_order_id(&self) -> OrderId;
}

/// Hands out monotonically increasing ids from an atomic counter.
#[derive(Debug)]
pub struct SequentialIdentitySource {
    next: AtomicU64,
}

impl SequentialIdentitySource {
    /// Create a source whose first id is `first`.
    pub fn new(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialIdentitySource {
    fn default() -> Self {
        Self::new(1)
    }
}

impl IdentitySource for SequentialIdentitySource {
    fn next_order_id(&self) -> OrderId {
        OrderId(self.next.fetch_add(1, Ordering::SeqCst))
    }
}
