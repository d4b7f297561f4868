use super::error::SubmissionCheckError;
use crate::order::{Order, OrderInfo};
use std::sync::Arc;

/// A reversible admission rule.
///
/// `submit` may reserve resources provisionally. Exactly one of `add` (the
/// order was admitted) or `reject` (a later check refused it) follows every
/// successful `submit`; `reject` must undo whatever `submit` reserved.
pub trait SubmissionCheck: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Validate the order, reserving whatever the check tracks.
    fn submit(&self, info: &OrderInfo) -> Result<(), SubmissionCheckError>;

    /// Called with the admitted order, including recovered ones that never
    /// went through `submit`.
    fn add(&self, _order: &Arc<Order>) {}

    /// Release what `submit` reserved.
    fn reject(&self, _info: &OrderInfo) {}
}
