//! Matcher error types

use crate::order::{OrderError, OrderId, Security};
use thiserror::Error;

/// Errors raised by the internal matcher and the execution drivers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatcherError {
    /// No best bid/offer is cached for the security, so no match can be priced
    #[error("No BBO quote available.")]
    NoQuote {
        /// Security that was being matched
        security: Security,
    },

    /// A resting order did not reach the awaited state in time
    #[error("timed out waiting for order {order_id} to become {awaiting}")]
    Timeout {
        /// Resting order being matched against
        order_id: OrderId,
        /// The state that was awaited
        awaiting: &'static str,
    },

    /// The driver has no order with this id
    #[error("order {order_id} not found")]
    UnknownOrder {
        /// Id that was looked up
        order_id: OrderId,
    },

    /// The matcher was closed before the request could be scheduled
    #[error("Matcher is closed.")]
    Closed,

    /// A report was refused by the order it targeted
    #[error(transparent)]
    Order(#[from] OrderError),
}
