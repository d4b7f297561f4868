//! Submission service error types

use crate::order::{OrderError, OrderId};
use thiserror::Error;

/// Errors returned by the [`OrderSubmissionService`](super::OrderSubmissionService).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// No order with this id was submitted or recovered through the service
    #[error("order {order_id} not found")]
    UnknownOrder {
        /// Id that was looked up
        order_id: OrderId,
    },

    /// A stored record could not be replayed
    #[error("recovery failed: {0}")]
    Recovery(#[from] OrderError),
}
