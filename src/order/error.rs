//! Order aggregate error types

use super::status::OrderStatus;
use super::types::{OrderId, Quantity};
use thiserror::Error;

/// Protocol violations detected while applying execution reports to an order.
///
/// These indicate a bug in whichever collaborator produced the report; the
/// offending report is dropped and the order is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// The report is addressed to another order
    #[error("report for order {received} delivered to order {expected}")]
    WrongOrder {
        /// Id of the order being updated
        expected: OrderId,
        /// Id carried by the report
        received: OrderId,
    },

    /// The report's sequence was already applied
    #[error("duplicate report {sequence} for order {order_id}")]
    DuplicateReport {
        /// Order being updated
        order_id: OrderId,
        /// Sequence that was replayed
        sequence: u64,
    },

    /// The report skips one or more sequence numbers
    #[error("sequence gap on order {order_id}: expected {expected}, received {received}")]
    SequenceGap {
        /// Order being updated
        order_id: OrderId,
        /// The only acceptable next sequence
        expected: u64,
        /// Sequence carried by the report
        received: u64,
    },

    /// The order already reached a terminal status
    #[error("order {order_id} is already {status}")]
    AlreadyTerminal {
        /// Order being updated
        order_id: OrderId,
        /// Terminal status reached earlier
        status: OrderStatus,
    },

    /// The fill exceeds what is left of the order
    #[error("fill of {last_quantity} exceeds remaining {remaining} on order {order_id}")]
    Overfill {
        /// Order being updated
        order_id: OrderId,
        /// Quantity still open before the report
        remaining: Quantity,
        /// Quantity the report claims to fill
        last_quantity: Quantity,
    },

    /// A recovered record has no reports at all
    #[error("record for order {order_id} has no execution reports")]
    EmptyRecord {
        /// Order being recovered
        order_id: OrderId,
    },
}
