//! Ledger error types

use crate::order::{CurrencyId, OrderId};
use thiserror::Error;

/// Errors raised while feeding a ledger.
///
/// Every variant means the update was dropped and the ledger left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A report arrived for an order the ledger never saw submitted
    #[error("order {order_id} was never submitted to this ledger")]
    UnknownOrder {
        /// Id carried by the report
        order_id: OrderId,
    },

    /// The report's sequence was already applied
    #[error("report {sequence} for order {order_id} was already applied")]
    DuplicateReport {
        /// Order the report belongs to
        order_id: OrderId,
        /// Sequence that was replayed
        sequence: u64,
    },

    /// The report skips one or more sequence numbers
    #[error("sequence gap on order {order_id}: expected {expected}, received {received}")]
    SequenceGap {
        /// Order the report belongs to
        order_id: OrderId,
        /// The only acceptable next sequence
        expected: u64,
        /// Sequence carried by the report
        received: u64,
    },

    /// No exchange rate links the two currencies
    #[error("no exchange rate from {base} to {counter}")]
    CurrencyPairNotFound {
        /// Currency converted from
        base: CurrencyId,
        /// Currency converted to
        counter: CurrencyId,
    },
}

/// Checks that `received` is the next sequence after `last`, if any report was
/// applied before.
pub(crate) fn check_sequence(
    order_id: OrderId,
    last: Option<u64>,
    received: u64,
) -> Result<(), LedgerError> {
    match last {
        Some(last) if received <= last => Err(LedgerError::DuplicateReport {
            order_id,
            sequence: received,
        }),
        Some(last) if received != last + 1 => Err(LedgerError::SequenceGap {
            order_id,
            expected: last + 1,
            received,
        }),
        _ => Ok(()),
    }
}
