use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of an order as reported by execution reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Submitted, not yet acknowledged
    PendingNew,
    /// Refused by a check or a venue
    Rejected,
    /// Acknowledged and working
    New,
    /// Some quantity filled
    PartiallyFilled,
    /// Completely filled
    Filled,
    /// Cancel requested, awaiting the venue
    PendingCancel,
    /// Cancel refused, the order keeps working
    CancelReject,
    /// Cancelled
    Canceled,
    /// Time in force elapsed
    Expired,
}

impl OrderStatus {
    /// No further execution report may follow a terminal status.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Rejected
                | OrderStatus::Filled
                | OrderStatus::Canceled
                | OrderStatus::Expired
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStatus::PendingNew => "PENDING_NEW",
            OrderStatus::Rejected => "REJECTED",
            OrderStatus::New => "NEW",
            OrderStatus::PartiallyFilled => "PARTIALLY_FILLED",
            OrderStatus::Filled => "FILLED",
            OrderStatus::PendingCancel => "PENDING_CANCEL",
            OrderStatus::CancelReject => "CANCEL_REJECT",
            OrderStatus::Canceled => "CANCELED",
            OrderStatus::Expired => "EXPIRED",
        };
        f.write_str(name)
    }
}
