//! Orders, their execution reports and the state machine folding one into the other.

mod aggregate;
mod error;
mod report;
mod status;
mod types;

pub use aggregate::{Order, SequencedOrderRecord};
pub use error::OrderError;
pub use report::ExecutionReport;
pub use status::OrderStatus;
pub use types::{
    Account, CurrencyId, Money, OrderFields, OrderId, OrderInfo, OrderType, Quantity, Security,
    Session, Tag, direction,
};
