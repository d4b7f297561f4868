use super::status::OrderStatus;
use super::types::{Money, OrderId, Quantity, Tag};
use serde::{Deserialize, Serialize};

/// An immutable event describing one change to an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Order the report belongs to
    pub id: OrderId,
    /// Time the report was produced, in milliseconds
    pub timestamp: u64,
    /// Position of this report in the order's report stream, starting at 0
    pub sequence: u64,
    /// Status after this report
    pub status: OrderStatus,
    /// Quantity filled by this report
    pub last_quantity: Quantity,
    /// Price of the fill, if any
    pub last_price: Money,
    /// Liquidity flag assigned by the venue or the internal matcher
    pub liquidity_flag: String,
    /// Market the fill happened on
    pub last_market: String,
    /// Fee charged by the execution venue
    pub execution_fee: Money,
    /// Fee charged for processing
    pub processing_fee: Money,
    /// Broker commission
    pub commission: Money,
    /// Free text, e.g. a rejection reason
    pub text: String,
    /// Additional tags
    pub tags: Vec<Tag>,
}

impl ExecutionReport {
    /// The PENDING_NEW report every order starts with.
    pub fn initial(id: OrderId, timestamp: u64) -> Self {
        Self {
            id,
            timestamp,
            sequence: 0,
            status: OrderStatus::PendingNew,
            last_quantity: 0,
            last_price: Money::ZERO,
            liquidity_flag: String::new(),
            last_market: String::new(),
            execution_fee: Money::ZERO,
            processing_fee: Money::ZERO,
            commission: Money::ZERO,
            text: String::new(),
            tags: Vec::new(),
        }
    }

    /// The report following `previous` with a new status and no fill.
    pub fn updated(previous: &ExecutionReport, status: OrderStatus, timestamp: u64) -> Self {
        Self {
            sequence: previous.sequence + 1,
            status,
            ..Self::initial(previous.id, timestamp)
        }
    }

    /// Attach a fill.
    pub fn with_fill(mut self, last_quantity: Quantity, last_price: Money) -> Self {
        self.last_quantity = last_quantity;
        self.last_price = last_price;
        self
    }

    /// Attach free text.
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    /// Sum of all fees on this report.
    pub fn total_fees(&self) -> Money {
        self.execution_fee + self.processing_fee + self.commission
    }

    /// Look up a tag value by key.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.key == key)
            .map(|tag| tag.value.as_str())
    }
}
