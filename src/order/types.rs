//! Order field definitions shared by every component of the core.

use pricelevel::{Side, TimeInForce};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Monetary amounts and prices.
pub type Money = Decimal;

/// Order and fill quantities. Signed positions use `i64`.
pub type Quantity = u64;

/// Globally unique order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The account an order is submitted on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Account(pub String);

impl Account {
    /// Create an account from its name.
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }

    /// The account's name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A traded instrument, identified by symbol and listing venue.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Security {
    /// Ticker symbol
    pub symbol: String,
    /// Listing venue code
    pub venue: String,
}

impl Security {
    /// Create a security from a symbol and its listing venue.
    pub fn new(symbol: &str, venue: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            venue: venue.to_string(),
        }
    }
}

impl fmt::Display for Security {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.symbol, self.venue)
    }
}

/// ISO-style currency code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CurrencyId(pub String);

impl CurrencyId {
    /// Create a currency from its code.
    pub fn new(code: &str) -> Self {
        Self(code.to_string())
    }
}

impl fmt::Display for CurrencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How an order is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    /// Executes at the limit price or better
    Limit,
    /// Executes at whatever price is available
    Market,
}

/// Auxiliary key/value pair attached to orders and reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    /// Tag key
    pub key: String,
    /// Tag value
    pub value: String,
}

impl Tag {
    /// Create a tag.
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

/// +1 for bids, -1 for asks.
pub fn direction(side: Side) -> i64 {
    match side {
        Side::Buy => 1,
        Side::Sell => -1,
    }
}

/// The fields a client fills in when submitting an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderFields {
    /// Account the order trades for
    pub account: Account,
    /// Instrument being traded
    pub security: Security,
    /// Currency the price is denominated in
    pub currency: CurrencyId,
    /// Limit or market
    pub order_type: OrderType,
    /// Bid (`Side::Buy`) or ask (`Side::Sell`)
    pub side: Side,
    /// Destination the order is routed to
    pub destination: String,
    /// Quantity requested
    pub quantity: Quantity,
    /// Limit price, only meaningful for limit orders
    pub price: Money,
    /// Time in force
    pub time_in_force: TimeInForce,
    /// Additional tags
    pub tags: Vec<Tag>,
}

impl OrderFields {
    /// Build a day limit order.
    pub fn limit(
        account: Account,
        security: Security,
        currency: CurrencyId,
        side: Side,
        destination: &str,
        quantity: Quantity,
        price: Money,
    ) -> Self {
        Self {
            account,
            security,
            currency,
            order_type: OrderType::Limit,
            side,
            destination: destination.to_string(),
            quantity,
            price,
            time_in_force: TimeInForce::Day,
            tags: Vec::new(),
        }
    }

    /// Build a day market order.
    pub fn market(
        account: Account,
        security: Security,
        currency: CurrencyId,
        side: Side,
        destination: &str,
        quantity: Quantity,
    ) -> Self {
        Self {
            account,
            security,
            currency,
            order_type: OrderType::Market,
            side,
            destination: destination.to_string(),
            quantity,
            price: Money::ZERO,
            time_in_force: TimeInForce::Day,
            tags: Vec::new(),
        }
    }

    /// Replace the time in force.
    pub fn with_time_in_force(mut self, time_in_force: TimeInForce) -> Self {
        self.time_in_force = time_in_force;
        self
    }

    /// Look up a tag value by key.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.key == key)
            .map(|tag| tag.value.as_str())
    }
}

/// An order's fields plus the identity assigned at submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderInfo {
    /// Immutable submission fields
    pub fields: OrderFields,
    /// Account that performed the submission, which may differ from the
    /// trading account
    pub submission_account: Account,
    /// Unique order id
    pub order_id: OrderId,
    /// Whether the order was marked as a short sale
    pub short_sale: bool,
    /// Submission time in milliseconds
    pub timestamp: u64,
}

impl OrderInfo {
    /// Assign identity to a set of fields.
    pub fn new(
        fields: OrderFields,
        submission_account: Account,
        order_id: OrderId,
        short_sale: bool,
        timestamp: u64,
    ) -> Self {
        Self {
            fields,
            submission_account,
            order_id,
            short_sale,
            timestamp,
        }
    }
}

/// The identity under which cancels and report deliveries are performed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Session {
    /// Account the session is logged in as
    pub account: Account,
}

impl Session {
    /// Create a session for an account.
    pub fn new(account: Account) -> Self {
        Self { account }
    }
}
