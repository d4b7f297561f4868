//! Resting orders held by the internal matcher and their price/time ordering.

use super::latch::Latch;
use crate::order::{Money, Order, OrderFields, OrderId, OrderInfo, OrderType, Quantity, Security};
use parking_lot::Mutex;
use pricelevel::Side;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// The price an order offers for matching purposes. Market orders offer the
/// most aggressive price their side can.
pub fn offer_price(fields: &OrderFields) -> Money {
    match (fields.order_type, fields.side) {
        (OrderType::Limit, _) => fields.price,
        (OrderType::Market, Side::Sell) => Money::ZERO,
        (OrderType::Market, Side::Buy) => Money::MAX,
    }
}

/// Compares two prices from the point of view of `side`: `Less` means `lhs`
/// is the more aggressive offer (higher for bids, lower for asks).
pub fn compare_offers(side: Side, lhs: Money, rhs: Money) -> Ordering {
    match side {
        Side::Buy => rhs.cmp(&lhs),
        Side::Sell => lhs.cmp(&rhs),
    }
}

pub(crate) struct RestingState {
    /// The order currently working at the external driver, if any
    pub(crate) driver_order: Option<Arc<Order>>,
    /// Set until the first non-PENDING_NEW report reaches the client
    pub(crate) pending_new: bool,
    pub(crate) remaining: Quantity,
}

/// An admitted order as seen by the matcher: the client-facing order plus the
/// bookkeeping for its external counterpart.
pub(crate) struct RestingOrder {
    pub(crate) info: OrderInfo,
    pub(crate) order: Arc<Order>,
    pub(crate) state: Mutex<RestingState>,
    /// Set while an internal match holds this order
    pub(crate) matching: AtomicBool,
    pub(crate) live: Latch,
    pub(crate) terminal: Latch,
}

impl RestingOrder {
    pub(crate) fn new(order: Arc<Order>) -> Self {
        let info = order.info().clone();
        let remaining = info.fields.quantity;
        Self {
            info,
            order,
            state: Mutex::new(RestingState {
                driver_order: None,
                pending_new: true,
                remaining,
            }),
            matching: AtomicBool::new(false),
            live: Latch::new(),
            terminal: Latch::new(),
        }
    }

    pub(crate) fn id(&self) -> OrderId {
        self.info.order_id
    }

    pub(crate) fn remaining(&self) -> Quantity {
        self.state.lock().remaining
    }

    /// Price, time, then id priority against another order on the same side.
    pub(crate) fn priority(&self, other: &RestingOrder) -> Ordering {
        compare_offers(
            self.info.fields.side,
            offer_price(&self.info.fields),
            offer_price(&other.info.fields),
        )
        .then(self.info.timestamp.cmp(&other.info.timestamp))
        .then(self.info.order_id.cmp(&other.info.order_id))
    }
}

/// Both sides of one security's resting book, best entry first.
#[derive(Default)]
pub(crate) struct BookSides {
    pub(crate) bids: Vec<Arc<RestingOrder>>,
    pub(crate) asks: Vec<Arc<RestingOrder>>,
}

impl BookSides {
    /// The side an order of `side` rests on, and the side it matches against.
    pub(crate) fn split_mut(
        &mut self,
        side: Side,
    ) -> (&mut Vec<Arc<RestingOrder>>, &mut Vec<Arc<RestingOrder>>) {
        match side {
            Side::Buy => (&mut self.bids, &mut self.asks),
            Side::Sell => (&mut self.asks, &mut self.bids),
        }
    }

    /// Insert keeping price/time/id priority.
    pub(crate) fn insert(&mut self, entry: Arc<RestingOrder>) {
        let (own, _) = self.split_mut(entry.info.fields.side);
        let position = own.partition_point(|existing| existing.priority(&entry) == Ordering::Less);
        own.insert(position, entry);
    }
}

/// One resting order in a [`BookSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestingOrderSnapshot {
    /// Client order id
    pub order_id: OrderId,
    /// Offer price used for priority
    pub price: Money,
    /// Quantity still available to match
    pub remaining: Quantity,
    /// Submission timestamp used as time priority
    pub timestamp: u64,
}

impl RestingOrderSnapshot {
    pub(crate) fn capture(entry: &RestingOrder) -> Self {
        Self {
            order_id: entry.id(),
            price: offer_price(&entry.info.fields),
            remaining: entry.remaining(),
            timestamp: entry.info.timestamp,
        }
    }
}

/// Point-in-time view of a security's resting book, best entries first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    /// Security the book belongs to
    pub security: Security,
    /// Resting bids, highest first
    pub bids: Vec<RestingOrderSnapshot>,
    /// Resting asks, lowest first
    pub asks: Vec<RestingOrderSnapshot>,
}

impl BookSnapshot {
    /// Total resting quantity on the bid side.
    pub fn bid_quantity(&self) -> Quantity {
        self.bids.iter().map(|entry| entry.remaining).sum()
    }

    /// Total resting quantity on the ask side.
    pub fn ask_quantity(&self) -> Quantity {
        self.asks.iter().map(|entry| entry.remaining).sum()
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
