//! Short-sale marking from pending asks versus the held position.

use super::error::{LedgerError, check_sequence};
use crate::order::{ExecutionReport, OrderFields, OrderId, Quantity, Security};
use pricelevel::Side;
use std::collections::HashMap;
use tracing::trace;

#[derive(Debug, Clone, Default)]
struct ShortingEntry {
    pending_ask: Quantity,
    position: i64,
}

#[derive(Debug, Clone)]
struct TrackedOrder {
    security: Security,
    side: Side,
    remaining: Quantity,
    short_sale: bool,
    last_sequence: Option<u64>,
}

/// Decides whether an ask must be marked as a short sale.
///
/// An ask is short the moment pending ask quantity exceeds the position. The
/// decision is taken once, at submission, and never revised by later fills.
/// Reports for unknown orders are ignored.
#[derive(Debug, Clone, Default)]
pub struct ShortingModel {
    orders: HashMap<OrderId, TrackedOrder>,
    entries: HashMap<Security, ShortingEntry>,
}

impl ShortingModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a submission and returns whether it is a short sale.
    pub fn submit(&mut self, id: OrderId, fields: &OrderFields) -> bool {
        if let Some(stale) = self.orders.remove(&id) {
            if stale.side == Side::Sell {
                let entry = self.entries.entry(stale.security).or_default();
                entry.pending_ask = entry.pending_ask.saturating_sub(stale.remaining);
            }
        }
        let entry = self.entries.entry(fields.security.clone()).or_default();
        let short_sale = match fields.side {
            Side::Buy => false,
            Side::Sell => {
                entry.pending_ask += fields.quantity;
                entry.pending_ask as i128 > entry.position as i128
            }
        };
        self.orders.insert(
            id,
            TrackedOrder {
                security: fields.security.clone(),
                side: fields.side,
                remaining: fields.quantity,
                short_sale,
                last_sequence: None,
            },
        );
        trace!(
            "Shorting: {} {} {} pending ask {} position {} short {}",
            id, fields.side, fields.quantity, entry.pending_ask, entry.position, short_sale
        );
        short_sale
    }

    /// Applies an execution report. Unknown orders are ignored; replayed or
    /// gapped reports are errors and leave the model untouched.
    pub fn update(&mut self, report: &ExecutionReport) -> Result<(), LedgerError> {
        let Some(order) = self.orders.get_mut(&report.id) else {
            trace!("Shorting: ignoring report for unknown order {}", report.id);
            return Ok(());
        };
        check_sequence(report.id, order.last_sequence, report.sequence)?;
        order.last_sequence = Some(report.sequence);
        let entry = self.entries.entry(order.security.clone()).or_default();
        let fill = report.last_quantity.min(order.remaining);
        order.remaining -= fill;
        match order.side {
            Side::Buy => entry.position += fill as i64,
            Side::Sell => {
                entry.position -= fill as i64;
                entry.pending_ask = entry.pending_ask.saturating_sub(fill);
            }
        }
        if report.status.is_terminal() {
            if order.side == Side::Sell {
                entry.pending_ask = entry.pending_ask.saturating_sub(order.remaining);
            }
            order.remaining = 0;
        }
        Ok(())
    }

    /// The marking decided when `id` was submitted.
    pub fn is_short_sale(&self, id: OrderId) -> Option<bool> {
        self.orders.get(&id).map(|order| order.short_sale)
    }

    /// Signed position in a security.
    pub fn position(&self, security: &Security) -> i64 {
        self.entries.get(security).map_or(0, |entry| entry.position)
    }

    /// Ask quantity submitted but not yet filled or terminated.
    pub fn pending_ask(&self, security: &Security) -> Quantity {
        self.entries
            .get(security)
            .map_or(0, |entry| entry.pending_ask)
    }
}
