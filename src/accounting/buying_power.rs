//! Worst-case exposure accounting per security and per currency.

use super::error::{LedgerError, check_sequence};
use crate::order::{
    CurrencyId, ExecutionReport, Money, OrderFields, OrderId, Quantity, Security, direction,
};
use pricelevel::Side;
use std::collections::HashMap;
use tracing::trace;

/// Decimal places every amount entering the ledger is rounded to. Sums of
/// amounts at a fixed scale are exact, so the incremental aggregate never
/// drifts from a recomputation.
pub const MONEY_SCALE: u32 = 6;

fn quantize(amount: Money) -> Money {
    amount.round_dp(MONEY_SCALE)
}

/// A pending order's claim on buying power.
#[derive(Debug, Clone)]
struct PendingEntry {
    id: OrderId,
    expected_price: Money,
    remaining: Quantity,
}

/// Pending orders and the running position for one security.
#[derive(Debug, Clone)]
struct SecurityExposure {
    currency: CurrencyId,
    /// Ascending by expected price
    asks: Vec<PendingEntry>,
    /// Descending by expected price
    bids: Vec<PendingEntry>,
    expenditure: Money,
    position: i64,
}

impl SecurityExposure {
    fn new(currency: CurrencyId) -> Self {
        Self {
            currency,
            asks: Vec::new(),
            bids: Vec::new(),
            expenditure: Money::ZERO,
            position: 0,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut Vec<PendingEntry> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    /// Notional of `entries` once the first `offset` shares are considered
    /// covered by the existing position.
    fn pending_notional(entries: &[PendingEntry], mut offset: Quantity) -> Money {
        let mut notional = Money::ZERO;
        for entry in entries {
            if offset == 0 {
                notional += Money::from(entry.remaining) * entry.expected_price;
            } else if entry.remaining < offset {
                offset -= entry.remaining;
            } else {
                notional += Money::from(entry.remaining - offset) * entry.expected_price;
                offset = 0;
            }
        }
        notional
    }

    /// The larger of the ask-side and bid-side exposure.
    fn worst_case(&self) -> Money {
        let (ask_exposure, bid_exposure) = if self.position >= 0 {
            (
                Self::pending_notional(&self.asks, self.position.unsigned_abs()),
                Self::pending_notional(&self.bids, 0) + self.expenditure,
            )
        } else {
            (
                Self::pending_notional(&self.asks, 0) - self.expenditure,
                Self::pending_notional(&self.bids, self.position.unsigned_abs()),
            )
        };
        ask_exposure.max(bid_exposure)
    }

    /// Books a fill against the position, releasing cost basis first when the
    /// fill reduces an existing position.
    fn apply_fill(&mut self, side: Side, quantity: Quantity, price: Money) {
        let mut remaining = quantity as i64;
        let reduces = match side {
            Side::Buy => self.position < 0,
            Side::Sell => self.position > 0,
        };
        if reduces {
            let delta = self.position.abs().min(remaining);
            let average_cost = quantize(self.expenditure / Money::from(self.position));
            self.expenditure -=
                Money::from(direction(side.opposite()) * delta) * average_cost;
            self.position += direction(side) * delta;
            remaining -= delta;
        }
        self.position += direction(side) * remaining;
        self.expenditure += Money::from(direction(side) * remaining) * price;
    }
}

#[derive(Debug, Clone)]
struct TrackedOrder {
    security: Security,
    side: Side,
    last_sequence: Option<u64>,
}

/// Tracks the buying power consumed by a series of orders.
///
/// The per-currency aggregate is maintained incrementally: a security's old
/// contribution is subtracted, the security is mutated, and the new
/// contribution added back. [`BuyingPowerModel::recompute`] rebuilds the same
/// figure from scratch.
#[derive(Debug, Clone, Default)]
pub struct BuyingPowerModel {
    orders: HashMap<OrderId, TrackedOrder>,
    securities: HashMap<Security, SecurityExposure>,
    buying_power: HashMap<CurrencyId, Money>,
}

impl BuyingPowerModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an order has been accounted for.
    pub fn has_order(&self, id: OrderId) -> bool {
        self.orders.contains_key(&id)
    }

    /// Buying power used in a currency.
    pub fn buying_power(&self, currency: &CurrencyId) -> Money {
        self.buying_power
            .get(currency)
            .copied()
            .unwrap_or(Money::ZERO)
    }

    /// Signed position held in a security.
    pub fn position(&self, security: &Security) -> i64 {
        self.securities
            .get(security)
            .map_or(0, |exposure| exposure.position)
    }

    /// Worst-case exposure summed from scratch over every security in `currency`.
    pub fn recompute(&self, currency: &CurrencyId) -> Money {
        self.securities
            .values()
            .filter(|exposure| &exposure.currency == currency)
            .map(SecurityExposure::worst_case)
            .sum()
    }

    /// Tracks a submission and returns the updated buying power for its currency.
    ///
    /// `expected_price` is the price the order is expected to trade at, which
    /// may differ from its limit.
    pub fn submit(&mut self, id: OrderId, fields: &OrderFields, expected_price: Money) -> Money {
        let expected_price = quantize(expected_price);
        if self.orders.contains_key(&id) {
            self.remove_pending(id);
        }
        let exposure = self
            .securities
            .entry(fields.security.clone())
            .or_insert_with(|| SecurityExposure::new(fields.currency.clone()));
        let buying_power = self
            .buying_power
            .entry(exposure.currency.clone())
            .or_insert(Money::ZERO);
        *buying_power -= exposure.worst_case();
        let side = fields.side;
        let entries = exposure.side_mut(side);
        let entry = PendingEntry {
            id,
            expected_price,
            remaining: fields.quantity,
        };
        let position = entries.partition_point(|existing| match side {
            Side::Sell => existing.expected_price < expected_price,
            Side::Buy => existing.expected_price > expected_price,
        });
        match entries.get_mut(position) {
            Some(slot) if slot.remaining == 0 => *slot = entry,
            _ => entries.insert(position, entry),
        }
        *buying_power += exposure.worst_case();
        self.orders.insert(
            id,
            TrackedOrder {
                security: fields.security.clone(),
                side,
                last_sequence: None,
            },
        );
        trace!(
            "Buying power: submitted {} {} {}@{} -> {}",
            id, side, fields.quantity, expected_price, buying_power
        );
        *buying_power
    }

    /// Updates the model with an execution report.
    ///
    /// A report for an order never submitted, or one that does not continue
    /// the order's sequence, is an error and leaves the model untouched.
    pub fn update(&mut self, report: &ExecutionReport) -> Result<(), LedgerError> {
        let order = self
            .orders
            .get_mut(&report.id)
            .ok_or(LedgerError::UnknownOrder {
                order_id: report.id,
            })?;
        check_sequence(report.id, order.last_sequence, report.sequence)?;
        order.last_sequence = Some(report.sequence);
        if !report.status.is_terminal() && report.last_quantity == 0 {
            return Ok(());
        }
        let (security, side) = (order.security.clone(), order.side);
        self.apply(
            report.id,
            &security,
            side,
            report.status.is_terminal(),
            report.last_quantity,
            report.last_price,
        );
        Ok(())
    }

    /// Releases an order's pending claim and forgets the order, the exact
    /// inverse of [`BuyingPowerModel::submit`] for an order that never filled.
    pub fn reject(&mut self, id: OrderId) -> Result<(), LedgerError> {
        if !self.orders.contains_key(&id) {
            return Err(LedgerError::UnknownOrder { order_id: id });
        }
        self.remove_pending(id);
        self.orders.remove(&id);
        trace!("Buying power: rejected {}", id);
        Ok(())
    }

    fn apply(
        &mut self,
        id: OrderId,
        security: &Security,
        side: Side,
        is_terminal: bool,
        last_quantity: Quantity,
        last_price: Money,
    ) {
        let Some(exposure) = self.securities.get_mut(security) else {
            return;
        };
        let buying_power = self
            .buying_power
            .entry(exposure.currency.clone())
            .or_insert(Money::ZERO);
        *buying_power -= exposure.worst_case();
        if let Some(entry) = exposure
            .side_mut(side)
            .iter_mut()
            .find(|entry| entry.id == id)
        {
            if is_terminal {
                entry.remaining = 0;
            } else {
                entry.remaining = entry.remaining.saturating_sub(last_quantity);
            }
        }
        if last_quantity != 0 {
            exposure.apply_fill(side, last_quantity, quantize(last_price));
        }
        *buying_power += exposure.worst_case();
        trace!(
            "Buying power: {} {} {}@{} -> {}",
            id, side, last_quantity, last_price, buying_power
        );
    }

    /// Drops an order's pending entry.
    fn remove_pending(&mut self, id: OrderId) {
        let Some(order) = self.orders.get(&id) else {
            return;
        };
        let Some(exposure) = self.securities.get_mut(&order.security) else {
            return;
        };
        let buying_power = self
            .buying_power
            .entry(exposure.currency.clone())
            .or_insert(Money::ZERO);
        *buying_power -= exposure.worst_case();
        exposure.side_mut(order.side).retain(|entry| entry.id != id);
        *buying_power += exposure.worst_case();
    }
}
