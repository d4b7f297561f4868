use super::check::SubmissionCheck;
use super::error::SubmissionCheckError;
use crate::order::{
    Account, ExecutionReport, Order, OrderFields, OrderId, OrderInfo, Quantity, Security,
    direction,
};
use dashmap::DashMap;
use parking_lot::Mutex;
use pricelevel::Side;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// What an account is currently allowed to submit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskState {
    /// Any order
    #[default]
    Active,
    /// Only orders reducing an open position
    CloseOrders,
    /// Nothing
    Disabled,
}

impl fmt::Display for RiskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskState::Active => write!(f, "ACTIVE"),
            RiskState::CloseOrders => write!(f, "CLOSE_ORDERS"),
            RiskState::Disabled => write!(f, "DISABLED"),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct PendingQuantity {
    bids: Quantity,
    asks: Quantity,
}

impl PendingQuantity {
    fn side_mut(&mut self, side: Side) -> &mut Quantity {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }
}

#[derive(Debug)]
struct TrackedOrder {
    security: Security,
    side: Side,
    remaining: Quantity,
}

/// Positions and unfilled quantity per security for one account.
#[derive(Debug, Default)]
struct AccountPositions {
    positions: HashMap<Security, i64>,
    pending: HashMap<Security, PendingQuantity>,
    orders: HashMap<OrderId, TrackedOrder>,
}

impl AccountPositions {
    fn position(&self, security: &Security) -> i64 {
        self.positions.get(security).copied().unwrap_or(0)
    }

    /// Whether the order reduces the position without overshooting it once
    /// every other pending order on the same side fills.
    fn closes(&self, fields: &OrderFields) -> bool {
        let position = self.position(&fields.security);
        let pending = self
            .pending
            .get(&fields.security)
            .copied()
            .unwrap_or_default();
        let (open, already_closing) = match fields.side {
            Side::Sell if position > 0 => (position.unsigned_abs(), pending.asks),
            Side::Buy if position < 0 => (position.unsigned_abs(), pending.bids),
            _ => return false,
        };
        already_closing + fields.quantity <= open
    }

    fn reserve(&mut self, id: OrderId, fields: &OrderFields, quantity: Quantity) {
        *self
            .pending
            .entry(fields.security.clone())
            .or_default()
            .side_mut(fields.side) += quantity;
        self.orders.insert(
            id,
            TrackedOrder {
                security: fields.security.clone(),
                side: fields.side,
                remaining: quantity,
            },
        );
    }

    fn release(&mut self, id: OrderId) {
        if let Some(order) = self.orders.remove(&id) {
            let pending = self.pending.entry(order.security).or_default().side_mut(order.side);
            *pending = pending.saturating_sub(order.remaining);
        }
    }

    fn apply(&mut self, report: &ExecutionReport) {
        let Some(order) = self.orders.get_mut(&report.id) else {
            return;
        };
        let fill = report.last_quantity.min(order.remaining);
        order.remaining -= fill;
        let pending = self
            .pending
            .entry(order.security.clone())
            .or_default()
            .side_mut(order.side);
        *pending = pending.saturating_sub(fill);
        *self.positions.entry(order.security.clone()).or_insert(0) +=
            direction(order.side) * fill as i64;
        if report.status.is_terminal() {
            self.release(report.id);
        }
    }
}

/// Gates submissions on the account's [`RiskState`].
///
/// Positions are built from the fills of the orders this check admitted, so
/// CLOSE_ORDERS can tell whether an order reduces exposure.
#[derive(Default)]
pub struct RiskStateCheck {
    states: DashMap<Account, RiskState>,
    accounts: DashMap<Account, Arc<Mutex<AccountPositions>>>,
}

impl RiskStateCheck {
    /// Create a check with every account ACTIVE.
    pub fn new() -> Self {
        Self::default()
    }

    /// Change an account's state.
    pub fn set_state(&self, account: &Account, state: RiskState) {
        debug!("Risk state: {} is now {}", account, state);
        self.states.insert(account.clone(), state);
    }

    /// An account's current state.
    pub fn state(&self, account: &Account) -> RiskState {
        self.states.get(account).map_or_else(RiskState::default, |state| *state)
    }

    /// The position this check has observed for an account.
    pub fn position(&self, account: &Account, security: &Security) -> i64 {
        self.accounts
            .get(account)
            .map_or(0, |positions| positions.lock().position(security))
    }

    fn positions(&self, account: &Account) -> Arc<Mutex<AccountPositions>> {
        Arc::clone(self.accounts.entry(account.clone()).or_default().value())
    }
}

impl SubmissionCheck for RiskStateCheck {
    fn name(&self) -> &str {
        "risk_state"
    }

    fn submit(&self, info: &OrderInfo) -> Result<(), SubmissionCheckError> {
        let fields = &info.fields;
        let state = self.state(&fields.account);
        if state == RiskState::Disabled {
            return Err(SubmissionCheckError::AccountDisabled);
        }
        let positions = self.positions(&fields.account);
        let mut positions = positions.lock();
        if state == RiskState::CloseOrders && !positions.closes(fields) {
            return Err(SubmissionCheckError::CloseOrdersOnly);
        }
        positions.reserve(info.order_id, fields, fields.quantity);
        trace!("Risk state: reserved {} for order {}", fields.quantity, info.order_id);
        Ok(())
    }

    fn add(&self, order: &Arc<Order>) {
        let info = order.info();
        let positions = self.positions(&info.fields.account);
        {
            let mut positions = positions.lock();
            if !positions.orders.contains_key(&info.order_id) {
                positions.reserve(info.order_id, &info.fields, info.fields.quantity);
            }
        }
        order.monitor(move |report| positions.lock().apply(report));
    }

    fn reject(&self, info: &OrderInfo) {
        self.positions(&info.fields.account)
            .lock()
            .release(info.order_id);
    }
}
