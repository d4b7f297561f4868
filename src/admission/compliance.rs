//! Compliance rules evaluated as one submission check.

use super::check::SubmissionCheck;
use super::error::SubmissionCheckError;
use crate::matcher::{compare_offers, offer_price};
use crate::order::{Account, Money, Order, OrderId, OrderInfo, Quantity, Security};
use parking_lot::Mutex;
use pricelevel::Side;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::trace;

/// A single compliance rule. Same contract as [`SubmissionCheck`], with the
/// failure expressed as a plain reason.
pub trait ComplianceRule: Send + Sync {
    /// Rule name, reported alongside the reason.
    fn name(&self) -> &str;

    /// Validate the order, reserving whatever the rule tracks.
    fn submit(&self, info: &OrderInfo) -> Result<(), String>;

    /// Called with every admitted or recovered order.
    fn add(&self, _order: &Arc<Order>) {}

    /// Release what `submit` reserved.
    fn reject(&self, _info: &OrderInfo) {}
}

/// Evaluates an ordered set of [`ComplianceRule`]s, rolling back the rules
/// that passed when a later one fails.
#[derive(Default)]
pub struct ComplianceCheck {
    rules: Vec<Arc<dyn ComplianceRule>>,
}

impl ComplianceCheck {
    /// Create a check with no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule.
    pub fn with_rule(mut self, rule: Arc<dyn ComplianceRule>) -> Self {
        self.rules.push(rule);
        self
    }
}

impl SubmissionCheck for ComplianceCheck {
    fn name(&self) -> &str {
        "compliance"
    }

    fn submit(&self, info: &OrderInfo) -> Result<(), SubmissionCheckError> {
        for (index, rule) in self.rules.iter().enumerate() {
            if let Err(reason) = rule.submit(info) {
                for passed in self.rules[..index].iter().rev() {
                    passed.reject(info);
                }
                return Err(SubmissionCheckError::Compliance {
                    rule: rule.name().to_string(),
                    reason,
                });
            }
        }
        Ok(())
    }

    fn add(&self, order: &Arc<Order>) {
        for rule in &self.rules {
            rule.add(order);
        }
    }

    fn reject(&self, info: &OrderInfo) {
        for rule in self.rules.iter().rev() {
            rule.reject(info);
        }
    }
}

/// Refuses orders in a fixed set of securities.
#[derive(Debug, Default)]
pub struct RestrictedSecuritiesRule {
    securities: HashSet<Security>,
}

impl RestrictedSecuritiesRule {
    /// Create a rule restricting `securities`.
    pub fn new<I: IntoIterator<Item = Security>>(securities: I) -> Self {
        Self {
            securities: securities.into_iter().collect(),
        }
    }
}

impl ComplianceRule for RestrictedSecuritiesRule {
    fn name(&self) -> &str {
        "restricted_securities"
    }

    fn submit(&self, info: &OrderInfo) -> Result<(), String> {
        if self.securities.contains(&info.fields.security) {
            return Err(format!("{} is restricted.", info.fields.security));
        }
        Ok(())
    }
}

/// Caps the quantity of a single order.
#[derive(Debug, Clone, Copy)]
pub struct MaxOrderQuantityRule {
    max_quantity: Quantity,
}

impl MaxOrderQuantityRule {
    /// Create a rule allowing at most `max_quantity` per order.
    pub fn new(max_quantity: Quantity) -> Self {
        Self { max_quantity }
    }
}

impl ComplianceRule for MaxOrderQuantityRule {
    fn name(&self) -> &str {
        "max_order_quantity"
    }

    fn submit(&self, info: &OrderInfo) -> Result<(), String> {
        if info.fields.quantity > self.max_quantity {
            return Err(format!(
                "Order quantity exceeds the maximum of {}.",
                self.max_quantity
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct LiveOrder {
    id: OrderId,
    side: Side,
    price: Money,
}

/// Prevents an account from crossing its own live orders on the opposite side.
#[derive(Default)]
pub struct OpposingOrderRule {
    live: Arc<Mutex<HashMap<(Account, Security), Vec<LiveOrder>>>>,
}

impl OpposingOrderRule {
    /// Create a rule with no live orders.
    pub fn new() -> Self {
        Self::default()
    }

    fn remove(
        live: &mut HashMap<(Account, Security), Vec<LiveOrder>>,
        key: &(Account, Security),
        id: OrderId,
    ) {
        if let Some(orders) = live.get_mut(key) {
            orders.retain(|order| order.id != id);
            if orders.is_empty() {
                live.remove(key);
            }
        }
    }
}

impl ComplianceRule for OpposingOrderRule {
    fn name(&self) -> &str {
        "opposing_order"
    }

    fn submit(&self, info: &OrderInfo) -> Result<(), String> {
        let fields = &info.fields;
        let price = offer_price(fields);
        let key = (fields.account.clone(), fields.security.clone());
        let mut live = self.live.lock();
        let orders = live.entry(key).or_default();
        let crossed = orders.iter().find(|order| {
            order.side != fields.side && compare_offers(fields.side, price, order.price).is_le()
        });
        if let Some(crossed) = crossed {
            return Err(format!(
                "Order would cross the account's own order {}.",
                crossed.id
            ));
        }
        orders.push(LiveOrder {
            id: info.order_id,
            side: fields.side,
            price,
        });
        Ok(())
    }

    fn add(&self, order: &Arc<Order>) {
        let info = order.info();
        let key = (info.fields.account.clone(), info.fields.security.clone());
        {
            let mut live = self.live.lock();
            let orders = live.entry(key.clone()).or_default();
            if !orders.iter().any(|live_order| live_order.id == info.order_id) {
                orders.push(LiveOrder {
                    id: info.order_id,
                    side: info.fields.side,
                    price: offer_price(&info.fields),
                });
            }
        }
        let live = Arc::clone(&self.live);
        let id = info.order_id;
        order.monitor(move |report| {
            if report.status.is_terminal() {
                trace!("Opposing order: {} no longer live", id);
                Self::remove(&mut live.lock(), &key, id);
            }
        });
    }

    fn reject(&self, info: &OrderInfo) {
        let key = (info.fields.account.clone(), info.fields.security.clone());
        Self::remove(&mut self.live.lock(), &key, info.order_id);
    }
}
