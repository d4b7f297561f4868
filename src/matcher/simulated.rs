use super::driver::ExecutionDriver;
use super::error::MatcherError;
use crate::order::{
    ExecutionReport, Money, Order, OrderError, OrderId, OrderInfo, OrderStatus, Quantity,
    SequencedOrderRecord, Session,
};
use crate::utils::Clock;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, trace};

/// An in-memory stand-in for an external venue.
///
/// Orders are accepted and cancelled automatically unless configured
/// otherwise; fills, rejections and manual acknowledgements are driven by the
/// caller.
pub struct SimulatedExecutionDriver {
    clock: Arc<dyn Clock>,
    orders: DashMap<OrderId, Arc<Order>>,
    submissions: Mutex<Vec<OrderInfo>>,
    cancel_requests: Mutex<Vec<OrderId>>,
    auto_accept: AtomicBool,
    auto_cancel: AtomicBool,
}

impl SimulatedExecutionDriver {
    /// Create a driver that accepts and cancels orders as soon as asked.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            orders: DashMap::new(),
            submissions: Mutex::new(Vec::new()),
            cancel_requests: Mutex::new(Vec::new()),
            auto_accept: AtomicBool::new(true),
            auto_cancel: AtomicBool::new(true),
        }
    }

    /// Whether new orders are acknowledged with NEW on submission.
    pub fn set_auto_accept(&self, enabled: bool) {
        self.auto_accept.store(enabled, Ordering::SeqCst);
    }

    /// Whether cancel requests are honoured immediately.
    pub fn set_auto_cancel(&self, enabled: bool) {
        self.auto_cancel.store(enabled, Ordering::SeqCst);
    }

    /// Every order submitted so far, in submission order.
    pub fn submissions(&self) -> Vec<OrderInfo> {
        self.submissions.lock().clone()
    }

    /// Total quantity routed to this driver.
    pub fn routed_quantity(&self) -> Quantity {
        self.submissions
            .lock()
            .iter()
            .map(|info| info.fields.quantity)
            .sum()
    }

    /// Ids of every order a cancel was requested for.
    pub fn cancel_requests(&self) -> Vec<OrderId> {
        self.cancel_requests.lock().clone()
    }

    /// Look up an order submitted to this driver.
    pub fn order(&self, order_id: OrderId) -> Option<Arc<Order>> {
        self.orders.get(&order_id).map(|order| Arc::clone(order.value()))
    }

    /// Acknowledge an order with NEW.
    pub fn accept(&self, order_id: OrderId) -> Result<(), MatcherError> {
        self.publish(order_id, |status, last, timestamp| {
            (status == OrderStatus::PendingNew)
                .then(|| ExecutionReport::updated(last, OrderStatus::New, timestamp))
        })
    }

    /// Fill part or all of an order's remaining quantity.
    pub fn fill(
        &self,
        order_id: OrderId,
        quantity: Quantity,
        price: Money,
    ) -> Result<(), MatcherError> {
        let order = self.find(order_id)?;
        let status = if quantity >= order.remaining_quantity() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        self.publish(order_id, |_, last, timestamp| {
            Some(ExecutionReport::updated(last, status, timestamp).with_fill(quantity, price))
        })
    }

    /// Cancel an order as the venue would after a cancel request.
    pub fn cancel_order(&self, order_id: OrderId) -> Result<(), MatcherError> {
        self.publish(order_id, |status, last, timestamp| {
            (!status.is_terminal())
                .then(|| ExecutionReport::updated(last, OrderStatus::PendingCancel, timestamp))
        })?;
        self.publish(order_id, |status, last, timestamp| {
            (!status.is_terminal())
                .then(|| ExecutionReport::updated(last, OrderStatus::Canceled, timestamp))
        })
    }

    /// Reject an order with a reason.
    pub fn reject(&self, order_id: OrderId, reason: &str) -> Result<(), MatcherError> {
        self.publish(order_id, |status, last, timestamp| {
            (!status.is_terminal()).then(|| {
                ExecutionReport::updated(last, OrderStatus::Rejected, timestamp).with_text(reason)
            })
        })
    }

    fn find(&self, order_id: OrderId) -> Result<Arc<Order>, MatcherError> {
        self.order(order_id)
            .ok_or(MatcherError::UnknownOrder { order_id })
    }

    fn publish<F>(&self, order_id: OrderId, build: F) -> Result<(), MatcherError>
    where
        F: FnOnce(OrderStatus, &ExecutionReport, u64) -> Option<ExecutionReport>,
    {
        let order = self.find(order_id)?;
        let timestamp = self.clock.now();
        order.update_with(|status, last| build(status, last, timestamp))?;
        Ok(())
    }
}

impl ExecutionDriver for SimulatedExecutionDriver {
    fn submit(&self, info: &OrderInfo) -> Arc<Order> {
        let order = Order::new(info.clone(), info.timestamp);
        self.orders.insert(info.order_id, Arc::clone(&order));
        self.submissions.lock().push(info.clone());
        trace!(
            "Simulated driver: received {} {} {}@{}",
            info.order_id, info.fields.side, info.fields.quantity, info.fields.price
        );
        if self.auto_accept.load(Ordering::SeqCst) {
            if let Err(error) = self.accept(info.order_id) {
                error!("Simulated driver: accept of {} failed: {}", info.order_id, error);
            }
        }
        order
    }

    fn cancel(&self, _session: &Session, order_id: OrderId) {
        self.cancel_requests.lock().push(order_id);
        if !self.auto_cancel.load(Ordering::SeqCst) {
            return;
        }
        if let Err(error) = self.cancel_order(order_id) {
            trace!("Simulated driver: cancel of {} ignored: {}", order_id, error);
        }
    }

    fn update(&self, _session: &Session, order_id: OrderId, report: ExecutionReport) {
        let result = self
            .find(order_id)
            .and_then(|order| order.update(report).map_err(MatcherError::from));
        if let Err(error) = result {
            error!("Simulated driver: update of {} dropped: {}", order_id, error);
        }
    }

    fn recover(&self, record: &SequencedOrderRecord) -> Result<Arc<Order>, OrderError> {
        let order = Order::recover(record)?;
        self.orders.insert(order.id(), Arc::clone(&order));
        Ok(order)
    }
}
