use super::error::ServiceError;
use crate::accounting::ShortingModel;
use crate::matcher::ExecutionDriver;
use crate::order::{
    Account, ExecutionReport, Order, OrderFields, OrderId, OrderInfo, Security,
    SequencedOrderRecord, Session,
};
use crate::utils::{Clock, IdentitySource};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error, trace};

/// Accepts orders from client sessions.
///
/// Each submission gets a fresh id and timestamp and is marked as a short
/// sale when the account's pending asks exceed its position. The order then
/// runs through `driver`, normally an
/// [`AdmissionPipeline`](crate::admission::AdmissionPipeline) stacked on the
/// matcher. The shorting ledger follows every order's reports from then on.
pub struct OrderSubmissionService {
    identities: Arc<dyn IdentitySource>,
    clock: Arc<dyn Clock>,
    driver: Arc<dyn ExecutionDriver>,
    shorting: DashMap<Account, Arc<Mutex<ShortingModel>>>,
    orders: DashMap<OrderId, Arc<Order>>,
}

impl OrderSubmissionService {
    /// Create a service submitting to `driver`.
    pub fn new(
        identities: Arc<dyn IdentitySource>,
        clock: Arc<dyn Clock>,
        driver: Arc<dyn ExecutionDriver>,
    ) -> Self {
        Self {
            identities,
            clock,
            driver,
            shorting: DashMap::new(),
            orders: DashMap::new(),
        }
    }

    fn shorting_model(&self, account: &Account) -> Arc<Mutex<ShortingModel>> {
        Arc::clone(self.shorting.entry(account.clone()).or_default().value())
    }

    /// Submit an order on behalf of `session`.
    ///
    /// The returned order may already be REJECTED if a submission check
    /// refused it; the reason is in its last report's text.
    pub fn submit(&self, session: &Session, fields: OrderFields) -> Arc<Order> {
        let order_id = self.identities.next_order_id();
        let timestamp = self.clock.now();
        let model = self.shorting_model(&fields.account);
        let short_sale = model.lock().submit(order_id, &fields);
        let info = OrderInfo::new(fields, session.account.clone(), order_id, short_sale, timestamp);
        debug!(
            "Service: {} submits order {} {} {} {}{}",
            session.account,
            order_id,
            info.fields.side,
            info.fields.quantity,
            info.fields.security,
            if short_sale { " (short)" } else { "" }
        );
        let order = self.driver.submit(&info);
        Self::follow(&order, model);
        self.orders.insert(order_id, Arc::clone(&order));
        order
    }

    /// Request cancellation of an order submitted through this service.
    pub fn cancel(&self, session: &Session, order_id: OrderId) -> Result<(), ServiceError> {
        if !self.orders.contains_key(&order_id) {
            return Err(ServiceError::UnknownOrder { order_id });
        }
        trace!("Service: {} cancels order {}", session.account, order_id);
        self.driver.cancel(session, order_id);
        Ok(())
    }

    /// Forward an externally produced report for an order.
    pub fn update(
        &self,
        session: &Session,
        order_id: OrderId,
        report: ExecutionReport,
    ) -> Result<(), ServiceError> {
        if !self.orders.contains_key(&order_id) {
            return Err(ServiceError::UnknownOrder { order_id });
        }
        self.driver.update(session, order_id, report);
        Ok(())
    }

    /// Rebuild a stored order and resume tracking it. Submission checks are
    /// not run again.
    pub fn recover(&self, record: &SequencedOrderRecord) -> Result<Arc<Order>, ServiceError> {
        let order = self.driver.recover(record)?;
        let info = order.info();
        let model = self.shorting_model(&info.fields.account);
        model.lock().submit(info.order_id, &info.fields);
        Self::follow(&order, model);
        debug!("Service: recovered order {} as {}", info.order_id, order.status());
        self.orders.insert(info.order_id, Arc::clone(&order));
        Ok(order)
    }

    /// An order submitted or recovered through this service.
    pub fn order(&self, order_id: OrderId) -> Option<Arc<Order>> {
        self.orders.get(&order_id).map(|entry| Arc::clone(entry.value()))
    }

    /// Whether an order was marked as a short sale at submission.
    pub fn is_short_sale(&self, order_id: OrderId) -> Option<bool> {
        self.order(order_id).map(|order| order.info().short_sale)
    }

    /// The position the shorting ledger tracks for an account.
    pub fn position(&self, account: &Account, security: &Security) -> i64 {
        self.shorting
            .get(account)
            .map_or(0, |model| model.lock().position(security))
    }

    fn follow(order: &Arc<Order>, model: Arc<Mutex<ShortingModel>>) {
        order.monitor(move |report| {
            if let Err(error) = model.lock().update(report) {
                error!("Service: shorting ledger dropped report: {}", error);
            }
        });
    }
}
