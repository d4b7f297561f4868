//! The chain of submission checks standing in front of the matcher.

use super::check::SubmissionCheck;
use super::error::SubmissionCheckError;
use crate::matcher::ExecutionDriver;
use crate::order::{
    ExecutionReport, Order, OrderError, OrderId, OrderInfo, OrderStatus, SequencedOrderRecord,
    Session,
};
use crate::utils::Clock;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Runs every check in order and forwards admitted orders to the next driver.
///
/// The first failing check stops the chain and every check that already
/// passed receives `reject`, newest first. The caller receives an order that
/// is already REJECTED with the failing check's reason. Admitted orders are
/// handed to every check's `add` once the downstream driver returned them.
pub struct AdmissionPipeline {
    checks: Vec<Arc<dyn SubmissionCheck>>,
    driver: Arc<dyn ExecutionDriver>,
    clock: Arc<dyn Clock>,
}

impl AdmissionPipeline {
    /// Create a pipeline with no checks in front of `driver`.
    pub fn new(driver: Arc<dyn ExecutionDriver>, clock: Arc<dyn Clock>) -> Self {
        Self {
            checks: Vec::new(),
            driver,
            clock,
        }
    }

    /// Append a check to the end of the chain.
    pub fn with_check(mut self, check: Arc<dyn SubmissionCheck>) -> Self {
        self.checks.push(check);
        self
    }

    /// Names of the checks, in evaluation order.
    pub fn check_names(&self) -> Vec<&str> {
        self.checks.iter().map(|check| check.name()).collect()
    }

    fn rejected(&self, info: &OrderInfo, reason: &SubmissionCheckError) -> Arc<Order> {
        let order = Order::new(info.clone(), info.timestamp);
        let timestamp = self.clock.now();
        let text = reason.to_string();
        let result = order.update_with(|_, last| {
            Some(ExecutionReport::updated(last, OrderStatus::Rejected, timestamp).with_text(&text))
        });
        if let Err(error) = result {
            error!("Admission: could not reject order {}: {}", info.order_id, error);
        }
        order
    }
}

impl ExecutionDriver for AdmissionPipeline {
    fn submit(&self, info: &OrderInfo) -> Arc<Order> {
        let mut passed: Vec<&Arc<dyn SubmissionCheck>> = Vec::with_capacity(self.checks.len());
        for check in &self.checks {
            if let Err(reason) = check.submit(info) {
                warn!(
                    "Admission: {} rejected order {}: {}",
                    check.name(),
                    info.order_id,
                    reason
                );
                for passed_check in passed.iter().rev() {
                    passed_check.reject(info);
                }
                return self.rejected(info, &reason);
            }
            passed.push(check);
        }
        debug!("Admission: order {} admitted", info.order_id);
        let order = self.driver.submit(info);
        for check in &self.checks {
            check.add(&order);
        }
        order
    }

    fn cancel(&self, session: &Session, order_id: OrderId) {
        self.driver.cancel(session, order_id);
    }

    fn update(&self, session: &Session, order_id: OrderId, report: ExecutionReport) {
        self.driver.update(session, order_id, report);
    }

    fn recover(&self, record: &SequencedOrderRecord) -> Result<Arc<Order>, OrderError> {
        let order = self.driver.recover(record)?;
        for check in &self.checks {
            check.add(&order);
        }
        Ok(order)
    }

    fn close(&self) {
        self.driver.close();
    }
}
