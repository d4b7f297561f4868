use crate::order::{ExecutionReport, Order, OrderError, OrderId, OrderInfo, SequencedOrderRecord, Session};
use std::sync::Arc;

/// The operations every order execution layer exposes.
///
/// The admission pipeline, the internal matcher and the external venue
/// connection all implement this trait so they can be stacked on top of one
/// another.
pub trait ExecutionDriver: Send + Sync {
    /// Submit an order and return the handle its reports are published on.
    fn submit(&self, info: &OrderInfo) -> Arc<Order>;

    /// Request cancellation of an order.
    fn cancel(&self, session: &Session, order_id: OrderId);

    /// Deliver an externally produced execution report.
    fn update(&self, session: &Session, order_id: OrderId, report: ExecutionReport);

    /// Rebuild an order from storage without re-running admission.
    fn recover(&self, record: &SequencedOrderRecord) -> Result<Arc<Order>, OrderError>;

    /// Stop accepting work and release background resources.
    fn close(&self) {}
}
