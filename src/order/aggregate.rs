//! The order aggregate: an order's identity plus the reports produced for it.

use super::error::OrderError;
use super::report::ExecutionReport;
use super::status::OrderStatus;
use super::types::{OrderId, OrderInfo, Quantity};
use crossbeam::channel::{Receiver, unbounded};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::trace;

type Monitor = Box<dyn FnMut(&ExecutionReport) + Send>;

/// A persisted order together with the reports stored for it, used to
/// rehydrate orders after a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencedOrderRecord {
    /// Sequence assigned by the storage layer
    pub sequence: u64,
    /// The order as submitted
    pub info: OrderInfo,
    /// Every report stored for the order, in sequence order
    pub reports: Vec<ExecutionReport>,
}

struct OrderState {
    reports: Vec<ExecutionReport>,
    status: OrderStatus,
    /// Status to restore if a pending cancel is rejected
    status_before_cancel: Option<OrderStatus>,
    remaining: Quantity,
    monitors: Vec<Monitor>,
}

impl OrderState {
    fn validate(&self, info: &OrderInfo, report: &ExecutionReport) -> Result<(), OrderError> {
        let order_id = info.order_id;
        if report.id != order_id {
            return Err(OrderError::WrongOrder {
                expected: order_id,
                received: report.id,
            });
        }
        let expected = self.reports.last().map_or(0, |last| last.sequence + 1);
        if report.sequence < expected {
            return Err(OrderError::DuplicateReport {
                order_id,
                sequence: report.sequence,
            });
        }
        if report.sequence != expected {
            return Err(OrderError::SequenceGap {
                order_id,
                expected,
                received: report.sequence,
            });
        }
        if self.status.is_terminal() {
            return Err(OrderError::AlreadyTerminal {
                order_id,
                status: self.status,
            });
        }
        if report.status != OrderStatus::Rejected && report.last_quantity > self.remaining {
            return Err(OrderError::Overfill {
                order_id,
                remaining: self.remaining,
                last_quantity: report.last_quantity,
            });
        }
        Ok(())
    }

    fn apply(&mut self, report: ExecutionReport) {
        if report.status != OrderStatus::Rejected {
            self.remaining -= report.last_quantity;
        }
        match report.status {
            OrderStatus::PendingCancel => {
                if self.status != OrderStatus::PendingCancel {
                    self.status_before_cancel = Some(self.status);
                }
                self.status = OrderStatus::PendingCancel;
            }
            OrderStatus::CancelReject => {
                if let Some(previous) = self.status_before_cancel.take() {
                    self.status = previous;
                }
            }
            status => {
                self.status_before_cancel = None;
                self.status = status;
            }
        }
        self.reports.push(report);
    }
}

/// Owns an order's immutable [`OrderInfo`] and the ordered sequence of
/// [`ExecutionReport`]s produced for it.
///
/// Status and remaining quantity are derived from the reports. Monitors are
/// invoked synchronously, under the order's lock, for every report applied.
pub struct Order {
    info: OrderInfo,
    state: Mutex<OrderState>,
}

impl Order {
    /// Create an order holding its initial PENDING_NEW report.
    pub fn new(info: OrderInfo, timestamp: u64) -> Arc<Self> {
        let initial = ExecutionReport::initial(info.order_id, timestamp);
        let remaining = info.fields.quantity;
        Arc::new(Self {
            info,
            state: Mutex::new(OrderState {
                reports: vec![initial],
                status: OrderStatus::PendingNew,
                status_before_cancel: None,
                remaining,
                monitors: Vec::new(),
            }),
        })
    }

    /// Rebuild an order from a stored record, validating every report.
    pub fn recover(record: &SequencedOrderRecord) -> Result<Arc<Self>, OrderError> {
        let info = record.info.clone();
        let order_id = info.order_id;
        let remaining = info.fields.quantity;
        let order = Arc::new(Self {
            info,
            state: Mutex::new(OrderState {
                reports: Vec::with_capacity(record.reports.len()),
                status: OrderStatus::PendingNew,
                status_before_cancel: None,
                remaining,
                monitors: Vec::new(),
            }),
        });
        if record.reports.is_empty() {
            return Err(OrderError::EmptyRecord { order_id });
        }
        for report in &record.reports {
            order.update(report.clone())?;
        }
        Ok(order)
    }

    /// The order's submission info.
    pub fn info(&self) -> &OrderInfo {
        &self.info
    }

    /// The order's id.
    pub fn id(&self) -> OrderId {
        self.info.order_id
    }

    /// Current status, folded over all reports.
    pub fn status(&self) -> OrderStatus {
        self.state.lock().status
    }

    /// Whether the order reached a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    /// Quantity minus everything filled so far.
    pub fn remaining_quantity(&self) -> Quantity {
        self.state.lock().remaining
    }

    /// Quantity filled so far.
    pub fn filled_quantity(&self) -> Quantity {
        self.info.fields.quantity - self.remaining_quantity()
    }

    /// A copy of every report applied so far.
    pub fn reports(&self) -> Vec<ExecutionReport> {
        self.state.lock().reports.clone()
    }

    /// The most recent report.
    pub fn last_report(&self) -> ExecutionReport {
        let state = self.state.lock();
        match state.reports.last() {
            Some(report) => report.clone(),
            None => ExecutionReport::initial(self.info.order_id, self.info.timestamp),
        }
    }

    /// Append a report after checking it continues the sequence.
    pub fn update(&self, report: ExecutionReport) -> Result<(), OrderError> {
        let mut state = self.state.lock();
        state.validate(&self.info, &report)?;
        trace!(
            "Order {}: applying report {} {} {}@{}",
            self.info.order_id,
            report.sequence,
            report.status,
            report.last_quantity,
            report.last_price
        );
        state.apply(report.clone());
        for monitor in state.monitors.iter_mut() {
            monitor(&report);
        }
        Ok(())
    }

    /// Build and append the next report atomically.
    ///
    /// `build` sees the last report applied so it can derive the next sequence
    /// without racing other writers. Returning `None` leaves the order as is.
    pub fn update_with<F>(&self, build: F) -> Result<Option<ExecutionReport>, OrderError>
    where
        F: FnOnce(OrderStatus, &ExecutionReport) -> Option<ExecutionReport>,
    {
        let mut state = self.state.lock();
        let last = match state.reports.last() {
            Some(last) => last.clone(),
            None => ExecutionReport::initial(self.info.order_id, self.info.timestamp),
        };
        let report = match build(state.status, &last) {
            Some(report) => report,
            None => return Ok(None),
        };
        state.validate(&self.info, &report)?;
        state.apply(report.clone());
        for monitor in state.monitors.iter_mut() {
            monitor(&report);
        }
        Ok(Some(report))
    }

    /// Replay every past report to `monitor`, then forward each new one.
    pub fn monitor<F>(&self, mut monitor: F)
    where
        F: FnMut(&ExecutionReport) + Send + 'static,
    {
        let mut state = self.state.lock();
        for report in &state.reports {
            monitor(report);
        }
        state.monitors.push(Box::new(monitor));
    }

    /// A channel receiving every past and future report.
    pub fn subscribe(&self) -> Receiver<ExecutionReport> {
        let (sender, receiver) = unbounded();
        self.monitor(move |report| {
            let _ = sender.send(report.clone());
        });
        receiver
    }
}

impl std::fmt::Debug for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Order")
            .field("info", &self.info)
            .field("status", &state.status)
            .field("remaining", &state.remaining)
            .field("reports", &state.reports.len())
            .finish()
    }
}
