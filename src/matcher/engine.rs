//! Internal crossing of incoming orders against resting ones before anything
//! is routed to the external driver.

use super::book::{
    BookSides, BookSnapshot, RestingOrder, RestingOrderSnapshot, compare_offers, offer_price,
};
use super::driver::ExecutionDriver;
use super::error::MatcherError;
use super::quotes::QuoteSource;
use super::report_builder::MatchReportBuilder;
use super::task_queue::TaskQueue;
use crate::order::{
    Account, ExecutionReport, Money, Order, OrderError, OrderFields, OrderId, OrderInfo,
    OrderStatus, OrderType, Quantity, SequencedOrderRecord, Security, Session,
};
use crate::utils::{Clock, IdentitySource};
use dashmap::DashMap;
use parking_lot::Mutex;
use pricelevel::{Side, TimeInForce};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, error, trace, warn};

/// One security's resting book and the queue serialising work on it.
struct SecurityBook {
    tasks: TaskQueue,
    sides: Mutex<BookSides>,
}

impl SecurityBook {
    fn new(security: &Security) -> Self {
        Self {
            tasks: TaskQueue::new(&format!("matcher-{}", security)),
            sides: Mutex::new(BookSides::default()),
        }
    }
}

/// Outcome of crossing against a single resting order.
struct MatchOutcome {
    active_report: Option<ExecutionReport>,
    passive_remaining: bool,
}

/// Collaborators of the [`InternalMatchingEngine`].
pub struct MatcherContext {
    /// Account used when re-routing passive remainders and cancelling orders
    /// held for a match
    pub root_account: Account,
    /// Annotates match reports
    pub report_builder: Arc<dyn MatchReportBuilder>,
    /// Supplies the best bid/offer bounding internal prices
    pub quotes: Arc<dyn QuoteSource>,
    /// Timestamps reports and re-routed orders
    pub clock: Arc<dyn Clock>,
    /// Issues ids for re-routed remainders
    pub identities: Arc<dyn IdentitySource>,
    /// Receives everything not crossed internally
    pub driver: Arc<dyn ExecutionDriver>,
    /// Bound on each wait of the cancel handshake
    pub timeout: Duration,
}

struct EngineInner {
    this: Weak<EngineInner>,
    root_session: Session,
    report_builder: Arc<dyn MatchReportBuilder>,
    quotes: Arc<dyn QuoteSource>,
    clock: Arc<dyn Clock>,
    identities: Arc<dyn IdentitySource>,
    driver: Arc<dyn ExecutionDriver>,
    timeout: Duration,
    books: DashMap<Security, Arc<SecurityBook>>,
    /// Client order id to the id currently working at the driver
    driver_ids: DashMap<OrderId, OrderId>,
    /// Client order id to the security whose queue owns it
    securities: DashMap<OrderId, Security>,
    reports: Arc<TaskQueue>,
    closed: AtomicBool,
}

/// Keeps a price/time book of every admitted order per security and crosses
/// incoming orders against it before routing the remainder to the external
/// driver.
///
/// Submissions, cancels and report deliveries for a security run on that
/// security's task queue, so no two matches touch the same resting order at
/// once. Reports coming back from the driver are processed on a separate
/// queue. A resting order that is working externally is cancelled there, and
/// its terminal report awaited, before any quantity is crossed against it.
pub struct InternalMatchingEngine {
    inner: Arc<EngineInner>,
}

impl InternalMatchingEngine {
    /// Create an engine on top of `context.driver`.
    pub fn new(context: MatcherContext) -> Self {
        Self {
            inner: Arc::new_cyclic(|this| EngineInner {
                this: Weak::clone(this),
                root_session: Session::new(context.root_account),
                report_builder: context.report_builder,
                quotes: context.quotes,
                clock: context.clock,
                identities: context.identities,
                driver: context.driver,
                timeout: context.timeout,
                books: DashMap::new(),
                driver_ids: DashMap::new(),
                securities: DashMap::new(),
                reports: Arc::new(TaskQueue::new("matcher-reports")),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// The resting book of a security as it stands between tasks.
    pub fn snapshot(&self, security: &Security) -> BookSnapshot {
        let capture = |entries: &[Arc<RestingOrder>]| {
            entries
                .iter()
                .filter(|entry| !entry.order.is_terminal() && entry.remaining() > 0)
                .map(|entry| RestingOrderSnapshot::capture(entry))
                .collect()
        };
        let (bids, asks) = match self.inner.books.get(security) {
            Some(book) => {
                let sides = book.sides.lock();
                (capture(&sides.bids), capture(&sides.asks))
            }
            None => (Vec::new(), Vec::new()),
        };
        BookSnapshot {
            security: security.clone(),
            bids,
            asks,
        }
    }

    /// The id under which a client order currently works at the driver.
    pub fn driver_order_id(&self, order_id: OrderId) -> Option<OrderId> {
        self.inner.driver_ids.get(&order_id).map(|id| *id)
    }

    /// Entries held on either side of a security's book, terminal or not.
    #[cfg(test)]
    pub(crate) fn resting_len(&self, security: &Security) -> usize {
        self.inner.books.get(security).map_or(0, |book| {
            let sides = book.sides.lock();
            sides.bids.len() + sides.asks.len()
        })
    }

    /// Whether the engine still accepts work.
    pub fn is_open(&self) -> bool {
        !self.inner.closed.load(Ordering::SeqCst)
    }
}

impl ExecutionDriver for InternalMatchingEngine {
    fn submit(&self, info: &OrderInfo) -> Arc<Order> {
        let fields = &info.fields;
        if matches!(fields.time_in_force, TimeInForce::Fok) || fields.quantity == 0 {
            trace!("Matcher: passing order {} through", info.order_id);
            self.inner.driver_ids.insert(info.order_id, info.order_id);
            return self.inner.driver.submit(info);
        }
        let order = Order::new(info.clone(), info.timestamp);
        let entry = Arc::new(RestingOrder::new(Arc::clone(&order)));
        if self.inner.closed.load(Ordering::SeqCst) {
            self.inner.reject(&order, &MatcherError::Closed);
            return order;
        }
        let book = self.inner.book(&fields.security);
        self.inner
            .securities
            .insert(info.order_id, fields.security.clone());
        let inner = Arc::clone(&self.inner);
        let task_book = Arc::clone(&book);
        if !book
            .tasks
            .push(move || inner.match_incoming(&task_book, entry))
        {
            self.inner.reject(&order, &MatcherError::Closed);
        }
        order
    }

    fn cancel(&self, session: &Session, order_id: OrderId) {
        let inner = Arc::clone(&self.inner);
        let session = session.clone();
        self.inner.on_owning_queue(order_id, move || {
            let driver_id = inner.driver_id(order_id);
            trace!("Matcher: cancel {} routed as {}", order_id, driver_id);
            inner.driver.cancel(&session, driver_id);
        });
    }

    fn update(&self, session: &Session, order_id: OrderId, report: ExecutionReport) {
        let inner = Arc::clone(&self.inner);
        let session = session.clone();
        self.inner.on_owning_queue(order_id, move || {
            let driver_id = inner.driver_id(order_id);
            let mut sanitized = report;
            sanitized.id = driver_id;
            inner.driver.update(&session, driver_id, sanitized);
        });
    }

    fn recover(&self, record: &SequencedOrderRecord) -> Result<Arc<Order>, OrderError> {
        let order = self.inner.driver.recover(record)?;
        self.inner.driver_ids.insert(order.id(), order.id());
        Ok(order)
    }

    fn close(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!("Matcher: closing");
        let books: Vec<Arc<SecurityBook>> = self
            .inner
            .books
            .iter()
            .map(|book| Arc::clone(book.value()))
            .collect();
        for book in books {
            book.tasks.close();
        }
        self.inner.reports.close();
        self.inner.driver.close();
    }
}

impl Drop for InternalMatchingEngine {
    fn drop(&mut self) {
        self.close();
    }
}

impl EngineInner {
    fn book(&self, security: &Security) -> Arc<SecurityBook> {
        Arc::clone(
            self.books
                .entry(security.clone())
                .or_insert_with(|| Arc::new(SecurityBook::new(security)))
                .value(),
        )
    }

    fn driver_id(&self, order_id: OrderId) -> OrderId {
        self.driver_ids.get(&order_id).map_or(order_id, |id| *id)
    }

    /// Runs `task` on the queue of the security owning `order_id`, or inline
    /// for orders the engine passed through.
    fn on_owning_queue<F>(&self, order_id: OrderId, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let book = self
            .securities
            .get(&order_id)
            .and_then(|security| self.books.get(security.value()).map(|book| Arc::clone(book.value())));
        match book {
            Some(book) => {
                if !book.tasks.push(task) {
                    warn!("Matcher: dropped request for order {} after close", order_id);
                }
            }
            None => task(),
        }
    }

    fn reject(&self, order: &Arc<Order>, reason: &MatcherError) {
        warn!("Matcher: rejecting order {}: {}", order.id(), reason);
        let timestamp = self.clock.now();
        let text = reason.to_string();
        let result = order.update_with(|_, last| {
            Some(ExecutionReport::updated(last, OrderStatus::Rejected, timestamp).with_text(&text))
        });
        if let Err(error) = result {
            error!("Matcher: could not reject order {}: {}", order.id(), error);
        }
    }

    fn match_incoming(&self, book: &SecurityBook, entry: Arc<RestingOrder>) {
        let fields = &entry.info.fields;
        let Some(bbo) = self.quotes.bbo(&fields.security) else {
            self.reject(
                &entry.order,
                &MatcherError::NoQuote {
                    security: fields.security.clone(),
                },
            );
            self.forget(entry.id());
            return;
        };
        let threshold = match fields.side {
            Side::Sell => bbo.bid,
            Side::Buy => bbo.ask,
        };
        let incoming_price = offer_price(fields);
        // Only this queue mutates the book, so the walk runs without holding
        // the book lock across the cancel handshake.
        let candidates: Vec<Arc<RestingOrder>> = {
            let mut sides = book.sides.lock();
            let (_, passive) = sides.split_mut(fields.side);
            passive.clone()
        };
        let mut remaining = fields.quantity;
        let mut match_reports = Vec::new();
        let mut exhausted = Vec::new();
        for candidate in candidates {
            if remaining == 0 {
                break;
            }
            if candidate.order.is_terminal() {
                exhausted.push(candidate.id());
                continue;
            }
            let passive_price = offer_price(&candidate.info.fields);
            let eligible = compare_offers(fields.side, incoming_price, passive_price).is_le()
                && compare_offers(fields.side, passive_price, threshold).is_ge();
            if !eligible {
                continue;
            }
            match self.internal_match(&entry, &candidate, remaining, threshold) {
                Ok(outcome) => {
                    if let Some(report) = outcome.active_report {
                        remaining -= report.last_quantity;
                        match_reports.push(report);
                    }
                    if !outcome.passive_remaining {
                        exhausted.push(candidate.id());
                    }
                }
                Err(error) => {
                    warn!(
                        "Matcher: abandoned match of {} against {}: {}",
                        entry.id(),
                        candidate.id(),
                        error
                    );
                }
            }
        }
        entry.state.lock().remaining = remaining;
        if !match_reports.is_empty() {
            self.apply_active_matches(&entry, match_reports);
        }
        let mut sides = book.sides.lock();
        if !exhausted.is_empty() {
            let (_, passive) = sides.split_mut(fields.side);
            passive.retain(|resting| !exhausted.contains(&resting.id()));
        }
        if remaining == 0 {
            drop(sides);
            self.forget(entry.id());
            return;
        }
        sides.insert(Arc::clone(&entry));
        drop(sides);
        let mut routed = entry.info.fields.clone();
        routed.quantity = remaining;
        self.submit_to_driver(entry.info.submission_account.clone(), routed, &entry);
    }

    /// Publishes NEW followed by every internal fill on the incoming order.
    fn apply_active_matches(&self, entry: &RestingOrder, reports: Vec<ExecutionReport>) {
        entry.state.lock().pending_new = false;
        let timestamp = self.clock.now();
        let accepted = entry
            .order
            .update_with(|_, last| Some(ExecutionReport::updated(last, OrderStatus::New, timestamp)));
        if let Err(error) = accepted {
            error!("Matcher: could not accept order {}: {}", entry.id(), error);
            return;
        }
        for report in reports {
            let timestamp = self.clock.now();
            let result = entry.order.update_with(|_, last| {
                let mut report = report;
                report.sequence = last.sequence + 1;
                report.timestamp = timestamp;
                Some(report)
            });
            if let Err(error) = result {
                error!("Matcher: could not fill order {}: {}", entry.id(), error);
            }
        }
    }

    fn internal_match(
        &self,
        active: &RestingOrder,
        passive: &Arc<RestingOrder>,
        quantity: Quantity,
        threshold: Money,
    ) -> Result<MatchOutcome, MatcherError> {
        passive.matching.store(true, Ordering::SeqCst);
        if !passive.live.wait_for(self.timeout) {
            passive.matching.store(false, Ordering::SeqCst);
            return Err(MatcherError::Timeout {
                order_id: passive.id(),
                awaiting: "live",
            });
        }
        let driver_order = passive.state.lock().driver_order.as_ref().map(|order| order.id());
        if let Some(driver_id) = driver_order {
            self.driver.cancel(&self.root_session, driver_id);
        }
        if !passive.terminal.wait_for(self.timeout) {
            passive.matching.store(false, Ordering::SeqCst);
            return Err(MatcherError::Timeout {
                order_id: passive.id(),
                awaiting: "terminal",
            });
        }
        passive.matching.store(false, Ordering::SeqCst);
        passive.live.reset();
        passive.terminal.reset();
        let (matched, passive_remaining) = {
            let mut state = passive.state.lock();
            let matched = state.remaining.min(quantity);
            state.remaining -= matched;
            (matched, state.remaining)
        };
        if matched == 0 {
            return Ok(MatchOutcome {
                active_report: None,
                passive_remaining: passive_remaining != 0,
            });
        }
        let price = match passive.info.fields.order_type {
            OrderType::Limit => passive.info.fields.price,
            OrderType::Market => threshold,
        };
        let mut passive_report = ExecutionReport::initial(passive.id(), 0).with_fill(matched, price);
        passive_report.status = if passive_remaining == 0 {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        let mut active_report = ExecutionReport::initial(active.id(), 0).with_fill(matched, price);
        active_report.status = if matched == quantity {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        self.report_builder.make(
            &passive.info.fields,
            &active.info.fields,
            &mut passive_report,
            &mut active_report,
        );
        let timestamp = self.clock.now();
        let result = passive.order.update_with(|_, last| {
            passive_report.sequence = last.sequence + 1;
            passive_report.timestamp = timestamp;
            Some(passive_report)
        });
        if let Err(error) = result {
            error!("Matcher: could not fill resting order {}: {}", passive.id(), error);
        }
        debug!(
            "Matcher: crossed {} {} against {} at {}",
            active.id(),
            matched,
            passive.id(),
            price
        );
        if passive_remaining != 0 {
            let mut routed = passive.info.fields.clone();
            routed.quantity = passive_remaining;
            self.submit_to_driver(self.root_session.account.clone(), routed, passive);
        } else {
            self.forget(passive.id());
        }
        Ok(MatchOutcome {
            active_report: Some(active_report),
            passive_remaining: passive_remaining != 0,
        })
    }

    /// Routes `fields` externally on behalf of `entry`. The first routing
    /// reuses the client id; every re-route draws a fresh one.
    fn submit_to_driver(
        &self,
        submission_account: Account,
        fields: OrderFields,
        entry: &Arc<RestingOrder>,
    ) {
        let rerouted = entry.state.lock().driver_order.is_some();
        let driver_id = if rerouted {
            self.identities.next_order_id()
        } else {
            entry.id()
        };
        self.driver_ids.insert(entry.id(), driver_id);
        let info = OrderInfo::new(
            fields,
            submission_account,
            driver_id,
            entry.info.short_sale,
            self.clock.now(),
        );
        trace!(
            "Matcher: routing {} {} as {}",
            entry.id(),
            info.fields.quantity,
            driver_id
        );
        let driver_order = self.driver.submit(&info);
        entry.state.lock().driver_order = Some(Arc::clone(&driver_order));
        let engine = Weak::clone(&self.this);
        let weak = Arc::downgrade(entry);
        let reports = Arc::clone(&self.reports);
        driver_order.monitor(move |report| {
            let engine = Weak::clone(&engine);
            let weak = Weak::clone(&weak);
            let report = report.clone();
            reports.push(move || {
                if let (Some(engine), Some(entry)) = (engine.upgrade(), weak.upgrade()) {
                    engine.on_execution_report(&entry, report);
                }
            });
        });
    }

    /// Drops the routing records of an order that is done.
    fn forget(&self, order_id: OrderId) {
        self.driver_ids.remove(&order_id);
        self.securities.remove(&order_id);
    }

    /// Forgets a terminal order and takes it off its side of the book on the
    /// security's queue.
    fn retire(&self, entry: &RestingOrder) {
        let order_id = entry.id();
        let side = entry.info.fields.side;
        let book = self
            .books
            .get(&entry.info.fields.security)
            .map(|book| Arc::clone(book.value()));
        self.forget(order_id);
        let Some(book) = book else {
            return;
        };
        let task_book = Arc::clone(&book);
        let queued = book.tasks.push(move || {
            let mut sides = task_book.sides.lock();
            let (own, _) = sides.split_mut(side);
            own.retain(|resting| resting.id() != order_id);
        });
        if queued {
            trace!("Matcher: retiring order {}", order_id);
        }
    }

    /// Mirrors a driver report onto the client order, swallowing the reports that
    /// belong to a cancel issued for an internal match.
    fn on_execution_report(&self, entry: &Arc<RestingOrder>, report: ExecutionReport) {
        if report.status == OrderStatus::PendingNew {
            return;
        }
        entry.live.resolve();
        {
            let mut state = entry.state.lock();
            if state.pending_new {
                state.pending_new = false;
            } else if report.status == OrderStatus::New {
                return;
            }
            state.remaining = state.remaining.saturating_sub(report.last_quantity);
        }
        if entry.matching.load(Ordering::SeqCst) && report.last_quantity == 0 {
            if report.status.is_terminal() {
                entry.terminal.resolve();
                return;
            }
            if report.status == OrderStatus::PendingCancel {
                return;
            }
        }
        let is_terminal = report.status.is_terminal();
        let client_id = entry.id();
        let result = entry.order.update_with(|_, last| {
            let mut forwarded = report;
            forwarded.id = client_id;
            forwarded.sequence = last.sequence + 1;
            Some(forwarded)
        });
        if let Err(error) = result {
            error!("Matcher: dropped report for order {}: {}", client_id, error);
        }
        if is_terminal {
            entry.state.lock().remaining = 0;
            entry.terminal.resolve();
            self.retire(entry);
        }
    }
}
