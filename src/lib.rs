//! # Venue Core: Order Admission, Internal Matching and Exposure Accounting
//!
//! The order-handling core of a brokerage/venue backend. Client orders are
//! validated by a chain of submission checks, crossed internally against
//! other admitted orders at prices no worse than the lit market, and whatever
//! remains is routed to an external execution driver. Buying power and
//! short-sale exposure are tracked per account and kept in step with every
//! execution report.
//!
//! ## Key Features
//!
//! - **Order State Machine**: Each [`Order`] folds a strictly sequenced list of
//!   [`ExecutionReport`]s into its status and remaining quantity. Gaps,
//!   duplicates, overfills and reports after a terminal status are refused.
//!
//! - **Admission Pipeline**: [`AdmissionPipeline`] runs board-lot, buying-power,
//!   risk-state and compliance checks in order. A failing check rolls back every
//!   check that already passed, newest first.
//!
//! - **Internal Matching**: [`InternalMatchingEngine`] keeps a price/time book per
//!   security and crosses incoming orders against it. A resting order working
//!   at the external venue is cancelled there, and its terminal report awaited,
//!   before any quantity is booked against it, so nothing is filled twice.
//!
//! - **Pessimistic Ledgers**: [`BuyingPowerModel`] charges the larger of ask-side
//!   and bid-side worst-case exposure per security. [`ShortingModel`] marks an ask
//!   as a short sale when pending asks exceed the position.
//!
//! - **Pluggable Seams**: the external venue, quotes, clock, id issuance and match
//!   report annotation are all traits, with in-memory implementations for tests.
//!
//! ## Layering
//!
//! ```text
//! OrderSubmissionService
//!   -> AdmissionPipeline (BoardLot, BuyingPower, RiskState, Compliance)
//!     -> InternalMatchingEngine
//!       -> ExecutionDriver (external venue)
//! ```
//!
//! Every layer below the service implements [`ExecutionDriver`], so layers can
//! be stacked or omitted freely.
//!
//! ## Concurrency
//!
//! Work on a security's book is serialised on that security's task queue;
//! reports returning from the external driver are handled on a separate queue.
//! Ledgers are updated synchronously from order monitors, under the order's
//! own lock, so an admission decision never races the fills it depends on.
//! The lock order is always order first, ledger second.
//!
//! ## Logging
//!
//! The crate emits `tracing` events and never installs a subscriber.
//!
//! ## Status
//! This project is currently in active development and is not yet suitable for production use.

pub mod accounting;
pub mod admission;
pub mod config;
pub mod matcher;
pub mod order;
pub mod service;

mod utils;

pub use accounting::{BuyingPowerModel, ExchangeRate, ExchangeRateTable, LedgerError, ShortingModel};
pub use admission::{AdmissionPipeline, SubmissionCheck, SubmissionCheckError};
pub use config::{ConfigError, EngineConfig};
pub use matcher::{ExecutionDriver, InternalMatchingEngine, MatcherContext, MatcherError};
pub use order::{
    ExecutionReport, Order, OrderError, OrderFields, OrderId, OrderInfo, OrderStatus,
    SequencedOrderRecord,
};
pub use service::{OrderSubmissionService, ServiceError};
pub use utils::{
    Clock, IdentitySource, ManualClock, SequentialIdentitySource, SystemClock,
    current_time_millis,
};
