//! Internal matching engine and the driver seams it sits between.

mod book;
mod driver;
mod engine;
mod error;
mod latch;
mod quotes;
mod report_builder;
mod simulated;
mod task_queue;

pub use book::{BookSnapshot, RestingOrderSnapshot, compare_offers, offer_price};
pub use driver::ExecutionDriver;
pub use engine::{InternalMatchingEngine, MatcherContext};
pub use error::MatcherError;
pub use latch::Latch;
pub use quotes::{BboQuote, CachedQuoteSource, QuoteSource};
pub use report_builder::{
    INTERNAL_MARKET, MATCH_ID_TAG, MatchReportBuilder, TaggingMatchReportBuilder,
};
pub use simulated::SimulatedExecutionDriver;
pub use task_queue::TaskQueue;
