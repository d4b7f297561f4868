use crate::order::{Money, Security};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Best bid and offer for a security.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BboQuote {
    /// Best bid price
    pub bid: Money,
    /// Best ask price
    pub ask: Money,
    /// Time the quote was published, in milliseconds
    pub timestamp: u64,
}

impl BboQuote {
    /// Create a quote.
    pub fn new(bid: Money, ask: Money, timestamp: u64) -> Self {
        Self {
            bid,
            ask,
            timestamp,
        }
    }
}

/// Supplies the current best bid/offer per security.
///
/// Implementations must answer from memory; admission and matching call this
/// on every submission.
pub trait QuoteSource: Send + Sync {
    /// The last known quote, or `None` if nothing was ever published.
    fn bbo(&self, security: &Security) -> Option<BboQuote>;
}

/// Keeps the last pushed quote per security.
#[derive(Debug, Default)]
pub struct CachedQuoteSource {
    quotes: DashMap<Security, BboQuote>,
}

impl CachedQuoteSource {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached quote for a security.
    pub fn publish(&self, security: &Security, quote: BboQuote) {
        trace!(
            "Quote {}: bid {} ask {} at {}",
            security, quote.bid, quote.ask, quote.timestamp
        );
        self.quotes.insert(security.clone(), quote);
    }

    /// Forget a security's quote, e.g. after its feed was lost.
    pub fn clear(&self, security: &Security) {
        self.quotes.remove(security);
    }
}

impl QuoteSource for CachedQuoteSource {
    fn bbo(&self, security: &Security) -> Option<BboQuote> {
        self.quotes.get(security).map(|quote| *quote)
    }
}
