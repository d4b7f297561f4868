//! Submission check error types

use crate::order::Quantity;
use thiserror::Error;

/// A business rejection raised by a submission check.
///
/// The display text becomes the reason carried by the REJECTED report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionCheckError {
    /// Quantity is not a whole number of board lots
    #[error("Quantity must be a multiple of {lot_size}.")]
    BoardLot {
        /// Lot size that applies at the order's price
        lot_size: Quantity,
    },

    /// Limit price is zero or negative
    #[error("Invalid price.")]
    InvalidPrice,

    /// No quote is available to estimate the order's cost
    #[error("No BBO quote available.")]
    NoQuote,

    /// The order's currency cannot be converted into the risk currency
    #[error("Currency not recognized.")]
    CurrencyNotRecognized,

    /// Admitting the order would exceed the account's buying power
    #[error("Order exceeds available buying power.")]
    InsufficientBuyingPower,

    /// The account may not submit any order
    #[error("Account is disabled.")]
    AccountDisabled,

    /// The account may only submit orders reducing its position
    #[error("Only orders closing the current position are permitted.")]
    CloseOrdersOnly,

    /// A compliance rule refused the order
    #[error("{reason}")]
    Compliance {
        /// Name of the rule
        rule: String,
        /// Why the rule refused it
        reason: String,
    },
}
