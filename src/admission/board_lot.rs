use super::check::SubmissionCheck;
use super::error::SubmissionCheckError;
use crate::matcher::QuoteSource;
use crate::order::{Money, OrderFields, OrderInfo, OrderType, Quantity};
use pricelevel::Side;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Lot size applying to orders priced strictly below `below`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardLotTier {
    /// Exclusive upper price bound of the tier
    pub below: Money,
    /// Lot size within the tier
    pub lot_size: Quantity,
}

/// Penny stocks trade in lots of 1000, sub-dollar stocks in 500.
pub fn default_board_lots() -> Vec<BoardLotTier> {
    vec![
        BoardLotTier {
            below: Money::new(10, 2),
            lot_size: 1000,
        },
        BoardLotTier {
            below: Money::ONE,
            lot_size: 500,
        },
    ]
}

/// Requires quantities to be whole multiples of the board lot for the order's
/// price. Market orders are priced off the quote they would take.
pub struct BoardLotCheck {
    tiers: Vec<BoardLotTier>,
    default_lot_size: Quantity,
    quotes: Arc<dyn QuoteSource>,
}

impl BoardLotCheck {
    /// Create a check from price tiers and the lot size above every tier.
    pub fn new(
        mut tiers: Vec<BoardLotTier>,
        default_lot_size: Quantity,
        quotes: Arc<dyn QuoteSource>,
    ) -> Self {
        tiers.sort_by(|lhs, rhs| lhs.below.cmp(&rhs.below));
        Self {
            tiers,
            default_lot_size,
            quotes,
        }
    }

    /// The lot size in force at `price`.
    pub fn lot_size(&self, price: Money) -> Quantity {
        self.tiers
            .iter()
            .find(|tier| price < tier.below)
            .map_or(self.default_lot_size, |tier| tier.lot_size)
    }

    fn reference_price(&self, fields: &OrderFields) -> Result<Money, SubmissionCheckError> {
        match fields.order_type {
            OrderType::Limit => Ok(fields.price),
            OrderType::Market => {
                let bbo = self
                    .quotes
                    .bbo(&fields.security)
                    .ok_or(SubmissionCheckError::NoQuote)?;
                Ok(match fields.side {
                    Side::Buy => bbo.ask,
                    Side::Sell => bbo.bid,
                })
            }
        }
    }
}

impl SubmissionCheck for BoardLotCheck {
    fn name(&self) -> &str {
        "board_lot"
    }

    fn submit(&self, info: &OrderInfo) -> Result<(), SubmissionCheckError> {
        let price = self.reference_price(&info.fields)?;
        let lot_size = self.lot_size(price);
        if lot_size != 0 && info.fields.quantity % lot_size != 0 {
            return Err(SubmissionCheckError::BoardLot { lot_size });
        }
        Ok(())
    }
}
