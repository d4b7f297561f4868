//! Ledgers bounding a client's market exposure: buying power and short-sale marking.

mod buying_power;
mod error;
mod exchange_rates;
mod shorting;

pub use buying_power::{BuyingPowerModel, MONEY_SCALE};
pub use error::LedgerError;
pub use exchange_rates::{ExchangeRate, ExchangeRateTable};
pub use shorting::ShortingModel;
