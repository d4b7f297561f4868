use super::error::LedgerError;
use crate::order::{CurrencyId, Money};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Price of one unit of `base` expressed in `counter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// Currency being priced
    pub base: CurrencyId,
    /// Currency the price is quoted in
    pub counter: CurrencyId,
    /// Units of `counter` per unit of `base`
    pub rate: Money,
}

/// Converts amounts between currencies using a fixed set of rates.
#[derive(Debug, Clone, Default)]
pub struct ExchangeRateTable {
    rates: HashMap<(CurrencyId, CurrencyId), Money>,
}

impl ExchangeRateTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a rate.
    pub fn add(&mut self, rate: ExchangeRate) {
        self.rates.insert((rate.base, rate.counter), rate.rate);
    }

    /// Convert `amount` from `from` into `to`. The inverse of a known pair is
    /// used when the direct pair is missing.
    pub fn convert(
        &self,
        amount: Money,
        from: &CurrencyId,
        to: &CurrencyId,
    ) -> Result<Money, LedgerError> {
        if from == to {
            return Ok(amount);
        }
        if let Some(rate) = self.rates.get(&(from.clone(), to.clone())) {
            return Ok(amount * *rate);
        }
        match self.rates.get(&(to.clone(), from.clone())) {
            Some(rate) if !rate.is_zero() => Ok(amount / *rate),
            _ => Err(LedgerError::CurrencyPairNotFound {
                base: from.clone(),
                counter: to.clone(),
            }),
        }
    }
}

impl FromIterator<ExchangeRate> for ExchangeRateTable {
    fn from_iter<I: IntoIterator<Item = ExchangeRate>>(rates: I) -> Self {
        let mut table = Self::new();
        for rate in rates {
            table.add(rate);
        }
        table
    }
}
