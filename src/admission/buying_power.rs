use super::check::SubmissionCheck;
use super::error::SubmissionCheckError;
use crate::accounting::{BuyingPowerModel, ExchangeRateTable};
use crate::matcher::QuoteSource;
use crate::order::{Account, CurrencyId, Money, Order, OrderFields, OrderInfo, OrderType};
use dashmap::DashMap;
use parking_lot::Mutex;
use pricelevel::Side;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, trace, warn};

/// Per-account limits enforced at admission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskParameters {
    /// Currency exposure is measured in
    pub currency: CurrencyId,
    /// Maximum buying power the account may use
    pub buying_power: Money,
}

impl RiskParameters {
    /// Create risk parameters.
    pub fn new(currency: CurrencyId, buying_power: Money) -> Self {
        Self {
            currency,
            buying_power,
        }
    }
}

/// Refuses orders that would push an account's worst-case exposure past its
/// buying power.
///
/// Orders are priced at the price they are expected to trade at given the
/// current quote and converted into the account's risk currency. The ledger
/// follows admitted orders through their execution reports.
pub struct BuyingPowerCheck {
    exchange_rates: Arc<ExchangeRateTable>,
    quotes: Arc<dyn QuoteSource>,
    default_parameters: RiskParameters,
    parameters: DashMap<Account, RiskParameters>,
    ledgers: DashMap<Account, Arc<Mutex<BuyingPowerModel>>>,
}

impl BuyingPowerCheck {
    /// Create a check applying `default_parameters` to accounts without their own.
    pub fn new(
        exchange_rates: ExchangeRateTable,
        quotes: Arc<dyn QuoteSource>,
        default_parameters: RiskParameters,
    ) -> Self {
        Self {
            exchange_rates: Arc::new(exchange_rates),
            quotes,
            default_parameters,
            parameters: DashMap::new(),
            ledgers: DashMap::new(),
        }
    }

    /// Override an account's risk parameters.
    pub fn set_risk_parameters(&self, account: &Account, parameters: RiskParameters) {
        self.parameters.insert(account.clone(), parameters);
    }

    /// The risk parameters in force for an account.
    pub fn risk_parameters(&self, account: &Account) -> RiskParameters {
        self.parameters
            .get(account)
            .map_or_else(|| self.default_parameters.clone(), |entry| entry.clone())
    }

    /// Buying power currently used by an account, in its risk currency.
    pub fn buying_power_used(&self, account: &Account) -> Money {
        let currency = self.risk_parameters(account).currency;
        self.ledgers
            .get(account)
            .map_or(Money::ZERO, |ledger| ledger.lock().buying_power(&currency))
    }

    fn ledger(&self, account: &Account) -> Arc<Mutex<BuyingPowerModel>> {
        Arc::clone(self.ledgers.entry(account.clone()).or_default().value())
    }

    /// The price an order is expected to trade at given the current quote.
    pub fn expected_price(&self, fields: &OrderFields) -> Result<Money, SubmissionCheckError> {
        let bbo = self
            .quotes
            .bbo(&fields.security)
            .ok_or(SubmissionCheckError::NoQuote)?;
        match fields.order_type {
            OrderType::Limit => {
                if fields.price <= Money::ZERO {
                    return Err(SubmissionCheckError::InvalidPrice);
                }
                Ok(match fields.side {
                    Side::Sell => bbo.bid.max(fields.price),
                    Side::Buy => bbo.ask.min(fields.price),
                })
            }
            OrderType::Market => Ok(match fields.side {
                Side::Sell => bbo.bid,
                Side::Buy => bbo.ask,
            }),
        }
    }

    /// Restates the order's price and expected price in `currency`.
    fn convert(
        &self,
        fields: &OrderFields,
        expected_price: Money,
        currency: &CurrencyId,
    ) -> Result<(OrderFields, Money), SubmissionCheckError> {
        let convert = |amount| {
            self.exchange_rates
                .convert(amount, &fields.currency, currency)
                .map_err(|_| SubmissionCheckError::CurrencyNotRecognized)
        };
        let mut converted = fields.clone();
        converted.currency = currency.clone();
        converted.price = convert(fields.price)?;
        let converted_price = convert(expected_price)?;
        Ok((converted, converted_price))
    }
}

impl SubmissionCheck for BuyingPowerCheck {
    fn name(&self) -> &str {
        "buying_power"
    }

    fn submit(&self, info: &OrderInfo) -> Result<(), SubmissionCheckError> {
        let fields = &info.fields;
        let expected_price = self.expected_price(fields)?;
        let parameters = self.risk_parameters(&fields.account);
        let (converted, converted_price) =
            self.convert(fields, expected_price, &parameters.currency)?;
        let ledger = self.ledger(&fields.account);
        let mut ledger = ledger.lock();
        let used = ledger.submit(info.order_id, &converted, converted_price);
        if used > parameters.buying_power {
            if let Err(error) = ledger.reject(info.order_id) {
                error!("Buying power: rollback of {} failed: {}", info.order_id, error);
            }
            return Err(SubmissionCheckError::InsufficientBuyingPower);
        }
        trace!(
            "Buying power: {} uses {} of {} {}",
            fields.account, used, parameters.buying_power, parameters.currency
        );
        Ok(())
    }

    fn add(&self, order: &Arc<Order>) {
        let info = order.info();
        let fields = &info.fields;
        let risk_currency = self.risk_parameters(&fields.account).currency;
        let ledger = self.ledger(&fields.account);
        {
            let mut ledger = ledger.lock();
            if !ledger.has_order(info.order_id) {
                let expected_price = self.expected_price(fields).unwrap_or(fields.price);
                match self.convert(fields, expected_price, &risk_currency) {
                    Ok((converted, converted_price)) => {
                        ledger.submit(info.order_id, &converted, converted_price);
                    }
                    Err(error) => {
                        warn!("Buying power: not tracking order {}: {}", info.order_id, error);
                        return;
                    }
                }
            }
        }
        let exchange_rates = Arc::clone(&self.exchange_rates);
        let order_currency = fields.currency.clone();
        order.monitor(move |report| {
            let mut converted = report.clone();
            if converted.last_quantity != 0 {
                match exchange_rates.convert(converted.last_price, &order_currency, &risk_currency)
                {
                    Ok(price) => converted.last_price = price,
                    Err(error) => warn!("Buying power: fill of {} not converted: {}", report.id, error),
                }
            }
            if let Err(error) = ledger.lock().update(&converted) {
                error!("Buying power: dropped report for {}: {}", report.id, error);
            }
        });
    }

    fn reject(&self, info: &OrderInfo) {
        let ledger = self.ledger(&info.fields.account);
        let mut ledger = ledger.lock();
        if !ledger.has_order(info.order_id) {
            return;
        }
        if let Err(error) = ledger.reject(info.order_id) {
            error!("Buying power: rollback of {} failed: {}", info.order_id, error);
        }
    }
}
