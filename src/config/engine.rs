use super::error::ConfigError;
use crate::accounting::{ExchangeRate, ExchangeRateTable};
use crate::admission::{BoardLotTier, RiskParameters, default_board_lots};
use crate::order::{Account, CurrencyId, Money};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

fn default_match_timeout_ms() -> u64 {
    1_000
}

fn default_root_account() -> Account {
    Account::new("root")
}

fn default_lot_size() -> u64 {
    100
}

fn default_risk_parameters() -> RiskParameters {
    RiskParameters::new(CurrencyId::new("USD"), Money::new(1_000_000, 0))
}

/// Settings for assembling the admission pipeline and the matcher.
///
/// Every field has a default, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How long the matcher waits at each step of the cancel handshake
    #[serde(default = "default_match_timeout_ms")]
    pub match_timeout_ms: u64,
    /// Account re-routed remainders are submitted under
    #[serde(default = "default_root_account")]
    pub root_account: Account,
    /// Lot size by price tier, ascending by upper bound
    #[serde(default = "default_board_lots")]
    pub board_lots: Vec<BoardLotTier>,
    /// Lot size above the last tier
    #[serde(default = "default_lot_size")]
    pub default_lot_size: u64,
    /// Risk parameters for accounts without their own
    #[serde(default = "default_risk_parameters")]
    pub risk: RiskParameters,
    /// Rates used to convert into risk currencies
    #[serde(default)]
    pub exchange_rates: Vec<ExchangeRate>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            match_timeout_ms: default_match_timeout_ms(),
            root_account: default_root_account(),
            board_lots: default_board_lots(),
            default_lot_size: default_lot_size(),
            risk: default_risk_parameters(),
            exchange_rates: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Config: loading {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The matcher's handshake timeout.
    pub fn match_timeout(&self) -> Duration {
        Duration::from_millis(self.match_timeout_ms)
    }

    /// The configured rates as a lookup table.
    pub fn exchange_rate_table(&self) -> ExchangeRateTable {
        self.exchange_rates.iter().cloned().collect()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_lot_size == 0 {
            return Err(ConfigError::Invalid("default_lot_size must be positive".into()));
        }
        if let Some(tier) = self.board_lots.iter().find(|tier| tier.lot_size == 0) {
            return Err(ConfigError::Invalid(format!(
                "board lot below {} must be positive",
                tier.below
            )));
        }
        if self
            .board_lots
            .windows(2)
            .any(|pair| pair[0].below >= pair[1].below)
        {
            return Err(ConfigError::Invalid(
                "board lot tiers must be ascending".into(),
            ));
        }
        if self.exchange_rates.iter().any(|rate| rate.rate <= Money::ZERO) {
            return Err(ConfigError::Invalid("exchange rates must be positive".into()));
        }
        Ok(())
    }
}
