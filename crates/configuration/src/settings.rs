use core_types::LotMatching;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::ConfigError;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub account: AccountSettings,
    pub analytics: AnalyticsSettings,
    pub logging: LoggingSettings,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.account.validate()?;
        self.analytics.validate()
    }
}

/// Parameters of the paper account the ledger manages.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AccountSettings {
    pub account_id: String,
    /// Cash the account starts with (and returns to on reset).
    pub initial_cash: Decimal,
    pub lot_matching: LotMatching,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            account_id: "paper-account".to_string(),
            initial_cash: dec!(100000),
            lot_matching: LotMatching::Historical,
        }
    }
}

impl AccountSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.account_id.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "account.account_id must not be empty".to_string(),
            ));
        }
        if self.initial_cash < Decimal::ZERO {
            return Err(ConfigError::ValidationError(format!(
                "account.initial_cash must not be negative, got {}",
                self.initial_cash
            )));
        }
        Ok(())
    }
}

/// Parameters shared by the performance analytics.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    /// The fixed dollar amount treated as 1R. Not derived from position sizing.
    pub risk_per_trade: Decimal,
    /// Number of closed trades in each rolling window.
    pub rolling_window: usize,
    /// Periods per year used to annualize the rolling Sharpe ratio.
    pub annualization_periods: u32,
    /// Substrings that mark a symbol as crypto rather than equities.
    pub crypto_markers: Vec<String>,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            risk_per_trade: dec!(100),
            rolling_window: 30,
            annualization_periods: 252,
            crypto_markers: vec!["USDT".to_string(), "USD".to_string(), "BINANCE".to_string()],
        }
    }
}

impl AnalyticsSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.risk_per_trade <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(format!(
                "analytics.risk_per_trade must be positive, got {}",
                self.risk_per_trade
            )));
        }
        if self.rolling_window < 2 {
            return Err(ConfigError::ValidationError(format!(
                "analytics.rolling_window must be at least 2, got {}",
                self.rolling_window
            )));
        }
        if self.annualization_periods == 0 {
            return Err(ConfigError::ValidationError(
                "analytics.annualization_periods must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter level. `RUST_LOG` wins when set.
    pub level: LogLevel,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            directory: None,
            file_prefix: "papertrail.log".to_string(),
        }
    }
}
