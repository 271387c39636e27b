use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderSide {
    #[serde(rename = "BUY", alias = "buy", alias = "Buy")]
    Buy,
    #[serde(rename = "SELL", alias = "sell", alias = "Sell")]
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderSide {
    type Err = CoreError;

    /// Accepts `buy`/`sell` in any letter case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(OrderSide::Buy),
            "sell" => Ok(OrderSide::Sell),
            other => Err(CoreError::invalid(
                "side",
                format!("'{}' is not one of buy, sell", other),
            )),
        }
    }
}

/// How a sell is attributed to historical buy lots for the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LotMatching {
    /// Re-scan every historical buy oldest-first on each sell. Lots are never
    /// consumed, so consecutive sells may claim the same buy.
    #[default]
    Historical,
    /// Keep an arena of open lots whose remaining quantity is consumed by
    /// each sell, so a buy is never attributed beyond its size.
    Consuming,
}

/// Market family a symbol trades in, inferred from its ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Equities,
    Crypto,
}

impl AssetClass {
    /// A symbol is crypto when it contains any of `markers` (e.g. `USDT`,
    /// `BINANCE`), compared case-insensitively.
    pub fn classify<S: AsRef<str>>(symbol: &str, markers: &[S]) -> Self {
        let symbol = symbol.to_ascii_uppercase();
        if markers
            .iter()
            .any(|m| !m.as_ref().is_empty() && symbol.contains(&m.as_ref().to_ascii_uppercase()))
        {
            AssetClass::Crypto
        } else {
            AssetClass::Equities
        }
    }

    /// Equities have no weekend sessions.
    pub fn trades_on_weekends(&self) -> bool {
        matches!(self, AssetClass::Crypto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_parses_case_insensitively() {
        assert_eq!("buy".parse::<OrderSide>().unwrap(), OrderSide::Buy);
        assert_eq!(" SELL ".parse::<OrderSide>().unwrap(), OrderSide::Sell);
        assert!(matches!(
            "short".parse::<OrderSide>(),
            Err(CoreError::InvalidInput(field, _)) if field == "side"
        ));
    }

    #[test]
    fn side_serializes_upper_case_and_accepts_lower_case() {
        assert_eq!(serde_json::to_string(&OrderSide::Sell).unwrap(), "\"SELL\"");
        let side: OrderSide = serde_json::from_str("\"buy\"").unwrap();
        assert_eq!(side, OrderSide::Buy);
    }

    #[test]
    fn crypto_markers_match_anywhere_in_the_symbol() {
        let markers = ["USDT", "BINANCE"];
        assert_eq!(AssetClass::classify("btcusdt", &markers), AssetClass::Crypto);
        assert_eq!(AssetClass::classify("BINANCE:ETHBTC", &markers), AssetClass::Crypto);
        assert_eq!(AssetClass::classify("AAPL", &markers), AssetClass::Equities);
        assert_eq!(AssetClass::classify("AAPL", &[""]), AssetClass::Equities);
    }
}
