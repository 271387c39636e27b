use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use core_types::{AccountSnapshot, OrderSide, TradeRecord, TradeRequest, ingest_trade_log};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// One line of an orders file: a trade request with an optional execution time.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderEntry {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: Decimal,
    pub price: Decimal,
    #[serde(default)]
    pub commission: Decimal,
    /// Defaults to the time the order is executed.
    #[serde(default)]
    pub executed_at: Option<DateTime<Utc>>,
}

impl OrderEntry {
    pub fn request(&self) -> TradeRequest {
        TradeRequest::new(self.symbol.clone(), self.side, self.quantity, self.price)
            .with_commission(self.commission)
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

pub fn parse_orders(json: &str) -> Result<Vec<OrderEntry>> {
    serde_json::from_str(json).context("Orders must be a JSON array of {symbol, side, quantity, price}")
}

/// Mark prices keyed by symbol. Symbols are upper-cased to match the ledger.
pub fn parse_marks(json: &str) -> Result<HashMap<String, Decimal>> {
    let marks: HashMap<String, Decimal> =
        serde_json::from_str(json).context("Marks must be a JSON object of symbol to price")?;
    Ok(marks
        .into_iter()
        .map(|(symbol, price)| (symbol.trim().to_uppercase(), price))
        .collect())
}

pub fn read_orders(path: &Path) -> Result<Vec<OrderEntry>> {
    parse_orders(&read(path)?).with_context(|| format!("Invalid orders file {}", path.display()))
}

pub fn read_marks(path: &Path) -> Result<HashMap<String, Decimal>> {
    parse_marks(&read(path)?).with_context(|| format!("Invalid marks file {}", path.display()))
}

/// Reads and validates a trade log. Any malformed record rejects the file.
pub fn read_trades(path: &Path) -> Result<Vec<TradeRecord>> {
    ingest_trade_log(&read(path)?).with_context(|| format!("Invalid trade log {}", path.display()))
}

pub fn read_snapshot(path: &Path) -> Result<AccountSnapshot> {
    serde_json::from_str(&read(path)?).with_context(|| format!("Invalid account snapshot {}", path.display()))
}
