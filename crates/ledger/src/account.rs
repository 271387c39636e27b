use crate::error::LedgerError;
use chrono::{DateTime, Utc};
use core_types::{AccountSnapshot, Position, PositionSnapshot, TradeRecord};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Manages the state of a trading account: cash, positions and the trade log.
/// Its sole responsibility is to accurately reflect the current state based on executed trades.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    account_id: String,
    cash: Decimal,
    positions: BTreeMap<String, Position>,
    trades: Vec<TradeRecord>,
}

/// Headline numbers for an account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioStats {
    pub cash: Decimal,
    pub initial_cash: Decimal,
    pub total_realized_pnl: Decimal,
    pub trade_count: usize,
    pub open_positions: usize,
}

impl Account {
    /// Creates a new `Account` with a given amount of starting cash.
    pub fn new(account_id: impl Into<String>, initial_cash: Decimal) -> Self {
        Self {
            account_id: account_id.into(),
            cash: initial_cash,
            positions: BTreeMap::new(),
            trades: Vec::new(),
        }
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn cash(&self) -> Decimal {
        self.cash
    }

    pub fn positions(&self) -> &BTreeMap<String, Position> {
        &self.positions
    }

    /// A simple utility to get a snapshot of a single position.
    pub fn get_position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    /// The append-only trade log, in execution order.
    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    pub fn total_realized_pnl(&self) -> Decimal {
        self.trades.iter().map(|t| t.realized_pnl).sum()
    }

    /// Fails unless the cash balance covers `cost`.
    pub(crate) fn ensure_cash(&self, cost: Decimal) -> Result<(), LedgerError> {
        if cost > self.cash {
            return Err(LedgerError::InsufficientCash {
                required: cost,
                available: self.cash,
            });
        }
        Ok(())
    }

    /// Fails unless `quantity` shares of `symbol` are held.
    pub(crate) fn ensure_shares(&self, symbol: &str, quantity: Decimal) -> Result<&Position, LedgerError> {
        let position = self
            .positions
            .get(symbol)
            .ok_or_else(|| LedgerError::NoPosition(symbol.to_string()))?;

        if quantity > position.quantity {
            return Err(LedgerError::InsufficientShares {
                symbol: symbol.to_string(),
                requested: quantity,
                available: position.quantity,
            });
        }
        Ok(position)
    }

    /// Debits `cost` and adds shares at `price`, re-weighting the average price.
    /// Callers must have checked `ensure_cash` first.
    pub(crate) fn apply_buy(
        &mut self,
        symbol: &str,
        quantity: Decimal,
        price: Decimal,
        cost: Decimal,
        at: DateTime<Utc>,
    ) {
        self.cash -= cost;

        match self.positions.get_mut(symbol) {
            Some(position) => {
                let existing_value = position.avg_price * position.quantity;
                let new_value = price * quantity;
                let total_quantity = position.quantity + quantity;

                position.avg_price = (existing_value + new_value) / total_quantity;
                position.quantity = total_quantity;
                position.last_updated = at;
            }
            None => {
                self.positions
                    .insert(symbol.to_string(), Position::open(symbol, quantity, price, at));
            }
        }
    }

    /// Credits `proceeds` and removes shares. The average price is untouched and
    /// the position disappears once flat. Callers must have checked `ensure_shares` first.
    pub(crate) fn apply_sell(
        &mut self,
        symbol: &str,
        quantity: Decimal,
        proceeds: Decimal,
        at: DateTime<Utc>,
    ) {
        self.cash += proceeds;

        let flat = match self.positions.get_mut(symbol) {
            Some(position) => {
                position.quantity -= quantity;
                position.last_updated = at;
                position.quantity.is_zero()
            }
            None => false,
        };

        if flat {
            self.positions.remove(symbol);
        }
    }

    pub(crate) fn append(&mut self, record: TradeRecord) {
        self.trades.push(record);
    }

    /// Calculates the total equity of the account at a given set of market prices.
    /// Equity = Cash + Market Value of all open positions.
    pub fn calculate_total_equity(&self, market_prices: &HashMap<String, Decimal>) -> Decimal {
        self.cash + self.snapshot(market_prices).positions_value()
    }

    /// Plain-data view of the account. Positions without a market price are
    /// valued at their average cost.
    pub fn snapshot(&self, market_prices: &HashMap<String, Decimal>) -> AccountSnapshot {
        let positions = self
            .positions
            .iter()
            .map(|(symbol, position)| {
                let mark = market_prices.get(symbol).copied().unwrap_or_else(|| {
                    tracing::debug!(%symbol, "No market price, valuing position at cost");
                    position.avg_price
                });
                (
                    symbol.clone(),
                    PositionSnapshot {
                        quantity: position.quantity,
                        avg_price: position.avg_price,
                        market_value: position.market_value(mark),
                    },
                )
            })
            .collect();

        AccountSnapshot {
            account_id: self.account_id.clone(),
            cash: self.cash,
            positions,
        }
    }

    pub fn stats(&self, initial_cash: Decimal) -> PortfolioStats {
        PortfolioStats {
            cash: self.cash,
            initial_cash,
            total_realized_pnl: self.total_realized_pnl(),
            trade_count: self.trades.len(),
            open_positions: self.positions.len(),
        }
    }
}
