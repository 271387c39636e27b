use crate::enums::OrderSide;
use crate::error::CoreError;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A request to trade at an already-resolved price.
///
/// Resolving a market price is the caller's job; the ledger only ever sees a
/// positive price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: Decimal,
    pub price: Decimal,
    #[serde(default)]
    pub commission: Decimal,
}

impl TradeRequest {
    pub fn new(symbol: impl Into<String>, side: OrderSide, quantity: Decimal, price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            quantity,
            price,
            commission: Decimal::ZERO,
        }
    }

    pub fn buy(symbol: impl Into<String>, quantity: Decimal, price: Decimal) -> Self {
        Self::new(symbol, OrderSide::Buy, quantity, price)
    }

    pub fn sell(symbol: impl Into<String>, quantity: Decimal, price: Decimal) -> Self {
        Self::new(symbol, OrderSide::Sell, quantity, price)
    }

    pub fn with_commission(mut self, commission: Decimal) -> Self {
        self.commission = commission;
        self
    }

    pub fn gross_value(&self) -> Decimal {
        self.quantity * self.price
    }

    /// Checks the request in isolation, before any account state is consulted.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.symbol.trim().is_empty() {
            return Err(CoreError::invalid("symbol", "must not be empty"));
        }
        if self.quantity <= Decimal::ZERO {
            return Err(CoreError::invalid(
                "quantity",
                format!("must be positive, got {}", self.quantity),
            ));
        }
        if self.price <= Decimal::ZERO {
            return Err(CoreError::invalid(
                "price",
                format!("must be positive, got {}", self.price),
            ));
        }
        if self.commission < Decimal::ZERO {
            return Err(CoreError::invalid(
                "commission",
                format!("must not be negative, got {}", self.commission),
            ));
        }
        Ok(())
    }
}

/// An executed trade. Created only by the ledger and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub trade_id: Uuid,
    pub account_id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: Decimal,
    pub price: Decimal,
    pub commission: Decimal,
    pub trade_date: NaiveDate,
    pub trade_time: NaiveTime,
    pub gross_value: Decimal,
    /// Gross plus commission for buys, gross minus commission for sells.
    pub net_value: Decimal,
    /// Average-cost P&L booked by a sell. Zero for buys.
    pub realized_pnl: Decimal,
    /// Buy trades this sell was attributed against, oldest first.
    #[serde(default)]
    pub matched_trade_ids: Vec<Uuid>,
    /// When the position this sell reduced was first opened.
    #[serde(default)]
    pub opened_at: Option<DateTime<Utc>>,
}

impl TradeRecord {
    pub fn net_value_for(side: OrderSide, gross_value: Decimal, commission: Decimal) -> Decimal {
        match side {
            OrderSide::Buy => gross_value + commission,
            OrderSide::Sell => gross_value - commission,
        }
    }

    /// A non-zero realized P&L is what marks a trade as closed for analytics.
    /// A sell that breaks even exactly therefore counts as open.
    pub fn is_closed(&self) -> bool {
        !self.realized_pnl.is_zero()
    }

    pub fn is_buy(&self) -> bool {
        self.side == OrderSide::Buy
    }

    pub fn is_win(&self) -> bool {
        self.realized_pnl > Decimal::ZERO
    }

    pub fn executed_at(&self) -> DateTime<Utc> {
        self.trade_date.and_time(self.trade_time).and_utc()
    }

    /// The only ordering key. Equal keys keep insertion order (stable sorts).
    pub fn chronological_key(&self) -> (NaiveDate, NaiveTime) {
        (self.trade_date, self.trade_time)
    }

    /// Time between opening the position and this trade, when known.
    pub fn holding_period(&self) -> Option<Duration> {
        self.opened_at.map(|opened| self.executed_at() - opened)
    }

    /// Rejects records that would pollute aggregate statistics.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.trade_id.is_nil() {
            return Err(CoreError::invalid("trade_id", "must not be nil"));
        }
        if self.account_id.trim().is_empty() {
            return Err(CoreError::invalid("account_id", "must not be empty"));
        }
        if self.symbol.trim().is_empty() {
            return Err(CoreError::invalid("symbol", "must not be empty"));
        }
        if self.quantity <= Decimal::ZERO {
            return Err(CoreError::invalid(
                "quantity",
                format!("must be positive on trade {}", self.trade_id),
            ));
        }
        if self.price <= Decimal::ZERO {
            return Err(CoreError::invalid(
                "price",
                format!("must be positive on trade {}", self.trade_id),
            ));
        }
        if self.commission < Decimal::ZERO {
            return Err(CoreError::invalid(
                "commission",
                format!("must not be negative on trade {}", self.trade_id),
            ));
        }
        if self.gross_value != self.quantity * self.price {
            return Err(CoreError::invalid(
                "gross_value",
                format!(
                    "{} does not equal quantity x price on trade {}",
                    self.gross_value, self.trade_id
                ),
            ));
        }
        if self.is_buy() && (!self.realized_pnl.is_zero() || !self.matched_trade_ids.is_empty()) {
            return Err(CoreError::invalid(
                "realized_pnl",
                format!("buy trade {} cannot realize P&L or match lots", self.trade_id),
            ));
        }
        Ok(())
    }
}

/// An open holding in a single symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub quantity: Decimal,
    /// Weighted average cost of the shares currently held.
    pub avg_price: Decimal,
    /// Earliest opening event. Survives partial sells.
    pub first_purchase: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl Position {
    pub fn open(symbol: impl Into<String>, quantity: Decimal, price: Decimal, at: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            avg_price: price,
            first_purchase: at,
            last_updated: at,
        }
    }

    pub fn cost_basis(&self) -> Decimal {
        self.quantity * self.avg_price
    }

    pub fn market_value(&self, mark: Decimal) -> Decimal {
        self.quantity * mark
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub quantity: Decimal,
    pub avg_price: Decimal,
    pub market_value: Decimal,
}

/// A plain-data view of an account, as consumed by the analytics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AccountSnapshot {
    #[serde(default)]
    pub account_id: String,
    pub cash: Decimal,
    #[serde(default)]
    pub positions: BTreeMap<String, PositionSnapshot>,
}

impl AccountSnapshot {
    pub fn positions_value(&self) -> Decimal {
        self.positions.values().map(|p| p.market_value).sum()
    }

    /// Cash plus the market value of every open position.
    pub fn total_capital(&self) -> Decimal {
        self.cash + self.positions_value()
    }
}
