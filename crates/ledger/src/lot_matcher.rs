//! FIFO attribution of sells to the buy lots they close.
//!
//! Two flavours live here:
//!
//! - [`allocate_fifo`] re-scans the whole trade log on every sell. Buy lots are
//!   never marked as consumed, so two sells can both claim the same buy. This is
//!   the audit trail the ledger writes by default.
//! - [`OpenLotBook`] keeps the remaining quantity of every open lot and consumes
//!   it as sells arrive, so the attribution never exceeds a lot's size.
//!
//! Neither affects the realized P&L booked by the ledger, which uses the average
//! cost of the position.

use core_types::{OrderSide, TradeRecord};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use uuid::Uuid;

/// The part of a sell attributed to one buy lot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LotAllocation {
    pub buy_trade_id: Uuid,
    pub quantity: Decimal,
    pub price: Decimal,
}

/// Attributes `sell_quantity` to the oldest buys of `symbol` in `trade_log`.
///
/// Every buy touched, even partially, is included. Buys are visited in
/// chronological order with log order breaking ties. No buys yields an empty list.
pub fn allocate_fifo(symbol: &str, sell_quantity: Decimal, trade_log: &[TradeRecord]) -> Vec<LotAllocation> {
    let mut buys: Vec<&TradeRecord> = trade_log
        .iter()
        .filter(|t| t.side == OrderSide::Buy && t.symbol == symbol)
        .collect();
    buys.sort_by_key(|t| t.chronological_key());

    let mut allocations = Vec::new();
    let mut remaining = sell_quantity;

    for buy in buys {
        if remaining <= Decimal::ZERO {
            break;
        }
        let quantity = buy.quantity.min(remaining);
        remaining -= quantity;
        allocations.push(LotAllocation {
            buy_trade_id: buy.trade_id,
            quantity,
            price: buy.price,
        });
    }

    allocations
}

/// The ids of the buys [`allocate_fifo`] attributes the sell to, oldest first.
pub fn match_fifo(symbol: &str, sell_quantity: Decimal, trade_log: &[TradeRecord]) -> Vec<Uuid> {
    allocate_fifo(symbol, sell_quantity, trade_log)
        .into_iter()
        .map(|a| a.buy_trade_id)
        .collect()
}

/// Realized P&L of a sell under FIFO cost, given its lot allocations.
///
/// This intentionally differs from the ledger's average-cost figure whenever the
/// matched lots were bought at different prices.
pub fn fifo_realized_pnl(sell_price: Decimal, allocations: &[LotAllocation]) -> Decimal {
    allocations
        .iter()
        .map(|a| (sell_price - a.price) * a.quantity)
        .sum()
}

#[derive(Debug, Clone, PartialEq)]
struct OpenLot {
    buy_trade_id: Uuid,
    remaining: Decimal,
    price: Decimal,
}

/// Open buy lots per symbol, oldest at the front.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpenLotBook {
    lots: BTreeMap<String, VecDeque<OpenLot>>,
}

impl OpenLotBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the book by replaying a trade log in order.
    pub fn from_log(trade_log: &[TradeRecord]) -> Self {
        let mut book = Self::new();
        for trade in trade_log {
            match trade.side {
                OrderSide::Buy => book.open(trade),
                OrderSide::Sell => {
                    book.consume(&trade.symbol, trade.quantity);
                }
            }
        }
        book
    }

    pub fn open(&mut self, buy: &TradeRecord) {
        self.lots.entry(buy.symbol.clone()).or_default().push_back(OpenLot {
            buy_trade_id: buy.trade_id,
            remaining: buy.quantity,
            price: buy.price,
        });
    }

    /// Takes `quantity` out of the oldest lots of `symbol`. Lots that are used up
    /// leave the book. If the book holds less than `quantity`, what is there is
    /// allocated.
    pub fn consume(&mut self, symbol: &str, quantity: Decimal) -> Vec<LotAllocation> {
        let mut allocations = Vec::new();
        let Some(queue) = self.lots.get_mut(symbol) else {
            return allocations;
        };

        let mut remaining = quantity;
        while remaining > Decimal::ZERO {
            let Some(lot) = queue.front_mut() else {
                break;
            };
            let taken = lot.remaining.min(remaining);
            lot.remaining -= taken;
            remaining -= taken;
            allocations.push(LotAllocation {
                buy_trade_id: lot.buy_trade_id,
                quantity: taken,
                price: lot.price,
            });
            if lot.remaining.is_zero() {
                queue.pop_front();
            }
        }

        if queue.is_empty() {
            self.lots.remove(symbol);
        }
        allocations
    }

    /// Quantity still open in `symbol`.
    pub fn remaining(&self, symbol: &str) -> Decimal {
        self.lots
            .get(symbol)
            .map(|q| q.iter().map(|l| l.remaining).sum())
            .unwrap_or(Decimal::ZERO)
    }

    pub fn open_lot_count(&self, symbol: &str) -> usize {
        self.lots.get(symbol).map_or(0, VecDeque::len)
    }

    pub fn clear(&mut self) {
        self.lots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal_macros::dec;

    fn trade(symbol: &str, side: OrderSide, quantity: Decimal, price: Decimal, minute: u32) -> TradeRecord {
        let gross = quantity * price;
        TradeRecord {
            trade_id: Uuid::new_v4(),
            account_id: "acct".into(),
            symbol: symbol.into(),
            side,
            quantity,
            price,
            commission: Decimal::ZERO,
            trade_date: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            trade_time: NaiveTime::from_hms_opt(10, minute, 0).unwrap(),
            gross_value: gross,
            net_value: gross,
            realized_pnl: Decimal::ZERO,
            matched_trade_ids: Vec::new(),
            opened_at: None,
        }
    }

    #[test]
    fn touches_every_lot_needed_oldest_first() {
        let first = trade("AAPL", OrderSide::Buy, dec!(10), dec!(100), 1);
        let other = trade("MSFT", OrderSide::Buy, dec!(10), dec!(300), 2);
        let second = trade("AAPL", OrderSide::Buy, dec!(10), dec!(120), 3);
        let log = vec![first.clone(), other, second.clone()];

        let allocations = allocate_fifo("AAPL", dec!(15), &log);
        assert_eq!(
            allocations,
            vec![
                LotAllocation { buy_trade_id: first.trade_id, quantity: dec!(10), price: dec!(100) },
                LotAllocation { buy_trade_id: second.trade_id, quantity: dec!(5), price: dec!(120) },
            ]
        );
        assert_eq!(fifo_realized_pnl(dec!(150), &allocations), dec!(650));
    }

    #[test]
    fn chronology_beats_log_order() {
        let late = trade("AAPL", OrderSide::Buy, dec!(5), dec!(110), 30);
        let early = trade("AAPL", OrderSide::Buy, dec!(5), dec!(100), 5);
        let log = vec![late.clone(), early.clone()];

        assert_eq!(match_fifo("AAPL", dec!(3), &log), vec![early.trade_id]);
    }

    #[test]
    fn no_buys_means_no_matches() {
        let log = vec![trade("MSFT", OrderSide::Buy, dec!(1), dec!(1), 0)];
        assert!(match_fifo("AAPL", dec!(1), &log).is_empty());
        assert!(match_fifo("AAPL", dec!(1), &[]).is_empty());
    }

    #[test]
    fn historical_rescan_reclaims_already_sold_lots() {
        let first = trade("AAPL", OrderSide::Buy, dec!(10), dec!(100), 1);
        let second = trade("AAPL", OrderSide::Buy, dec!(10), dec!(120), 2);
        let log = vec![first.clone(), second.clone()];

        // Two sells of 10 both land on the first lot.
        assert_eq!(match_fifo("AAPL", dec!(10), &log), vec![first.trade_id]);
        assert_eq!(match_fifo("AAPL", dec!(10), &log), vec![first.trade_id]);
    }

    #[test]
    fn consuming_book_never_reuses_a_lot() {
        let first = trade("AAPL", OrderSide::Buy, dec!(10), dec!(100), 1);
        let second = trade("AAPL", OrderSide::Buy, dec!(10), dec!(120), 2);
        let mut book = OpenLotBook::new();
        book.open(&first);
        book.open(&second);

        let a = book.consume("AAPL", dec!(15));
        assert_eq!(a.len(), 2);
        assert_eq!(book.remaining("AAPL"), dec!(5));
        assert_eq!(book.open_lot_count("AAPL"), 1);

        let b = book.consume("AAPL", dec!(5));
        assert_eq!(
            b,
            vec![LotAllocation { buy_trade_id: second.trade_id, quantity: dec!(5), price: dec!(120) }]
        );
        assert_eq!(book.remaining("AAPL"), Decimal::ZERO);
        assert!(book.consume("AAPL", dec!(1)).is_empty());
    }

    #[test]
    fn book_rebuilds_from_log() {
        let buy = trade("AAPL", OrderSide::Buy, dec!(10), dec!(100), 1);
        let sell = trade("AAPL", OrderSide::Sell, dec!(4), dec!(130), 2);
        let book = OpenLotBook::from_log(&[buy, sell]);
        assert_eq!(book.remaining("AAPL"), dec!(6));
    }
}
