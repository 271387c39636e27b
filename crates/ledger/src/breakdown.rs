use crate::lot_matcher::{LotAllocation, fifo_realized_pnl};
use chrono::NaiveDate;
use core_types::{OrderSide, TradeRecord};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedBuy {
    pub buy_trade_id: Uuid,
    pub buy_date: NaiveDate,
    pub buy_price: Decimal,
    pub buy_quantity: Decimal,
    /// How much of this buy the sell was attributed.
    pub attributed_quantity: Decimal,
    pub commission: Decimal,
}

/// Audit view of one sell and the buys it was matched against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SellBreakdown {
    pub sell_trade_id: Uuid,
    pub symbol: String,
    pub sell_date: NaiveDate,
    pub sell_price: Decimal,
    pub sell_quantity: Decimal,
    pub matched_buys: Vec<MatchedBuy>,
    /// Average-cost P&L, as booked by the ledger.
    pub realized_pnl: Decimal,
    /// P&L under FIFO cost of the matched lots.
    pub fifo_realized_pnl: Decimal,
    /// Sell commission plus the commissions of every matched buy.
    pub commission_total: Decimal,
}

/// Builds the audit report from a trade log alone.
///
/// Attributed quantities are re-derived by walking each sell's matched buys in
/// order, which is exact for logs written with historical lot matching.
pub fn pnl_breakdown(trades: &[TradeRecord]) -> Vec<SellBreakdown> {
    let by_id = index(trades);
    breakdown_with(trades, |sell| {
        let mut remaining = sell.quantity;
        let allocations = sell
            .matched_trade_ids
            .iter()
            .filter_map(|id| by_id.get(id))
            .map(|buy| {
                let quantity = buy.quantity.min(remaining);
                remaining -= quantity;
                LotAllocation {
                    buy_trade_id: buy.trade_id,
                    quantity,
                    price: buy.price,
                }
            })
            .collect();
        Some(allocations)
    })
}

pub(crate) fn breakdown_with<F>(trades: &[TradeRecord], allocations_for: F) -> Vec<SellBreakdown>
where
    F: Fn(&TradeRecord) -> Option<Vec<LotAllocation>>,
{
    let by_id = index(trades);

    trades
        .iter()
        .filter(|t| t.side == OrderSide::Sell && !t.matched_trade_ids.is_empty())
        .map(|sell| {
            let allocations = allocations_for(sell).unwrap_or_default();
            let matched_buys: Vec<MatchedBuy> = allocations
                .iter()
                .filter_map(|allocation| {
                    by_id.get(&allocation.buy_trade_id).map(|buy| MatchedBuy {
                        buy_trade_id: buy.trade_id,
                        buy_date: buy.trade_date,
                        buy_price: buy.price,
                        buy_quantity: buy.quantity,
                        attributed_quantity: allocation.quantity,
                        commission: buy.commission,
                    })
                })
                .collect();

            let commission_total =
                sell.commission + matched_buys.iter().map(|b| b.commission).sum::<Decimal>();

            SellBreakdown {
                sell_trade_id: sell.trade_id,
                symbol: sell.symbol.clone(),
                sell_date: sell.trade_date,
                sell_price: sell.price,
                sell_quantity: sell.quantity,
                realized_pnl: sell.realized_pnl,
                fifo_realized_pnl: fifo_realized_pnl(sell.price, &allocations),
                commission_total,
                matched_buys,
            }
        })
        .collect()
}

fn index(trades: &[TradeRecord]) -> HashMap<Uuid, &TradeRecord> {
    trades.iter().map(|t| (t.trade_id, t)).collect()
}
