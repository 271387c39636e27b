use chrono::{NaiveDate, NaiveTime};
use core_types::TradeRecord;
use rust_decimal::Decimal;
use serde::Serialize;

/// Closed trades (non-zero realized P&L) in chronological order.
///
/// The sort is stable, so trades sharing a date and time keep their log order.
pub fn closed_trades(trades: &[TradeRecord]) -> Vec<&TradeRecord> {
    let mut closed: Vec<&TradeRecord> = trades.iter().filter(|t| t.is_closed()).collect();
    closed.sort_by_key(|t| t.chronological_key());
    closed
}

/// Realized P&L of the closed trades, in chronological order.
pub fn closed_pnls(trades: &[TradeRecord]) -> Vec<Decimal> {
    closed_trades(trades).iter().map(|t| t.realized_pnl).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub trade_date: NaiveDate,
    pub trade_time: NaiveTime,
    pub symbol: String,
    pub realized_pnl: Decimal,
    pub cumulative_pnl: Decimal,
}

/// Cumulative realized P&L after each closed trade.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EquityCurve {
    pub points: Vec<EquityPoint>,
}

impl EquityCurve {
    pub fn build(trades: &[TradeRecord]) -> Self {
        let mut cumulative = Decimal::ZERO;
        let points = closed_trades(trades)
            .into_iter()
            .map(|trade| {
                cumulative += trade.realized_pnl;
                EquityPoint {
                    trade_date: trade.trade_date,
                    trade_time: trade.trade_time,
                    symbol: trade.symbol.clone(),
                    realized_pnl: trade.realized_pnl,
                    cumulative_pnl: cumulative,
                }
            })
            .collect();
        Self { points }
    }

    pub fn values(&self) -> Vec<Decimal> {
        self.points.iter().map(|p| p.cumulative_pnl).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::closed_trade;
    use rust_decimal_macros::dec;

    #[test]
    fn running_sum_in_time_order() {
        let trades = vec![
            closed_trade("AAPL", dec!(-200), "2024-01-02", "11:00:00"),
            closed_trade("AAPL", dec!(500), "2024-01-02", "10:00:00"),
            closed_trade("MSFT", dec!(300), "2024-01-03", "09:30:00"),
        ];
        assert_eq!(EquityCurve::build(&trades).values(), vec![dec!(500), dec!(300), dec!(600)]);
    }

    #[test]
    fn open_trades_are_skipped_and_ties_keep_log_order() {
        let mut open = closed_trade("AAPL", dec!(0), "2024-01-02", "10:00:00");
        open.realized_pnl = Decimal::ZERO;
        let trades = vec![
            closed_trade("AAPL", dec!(10), "2024-01-02", "10:00:00"),
            open,
            closed_trade("MSFT", dec!(-4), "2024-01-02", "10:00:00"),
        ];
        let curve = EquityCurve::build(&trades);
        assert_eq!(curve.values(), vec![dec!(10), dec!(6)]);
        assert_eq!(curve.points[1].symbol, "MSFT");
    }

    #[test]
    fn empty_log_gives_empty_curve() {
        assert!(EquityCurve::build(&[]).is_empty());
    }
}
