use crate::buckets::BucketMap;
use crate::equity::closed_pnls;
use crate::stats::{profit_factor, ratio, win_rate};
use core_types::TradeRecord;
use rust_decimal::Decimal;
use serde::Serialize;

/// Headline numbers over a whole trade log.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub total_trades: usize,
    pub closed_trades: usize,
    pub open_trades: usize,
    /// Fraction of closed trades that won, 0..=1.
    pub win_rate: Decimal,
    /// Zero without closed trades; 999 when nothing lost.
    pub profit_factor: Decimal,
    pub total_pnl: Decimal,
    pub gross_profit: Decimal,
    pub gross_loss: Decimal,
    pub average_win: Decimal,
    /// Absolute mean of the losing trades.
    pub average_loss: Decimal,
    pub winning_trades: usize,
    pub losing_trades: usize,
}

pub fn performance_summary(trades: &[TradeRecord]) -> PerformanceSummary {
    let pnls = closed_pnls(trades);
    let wins: Vec<Decimal> = pnls.iter().copied().filter(|p| *p > Decimal::ZERO).collect();
    let losses: Vec<Decimal> = pnls.iter().copied().filter(|p| *p < Decimal::ZERO).collect();
    let gross_profit: Decimal = wins.iter().sum();
    let gross_loss: Decimal = losses.iter().map(|l| l.abs()).sum();

    PerformanceSummary {
        total_trades: trades.len(),
        closed_trades: pnls.len(),
        open_trades: trades.len() - pnls.len(),
        win_rate: win_rate(&pnls),
        profit_factor: if pnls.is_empty() {
            Decimal::ZERO
        } else {
            profit_factor(&pnls)
        },
        total_pnl: trades.iter().map(|t| t.realized_pnl).sum(),
        gross_profit,
        gross_loss,
        average_win: ratio(gross_profit, Decimal::from(wins.len())),
        average_loss: ratio(gross_loss, Decimal::from(losses.len())),
        winning_trades: wins.len(),
        losing_trades: losses.len(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SymbolPerformance {
    /// Every trade in the symbol, buys included.
    pub trade_count: usize,
    pub winning_trades: usize,
    pub total_pnl: Decimal,
    /// Sum of gross values traded.
    pub total_volume: Decimal,
    pub win_rate: Decimal,
    pub expectancy_per_trade: Decimal,
}

/// Per-symbol totals over all trades. Open trades count toward the trade
/// count, so they dilute the win rate and the expectancy.
pub fn symbol_performance(trades: &[TradeRecord]) -> BucketMap<String, SymbolPerformance> {
    let mut by_symbol: BucketMap<String, SymbolPerformance> = BucketMap::new();
    for trade in trades {
        let entry = by_symbol.touch(trade.symbol.clone());
        entry.trade_count += 1;
        if trade.is_win() {
            entry.winning_trades += 1;
        }
        entry.total_pnl += trade.realized_pnl;
        entry.total_volume += trade.gross_value;
    }

    by_symbol.map_values(|mut perf| {
        let count = Decimal::from(perf.trade_count);
        perf.win_rate = ratio(Decimal::from(perf.winning_trades), count);
        perf.expectancy_per_trade = ratio(perf.total_pnl, count);
        perf
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{closed_series, trade};
    use core_types::OrderSide;
    use rust_decimal_macros::dec;

    #[test]
    fn summary_of_mixed_outcomes() {
        let mut trades = closed_series("AAPL", &[dec!(500), dec!(-200), dec!(300), dec!(-800), dec!(100)]);
        trades.push(trade("AAPL", OrderSide::Buy, dec!(1), dec!(10), dec!(0), "2024-01-03", "09:00:00"));
        let summary = performance_summary(&trades);

        assert_eq!(summary.total_trades, 6);
        assert_eq!(summary.closed_trades, 5);
        assert_eq!(summary.open_trades, 1);
        assert_eq!(summary.win_rate, dec!(0.6));
        assert_eq!(summary.profit_factor, dec!(0.9));
        assert_eq!(summary.total_pnl, dec!(-100));
        assert_eq!(summary.average_win, dec!(300));
        assert_eq!(summary.average_loss, dec!(500));
    }

    #[test]
    fn profit_factor_is_zero_without_closed_trades_and_saturates_without_losses() {
        assert_eq!(performance_summary(&[]).profit_factor, Decimal::ZERO);
        let winners = closed_series("AAPL", &[dec!(5), dec!(7)]);
        assert_eq!(performance_summary(&winners).profit_factor, dec!(999));
    }

    #[test]
    fn symbol_performance_includes_open_trades() {
        let trades = vec![
            trade("AAPL", OrderSide::Buy, dec!(10), dec!(100), dec!(0), "2024-01-02", "10:00:00"),
            trade("AAPL", OrderSide::Sell, dec!(10), dec!(120), dec!(200), "2024-01-02", "11:00:00"),
            trade("MSFT", OrderSide::Buy, dec!(2), dec!(50), dec!(0), "2024-01-02", "12:00:00"),
        ];
        let perf = symbol_performance(&trades);

        let aapl = perf.get(&"AAPL".to_string()).unwrap();
        assert_eq!(aapl.trade_count, 2);
        assert_eq!(aapl.total_volume, dec!(2200));
        assert_eq!(aapl.win_rate, dec!(0.5));
        assert_eq!(aapl.expectancy_per_trade, dec!(100));
        assert_eq!(perf.get(&"MSFT".to_string()).unwrap().total_pnl, Decimal::ZERO);
    }
}
