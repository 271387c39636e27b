use crate::buckets::{BucketMap, DayOfWeek, day_of, hour_of};
use crate::equity::closed_trades;
use crate::stats::ratio;
use core_types::TradeRecord;
use rust_decimal::Decimal;
use serde::Serialize;

/// What an average closed trade in this bucket is worth.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExpectancyBucket {
    pub trade_count: usize,
    pub total_pnl: Decimal,
    pub avg_dollar_per_trade: Decimal,
    pub win_rate: Decimal,
    pub average_win: Decimal,
    /// Mean of the losing trades, kept negative.
    pub average_loss: Decimal,
    /// `avg_dollar_per_trade` in units of the fixed risk per trade.
    pub r_expectancy: Decimal,
    #[serde(skip)]
    wins: Vec<Decimal>,
    #[serde(skip)]
    losses: Vec<Decimal>,
}

impl ExpectancyBucket {
    fn record(&mut self, pnl: Decimal) {
        self.trade_count += 1;
        self.total_pnl += pnl;
        if pnl > Decimal::ZERO {
            self.wins.push(pnl);
        } else if pnl < Decimal::ZERO {
            self.losses.push(pnl);
        }
    }

    fn finish(mut self, risk_per_trade: Decimal) -> Self {
        let count = Decimal::from(self.trade_count);
        self.avg_dollar_per_trade = ratio(self.total_pnl, count);
        self.win_rate = ratio(Decimal::from(self.wins.len()), count);
        self.average_win = ratio(self.wins.iter().sum(), Decimal::from(self.wins.len()));
        self.average_loss = ratio(self.losses.iter().sum(), Decimal::from(self.losses.len()));
        self.r_expectancy = ratio(self.avg_dollar_per_trade, risk_per_trade);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExpectancyReport {
    pub by_symbol: BucketMap<String, ExpectancyBucket>,
    pub by_hour: BucketMap<u32, ExpectancyBucket>,
    pub by_weekday: BucketMap<DayOfWeek, ExpectancyBucket>,
}

/// Buckets closed trades by symbol, hour and weekday independently. Unlike
/// the time patterns, no hour or day is filtered out.
pub fn expectancy(trades: &[TradeRecord], risk_per_trade: Decimal) -> ExpectancyReport {
    let mut by_symbol: BucketMap<String, ExpectancyBucket> = BucketMap::new();
    let mut by_hour: BucketMap<u32, ExpectancyBucket> = BucketMap::new();
    let mut by_weekday: BucketMap<DayOfWeek, ExpectancyBucket> = BucketMap::new();

    for trade in closed_trades(trades) {
        by_symbol.touch(trade.symbol.clone()).record(trade.realized_pnl);
        by_hour.touch(hour_of(trade)).record(trade.realized_pnl);
        by_weekday.touch(day_of(trade)).record(trade.realized_pnl);
    }

    let finish = |bucket: ExpectancyBucket| bucket.finish(risk_per_trade);
    ExpectancyReport {
        by_symbol: by_symbol.map_values(finish),
        by_hour: by_hour.map_values(finish),
        by_weekday: by_weekday.map_values(finish),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::closed_trade;
    use chrono::Weekday;
    use rust_decimal_macros::dec;

    #[test]
    fn per_symbol_expectancy_in_dollars_and_r() {
        let trades = vec![
            closed_trade("AAPL", dec!(300), "2024-01-02", "10:00:00"),
            closed_trade("AAPL", dec!(-100), "2024-01-02", "11:00:00"),
            closed_trade("AAPL", dec!(100), "2024-01-03", "00:15:00"),
            closed_trade("MSFT", dec!(-50), "2024-01-03", "10:30:00"),
        ];
        let report = expectancy(&trades, dec!(100));

        let aapl = report.by_symbol.get(&"AAPL".to_string()).unwrap();
        assert_eq!(aapl.trade_count, 3);
        assert_eq!(aapl.avg_dollar_per_trade.round_dp(4), dec!(100));
        assert_eq!(aapl.average_win, dec!(200));
        assert_eq!(aapl.average_loss, dec!(-100));
        assert_eq!(aapl.r_expectancy, dec!(1));

        let msft = report.by_symbol.get(&"MSFT".to_string()).unwrap();
        assert_eq!(msft.win_rate, Decimal::ZERO);
        assert_eq!(msft.average_win, Decimal::ZERO);

        // Midnight is kept here.
        assert_eq!(report.by_hour.get(&0).unwrap().trade_count, 1);
        assert_eq!(report.by_hour.get(&10).unwrap().trade_count, 2);
        assert_eq!(report.by_weekday.get(&DayOfWeek(Weekday::Wed)).unwrap().total_pnl, dec!(50));
    }

    #[test]
    fn no_closed_trades_means_no_buckets() {
        let report = expectancy(&[], dec!(100));
        assert!(report.by_symbol.is_empty());
        assert!(report.by_hour.is_empty());
        assert!(report.by_weekday.is_empty());
    }
}
