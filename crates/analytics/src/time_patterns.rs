use crate::buckets::{BucketMap, DayOfWeek, OutcomeBucket, day_of, hour_of};
use crate::equity::closed_trades;
use core_types::{AssetClass, TradeRecord};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssetClassPatterns {
    pub trade_count: usize,
    pub total_pnl: Decimal,
    pub by_hour: BucketMap<u32, OutcomeBucket>,
    pub by_day: BucketMap<DayOfWeek, OutcomeBucket>,
}

impl AssetClassPatterns {
    fn record(&mut self, trade: &TradeRecord, class: AssetClass) {
        self.trade_count += 1;
        self.total_pnl += trade.realized_pnl;

        // Midnight fills are settlement artifacts, not trading activity.
        let hour = hour_of(trade);
        if hour != 0 {
            self.by_hour.touch(hour).record(trade.realized_pnl);
        }

        let day = day_of(trade);
        if class.trades_on_weekends() || !day.is_weekend() {
            self.by_day.touch(day).record(trade.realized_pnl);
        }
    }
}

/// Closed-trade outcomes by hour of day and day of week, per asset class.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimePatterns {
    pub equities: AssetClassPatterns,
    pub crypto: AssetClassPatterns,
}

impl TimePatterns {
    pub fn for_class(&self, class: AssetClass) -> &AssetClassPatterns {
        match class {
            AssetClass::Equities => &self.equities,
            AssetClass::Crypto => &self.crypto,
        }
    }
}

pub fn time_patterns<S: AsRef<str>>(trades: &[TradeRecord], crypto_markers: &[S]) -> TimePatterns {
    let mut patterns = TimePatterns::default();
    for trade in closed_trades(trades) {
        let class = AssetClass::classify(&trade.symbol, crypto_markers);
        let bucket = match class {
            AssetClass::Equities => &mut patterns.equities,
            AssetClass::Crypto => &mut patterns.crypto,
        };
        bucket.record(trade, class);
    }
    patterns
}
