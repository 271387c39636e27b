use crate::stats::ratio;
use chrono::{Datelike, NaiveDate, Timelike, Weekday};
use core_types::TradeRecord;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// A weekday that sorts Monday first and serializes by its full name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DayOfWeek(pub Weekday);

impl DayOfWeek {
    pub fn of(date: NaiveDate) -> Self {
        Self(date.weekday())
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self.0, Weekday::Sat | Weekday::Sun)
    }

    pub fn name(&self) -> &'static str {
        match self.0 {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }
}

impl Ord for DayOfWeek {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .num_days_from_monday()
            .cmp(&other.0.num_days_from_monday())
    }
}

impl PartialOrd for DayOfWeek {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for DayOfWeek {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

pub(crate) fn hour_of(trade: &TradeRecord) -> u32 {
    trade.trade_time.hour()
}

pub(crate) fn day_of(trade: &TradeRecord) -> DayOfWeek {
    DayOfWeek::of(trade.trade_date)
}

/// Ordered buckets that come into existence, at their default value, the
/// first time a key is touched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BucketMap<K: Ord, V> {
    buckets: BTreeMap<K, V>,
}

impl<K: Ord, V> Default for BucketMap<K, V> {
    fn default() -> Self {
        Self {
            buckets: BTreeMap::new(),
        }
    }
}

impl<K: Ord, V> BucketMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.buckets.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.buckets.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.buckets.keys()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn map_values<W>(self, mut f: impl FnMut(V) -> W) -> BucketMap<K, W> {
        BucketMap {
            buckets: self.buckets.into_iter().map(|(k, v)| (k, f(v))).collect(),
        }
    }
}

impl<K: Ord, V: Default> BucketMap<K, V> {
    pub fn touch(&mut self, key: K) -> &mut V {
        self.buckets.entry(key).or_default()
    }
}

/// Trade count, summed P&L and win rate of one bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutcomeBucket {
    pub trade_count: usize,
    pub winning_trades: usize,
    pub total_pnl: Decimal,
    /// Fraction of trades with positive P&L, 0..=1.
    pub win_rate: Decimal,
}

impl OutcomeBucket {
    pub fn record(&mut self, pnl: Decimal) {
        self.trade_count += 1;
        if pnl > Decimal::ZERO {
            self.winning_trades += 1;
        }
        self.total_pnl += pnl;
        self.win_rate = ratio(Decimal::from(self.winning_trades), Decimal::from(self.trade_count));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn days_sort_monday_first_and_serialize_by_name() {
        let mut map: BucketMap<DayOfWeek, usize> = BucketMap::new();
        *map.touch(DayOfWeek(Weekday::Sun)) += 1;
        *map.touch(DayOfWeek(Weekday::Mon)) += 2;

        let keys: Vec<_> = map.keys().map(DayOfWeek::name).collect();
        assert_eq!(keys, vec!["Monday", "Sunday"]);
        assert!(DayOfWeek(Weekday::Sat).is_weekend());
    }

    #[test]
    fn touch_creates_default_entries_once() {
        let mut map: BucketMap<u32, OutcomeBucket> = BucketMap::new();
        map.touch(14).record(dec!(50));
        map.touch(14).record(dec!(-20));

        let bucket = map.get(&14).unwrap();
        assert_eq!(bucket.trade_count, 2);
        assert_eq!(bucket.total_pnl, dec!(30));
        assert_eq!(bucket.win_rate, dec!(0.5));
        assert_eq!(map.len(), 1);
    }
}
