//! Distribution views over the closed trades: R-multiples, Pareto
//! concentration, holding periods and capital exposure.

use crate::buckets::{BucketMap, DayOfWeek, day_of, hour_of};
use crate::equity::{closed_pnls, closed_trades};
use crate::stats::{mean, percent, ratio};
use chrono::Duration;
use core_types::{AccountSnapshot, TradeRecord};
use rust_decimal::Decimal;
use serde::Serialize;

// ---------------------------------------------------------------------------
// R-multiples
// ---------------------------------------------------------------------------

/// Trade counts per R band. R is P&L divided by a fixed nominal risk, not by
/// the risk actually taken on the position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RBuckets {
    pub negative: usize,
    #[serde(rename = "0_to_1r")]
    pub zero_to_one: usize,
    #[serde(rename = "1_to_2r")]
    pub one_to_two: usize,
    #[serde(rename = "2_to_5r")]
    pub two_to_five: usize,
    #[serde(rename = "5r_plus")]
    pub five_plus: usize,
}

impl RBuckets {
    fn record(&mut self, r: Decimal) {
        let slot = if r < Decimal::ZERO {
            &mut self.negative
        } else if r < Decimal::ONE {
            &mut self.zero_to_one
        } else if r < Decimal::TWO {
            &mut self.one_to_two
        } else if r < Decimal::from(5) {
            &mut self.two_to_five
        } else {
            &mut self.five_plus
        };
        *slot += 1;
    }

    pub fn total(&self) -> usize {
        self.negative + self.zero_to_one + self.one_to_two + self.two_to_five + self.five_plus
    }
}

/// Adverse and favorable excursion estimated from realized P&L alone: a loss
/// counts as its full adverse excursion, a win as its full favorable one, and
/// the other side is zero. Intra-trade prices are not tracked.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MaeMfe {
    pub avg_mae: Decimal,
    pub avg_mfe: Decimal,
    pub max_mae: Decimal,
    pub max_mfe: Decimal,
}

impl MaeMfe {
    fn from_pnls(pnls: &[Decimal]) -> Self {
        let mae: Vec<Decimal> = pnls
            .iter()
            .map(|p| if *p < Decimal::ZERO { p.abs() } else { Decimal::ZERO })
            .collect();
        let mfe: Vec<Decimal> = pnls.iter().map(|p| (*p).max(Decimal::ZERO)).collect();

        Self {
            avg_mae: mean(&mae),
            avg_mfe: mean(&mfe),
            max_mae: mae.iter().copied().max().unwrap_or_default(),
            max_mfe: mfe.iter().copied().max().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RMultipleDistribution {
    pub risk_per_trade: Decimal,
    pub buckets: RBuckets,
    pub average_r: Decimal,
    pub max_r: Decimal,
    pub min_r: Decimal,
    pub mae_mfe: MaeMfe,
}

pub fn r_multiple_distribution(trades: &[TradeRecord], risk_per_trade: Decimal) -> RMultipleDistribution {
    let pnls = closed_pnls(trades);
    let r_values: Vec<Decimal> = pnls
        .iter()
        .map(|pnl| ratio(*pnl, risk_per_trade))
        .collect();

    let mut buckets = RBuckets::default();
    for r in &r_values {
        buckets.record(*r);
    }

    RMultipleDistribution {
        risk_per_trade,
        buckets,
        average_r: mean(&r_values),
        max_r: r_values.iter().copied().max().unwrap_or_default(),
        min_r: r_values.iter().copied().min().unwrap_or_default(),
        mae_mfe: MaeMfe::from_pnls(&pnls),
    }
}

// ---------------------------------------------------------------------------
// Pareto concentration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ConcentrationRisk {
    #[default]
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl ConcentrationRisk {
    /// Graded on the share of total P&L earned by the top 10% of trades.
    pub fn from_top_decile(top_10_pct: Decimal) -> Self {
        if top_10_pct > Decimal::from(80) {
            ConcentrationRisk::VeryHigh
        } else if top_10_pct > Decimal::from(60) {
            ConcentrationRisk::High
        } else if top_10_pct > Decimal::from(40) {
            ConcentrationRisk::Medium
        } else {
            ConcentrationRisk::Low
        }
    }
}

/// Each share sums only the winning trades inside its slice, so it differs
/// from a plain slice sum whenever the slice reaches into losing trades.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParetoAnalysis {
    pub top_10_pct: Decimal,
    pub top_20_pct: Decimal,
    /// P&L of the top-decile trades, best first.
    pub top_trades: Vec<Decimal>,
    pub concentration_risk: ConcentrationRisk,
    pub total_trades: usize,
    pub total_pnl: Decimal,
}

/// Share of total P&L earned by the best 10% and 20% of closed trades.
///
/// Slices are taken by count (at least one trade each) from the P&L sorted
/// best first. Only winning trades inside a slice contribute to its share, so
/// the 20% share never falls below the 10% share. When the total P&L is not
/// positive the shares are meaningless: both are zero and the risk is High.
/// That includes a log with trades but none of them closed. Only an empty log
/// is Low.
pub fn pareto_concentration(trades: &[TradeRecord]) -> ParetoAnalysis {
    if trades.is_empty() {
        return ParetoAnalysis::default();
    }
    let mut pnls = closed_pnls(trades);
    pnls.sort_by(|a, b| b.cmp(a));

    let total_pnl: Decimal = pnls.iter().sum();
    let total_trades = pnls.len();
    if total_pnl <= Decimal::ZERO {
        return ParetoAnalysis {
            concentration_risk: ConcentrationRisk::High,
            total_trades,
            total_pnl,
            ..ParetoAnalysis::default()
        };
    }

    let top_10_count = (total_trades / 10).max(1);
    let top_20_count = (total_trades / 5).max(1);
    let winning_sum = |count: usize| -> Decimal {
        pnls[..count].iter().filter(|p| **p > Decimal::ZERO).sum()
    };

    let top_10_pct = percent(winning_sum(top_10_count), total_pnl);
    let top_20_pct = percent(winning_sum(top_20_count), total_pnl);

    ParetoAnalysis {
        top_10_pct,
        top_20_pct,
        top_trades: pnls[..top_10_count].to_vec(),
        concentration_risk: ConcentrationRisk::from_top_decile(top_10_pct),
        total_trades,
        total_pnl,
    }
}

// ---------------------------------------------------------------------------
// Holding periods
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HoldingPeriod {
    /// Under an hour.
    Scalp,
    /// Opened and closed on the same calendar day.
    Intraday,
    /// Up to a week.
    Swing,
    /// Longer than a week.
    Position,
}

impl HoldingPeriod {
    /// `None` when the trade carries no opening timestamp, or one after the
    /// trade itself.
    pub fn classify(trade: &TradeRecord) -> Option<Self> {
        let opened_at = trade.opened_at?;
        let held = trade.holding_period()?;
        if held < Duration::zero() {
            return None;
        }
        Some(if held < Duration::hours(1) {
            HoldingPeriod::Scalp
        } else if opened_at.date_naive() == trade.trade_date {
            HoldingPeriod::Intraday
        } else if held <= Duration::days(7) {
            HoldingPeriod::Swing
        } else {
            HoldingPeriod::Position
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HoldingBucket {
    pub trade_count: usize,
    pub win_rate: Decimal,
    pub total_pnl: Decimal,
    pub average_pnl: Decimal,
    pub best_pnl: Decimal,
    pub worst_pnl: Decimal,
    #[serde(skip)]
    winning_trades: usize,
}

impl HoldingBucket {
    fn record(&mut self, pnl: Decimal) {
        if self.trade_count == 0 {
            self.best_pnl = pnl;
            self.worst_pnl = pnl;
        } else {
            self.best_pnl = self.best_pnl.max(pnl);
            self.worst_pnl = self.worst_pnl.min(pnl);
        }
        self.trade_count += 1;
        if pnl > Decimal::ZERO {
            self.winning_trades += 1;
        }
        self.total_pnl += pnl;

        let count = Decimal::from(self.trade_count);
        self.average_pnl = self.total_pnl / count;
        self.win_rate = Decimal::from(self.winning_trades) / count;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HoldingPeriodDistribution {
    pub buckets: BucketMap<HoldingPeriod, HoldingBucket>,
    /// Closed trades without a usable opening timestamp. They are counted
    /// here instead of being guessed into a bucket.
    pub unavailable: usize,
    #[serde(with = "humantime_serde")]
    pub average_holding_period: Option<std::time::Duration>,
}

pub fn holding_period_distribution(trades: &[TradeRecord]) -> HoldingPeriodDistribution {
    let mut distribution = HoldingPeriodDistribution::default();
    let mut held_ms: Vec<i64> = Vec::new();

    for trade in closed_trades(trades) {
        match HoldingPeriod::classify(trade) {
            Some(period) => {
                distribution.buckets.touch(period).record(trade.realized_pnl);
                if let Some(held) = trade.holding_period() {
                    held_ms.push(held.num_milliseconds());
                }
            }
            None => distribution.unavailable += 1,
        }
    }

    if !held_ms.is_empty() {
        let average = held_ms.iter().sum::<i64>() / held_ms.len() as i64;
        distribution.average_holding_period = u64::try_from(average)
            .ok()
            .map(std::time::Duration::from_millis);
    }
    distribution
}

// ---------------------------------------------------------------------------
// Capital exposure
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExposureBucket {
    pub trade_count: usize,
    pub average_exposure_pct: Decimal,
    pub max_exposure_pct: Decimal,
    #[serde(skip)]
    total_exposure_pct: Decimal,
}

impl ExposureBucket {
    fn record(&mut self, exposure_pct: Decimal) {
        self.trade_count += 1;
        self.total_exposure_pct += exposure_pct;
        self.max_exposure_pct = self.max_exposure_pct.max(exposure_pct);
        self.average_exposure_pct = self.total_exposure_pct / Decimal::from(self.trade_count);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CapitalExposure {
    pub total_capital: Decimal,
    pub average_exposure_pct: Decimal,
    pub max_exposure_pct: Decimal,
    pub by_hour: BucketMap<u32, ExposureBucket>,
    pub by_day: BucketMap<DayOfWeek, ExposureBucket>,
}

/// Gross value of every trade, buys included, as a percentage of the
/// account's current total capital. Exposure is zero when that capital is not
/// positive.
pub fn capital_exposure(trades: &[TradeRecord], account: &AccountSnapshot) -> CapitalExposure {
    let total_capital = account.total_capital();
    let mut exposure = CapitalExposure {
        total_capital,
        ..CapitalExposure::default()
    };

    let mut all = ExposureBucket::default();
    for trade in trades {
        let pct = if total_capital > Decimal::ZERO {
            percent(trade.gross_value, total_capital)
        } else {
            Decimal::ZERO
        };
        exposure.by_hour.touch(hour_of(trade)).record(pct);
        exposure.by_day.touch(day_of(trade)).record(pct);
        all.record(pct);
    }

    exposure.average_exposure_pct = all.average_exposure_pct;
    exposure.max_exposure_pct = all.max_exposure_pct;
    exposure
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{closed_series, closed_trade, opened, trade};
    use chrono::Weekday;
    use core_types::{OrderSide, PositionSnapshot};
    use rust_decimal_macros::dec;

    #[test]
    fn r_multiples_land_in_half_open_bands() {
        let trades = closed_series(
            "AAPL",
            &[dec!(-50), dec!(50), dec!(100), dec!(199), dec!(200), dec!(499), dec!(500), dec!(900)],
        );
        let dist = r_multiple_distribution(&trades, dec!(100));

        assert_eq!(
            dist.buckets,
            RBuckets {
                negative: 1,
                zero_to_one: 1,
                one_to_two: 2,
                two_to_five: 2,
                five_plus: 2,
            }
        );
        assert_eq!(dist.max_r, dec!(9));
        assert_eq!(dist.min_r, dec!(-0.5));
        assert_eq!(dist.buckets.total(), 8);
    }

    #[test]
    fn excursions_are_estimated_from_realized_pnl() {
        let trades = closed_series("AAPL", &[dec!(-50), dec!(150), dec!(-100), dec!(200)]);
        let mae_mfe = r_multiple_distribution(&trades, dec!(100)).mae_mfe;

        assert_eq!(mae_mfe.avg_mae, dec!(37.5));
        assert_eq!(mae_mfe.avg_mfe, dec!(87.5));
        assert_eq!(mae_mfe.max_mae, dec!(100));
        assert_eq!(mae_mfe.max_mfe, dec!(200));

        assert_eq!(r_multiple_distribution(&[], dec!(100)).mae_mfe, MaeMfe::default());
    }

    #[test]
    fn pareto_labels_by_top_decile() {
        let mut pnls = vec![dec!(900)];
        pnls.extend(std::iter::repeat_n(dec!(10), 9));
        let pareto = pareto_concentration(&closed_series("AAPL", &pnls));

        assert_eq!(pareto.top_10_pct.round_dp(2), dec!(90.91));
        assert_eq!(pareto.top_20_pct.round_dp(2), dec!(91.92));
        assert_eq!(pareto.concentration_risk, ConcentrationRisk::VeryHigh);
        assert_eq!(pareto.top_trades, vec![dec!(900)]);
    }

    #[test]
    fn pareto_top_slices_stay_ordered_with_losers_inside() {
        let mut pnls = vec![dec!(100), dec!(-1)];
        pnls.extend(std::iter::repeat_n(dec!(-1), 8));
        let pareto = pareto_concentration(&closed_series("AAPL", &pnls));

        assert!(pareto.top_10_pct <= pareto.top_20_pct);
    }

    #[test]
    fn pareto_on_losing_book_is_high_risk_with_zero_shares() {
        let pareto = pareto_concentration(&closed_series("AAPL", &[dec!(50), dec!(-80)]));
        assert_eq!(pareto.concentration_risk, ConcentrationRisk::High);
        assert_eq!(pareto.top_10_pct, Decimal::ZERO);
        assert_eq!(pareto.top_20_pct, Decimal::ZERO);

        let empty = pareto_concentration(&[]);
        assert_eq!(empty.concentration_risk, ConcentrationRisk::Low);
    }

    #[test]
    fn pareto_on_log_without_closed_trades_is_high_risk() {
        let buys = vec![trade("AAPL", OrderSide::Buy, dec!(10), dec!(100), dec!(0), "2024-01-02", "10:00:00")];
        let pareto = pareto_concentration(&buys);

        assert_eq!(pareto.concentration_risk, ConcentrationRisk::High);
        assert_eq!(pareto.total_trades, 0);
        assert_eq!(pareto.total_pnl, Decimal::ZERO);
        assert!(pareto.top_trades.is_empty());
    }

    #[test]
    fn holding_periods_use_the_opening_timestamp() {
        let trades = vec![
            opened(closed_trade("A", dec!(10), "2024-01-02", "10:30:00"), "2024-01-02T10:00:00Z"),
            opened(closed_trade("B", dec!(-5), "2024-01-02", "15:00:00"), "2024-01-02T09:00:00Z"),
            opened(closed_trade("C", dec!(20), "2024-01-05", "15:00:00"), "2024-01-02T09:00:00Z"),
            opened(closed_trade("D", dec!(30), "2024-02-05", "15:00:00"), "2024-01-02T09:00:00Z"),
            opened(closed_trade("E", dec!(40), "2024-02-06", "15:00:00"), "2024-01-02T09:00:00Z"),
            closed_trade("F", dec!(1), "2024-01-02", "11:00:00"),
        ];
        let dist = holding_period_distribution(&trades);

        assert_eq!(dist.buckets.get(&HoldingPeriod::Scalp).unwrap().trade_count, 1);
        assert_eq!(dist.buckets.get(&HoldingPeriod::Intraday).unwrap().win_rate, Decimal::ZERO);
        assert_eq!(dist.buckets.get(&HoldingPeriod::Swing).unwrap().trade_count, 1);

        let position = dist.buckets.get(&HoldingPeriod::Position).unwrap();
        assert_eq!(position.trade_count, 2);
        assert_eq!(position.best_pnl, dec!(40));
        assert_eq!(position.worst_pnl, dec!(30));
        assert_eq!(position.average_pnl, dec!(35));
        assert_eq!(dist.unavailable, 1);
        assert!(dist.average_holding_period.is_some());
    }

    #[test]
    fn trades_opened_after_they_closed_are_unavailable() {
        let bad = opened(closed_trade("A", dec!(10), "2024-01-02", "10:00:00"), "2024-01-03T10:00:00Z");
        let dist = holding_period_distribution(&[bad]);
        assert_eq!(dist.unavailable, 1);
        assert!(dist.buckets.is_empty());
        assert_eq!(dist.average_holding_period, None);
    }

    #[test]
    fn exposure_is_gross_over_total_capital() {
        let account = AccountSnapshot {
            account_id: "test".to_string(),
            cash: dec!(8000),
            positions: [(
                "AAPL".to_string(),
                PositionSnapshot {
                    quantity: dec!(10),
                    avg_price: dec!(100),
                    market_value: dec!(2000),
                },
            )]
            .into_iter()
            .collect(),
        };
        let trades = vec![
            trade("AAPL", OrderSide::Buy, dec!(10), dec!(100), dec!(0), "2024-01-02", "10:00:00"),
            trade("AAPL", OrderSide::Sell, dec!(5), dec!(200), dec!(500), "2024-01-02", "10:30:00"),
            trade("MSFT", OrderSide::Buy, dec!(1), dec!(500), dec!(0), "2024-01-03", "14:00:00"),
        ];
        let exposure = capital_exposure(&trades, &account);

        assert_eq!(exposure.total_capital, dec!(10000));
        assert_eq!(exposure.max_exposure_pct, dec!(10));
        assert_eq!(exposure.by_hour.get(&10).unwrap().trade_count, 2);
        assert_eq!(exposure.by_hour.get(&14).unwrap().average_exposure_pct, dec!(5));
        assert_eq!(exposure.by_day.get(&DayOfWeek(Weekday::Tue)).unwrap().average_exposure_pct, dec!(10));
        assert_eq!(exposure.average_exposure_pct.round_dp(4), dec!(8.3333));
    }

    #[test]
    fn exposure_without_capital_is_zero() {
        let trades = vec![closed_trade("AAPL", dec!(5), "2024-01-02", "10:00:00")];
        let exposure = capital_exposure(&trades, &AccountSnapshot::default());
        assert_eq!(exposure.max_exposure_pct, Decimal::ZERO);
        assert_eq!(exposure.by_hour.len(), 1);
    }
}
