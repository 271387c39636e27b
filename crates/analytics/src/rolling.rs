use crate::equity::closed_pnls;
use crate::stats::{annualized_sharpe, profit_factor};
use core_types::TradeRecord;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    #[default]
    Declining,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RollingMetrics {
    pub window: usize,
    /// One value per trailing window, oldest first.
    pub rolling_profit_factor: Vec<Decimal>,
    pub rolling_sharpe: Vec<Decimal>,
    pub current_profit_factor: Decimal,
    pub current_sharpe: Decimal,
    pub trend: Trend,
}

/// Profit factor and annualized Sharpe over the `window` closed trades that
/// precede each position from `window` onwards, so `n` closed trades yield
/// `n - window` values. With `window` or fewer closed trades the sequences are
/// empty and the current values are zero.
pub fn rolling_metrics(trades: &[TradeRecord], window: usize, annualization_periods: u32) -> RollingMetrics {
    let pnls = closed_pnls(trades);
    let mut metrics = RollingMetrics {
        window,
        ..RollingMetrics::default()
    };
    if window == 0 || pnls.len() <= window {
        tracing::debug!(closed = pnls.len(), window, "Not enough closed trades for rolling metrics");
        return metrics;
    }

    for end in window..pnls.len() {
        let slice = &pnls[end - window..end];
        metrics.rolling_profit_factor.push(profit_factor(slice));
        metrics.rolling_sharpe.push(annualized_sharpe(slice, annualization_periods));
    }

    metrics.current_profit_factor = metrics.rolling_profit_factor.last().copied().unwrap_or_default();
    metrics.current_sharpe = metrics.rolling_sharpe.last().copied().unwrap_or_default();
    metrics.trend = match metrics.rolling_profit_factor.as_slice() {
        [.., prior, latest] if latest > prior => Trend::Improving,
        _ => Trend::Declining,
    };
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::closed_series;
    use rust_decimal_macros::dec;

    #[test]
    fn one_value_per_preceding_window() {
        let trades = closed_series("AAPL", &[dec!(10), dec!(-5), dec!(10), dec!(-5), dec!(20)]);
        let metrics = rolling_metrics(&trades, 3, 252);

        // The window ending at the last trade is not scored.
        assert_eq!(metrics.rolling_profit_factor, vec![dec!(4), dec!(1)]);
        assert_eq!(metrics.rolling_sharpe.len(), 2);
        assert_eq!(metrics.current_profit_factor, dec!(1));
        assert_eq!(metrics.trend, Trend::Declining);
    }

    #[test]
    fn exactly_one_window_of_trades_yields_nothing() {
        let trades = closed_series("AAPL", &[dec!(1), dec!(2), dec!(3)]);
        let metrics = rolling_metrics(&trades, 3, 252);
        assert!(metrics.rolling_profit_factor.is_empty());
        assert_eq!(metrics.current_profit_factor, Decimal::ZERO);
        assert_eq!(metrics.trend, Trend::Declining);
    }

    #[test]
    fn window_without_losses_saturates() {
        let trades = closed_series("AAPL", &[dec!(1), dec!(2), dec!(3), dec!(-1)]);
        let metrics = rolling_metrics(&trades, 3, 252);
        assert_eq!(metrics.rolling_profit_factor, vec![dec!(999)]);
        // A single window has no prior value to improve on.
        assert_eq!(metrics.trend, Trend::Declining);
    }

    #[test]
    fn falling_profit_factor_is_declining() {
        let trades = closed_series("AAPL", &[dec!(10), dec!(10), dec!(-10), dec!(-10), dec!(5)]);
        let metrics = rolling_metrics(&trades, 2, 252);
        assert_eq!(metrics.rolling_profit_factor, vec![dec!(999), dec!(1), dec!(0)]);
        assert_eq!(metrics.trend, Trend::Declining);
    }

    #[test]
    fn rising_profit_factor_is_improving() {
        let trades = closed_series("AAPL", &[dec!(-10), dec!(-10), dec!(10), dec!(10), dec!(0.5)]);
        let metrics = rolling_metrics(&trades, 2, 252);
        assert_eq!(metrics.rolling_profit_factor, vec![dec!(0), dec!(1), dec!(999)]);
        assert_eq!(metrics.trend, Trend::Improving);
    }

    #[test]
    fn too_few_trades_yields_empty_sequences() {
        let trades = closed_series("AAPL", &[dec!(10), dec!(-5)]);
        let metrics = rolling_metrics(&trades, 30, 252);
        assert!(metrics.rolling_profit_factor.is_empty());
        assert!(metrics.rolling_sharpe.is_empty());
        assert_eq!(metrics.current_sharpe, Decimal::ZERO);
        assert_eq!(metrics.window, 30);
    }
}
