use crate::distribution::{capital_exposure, holding_period_distribution, pareto_concentration, r_multiple_distribution};
use crate::drawdown::analyze_drawdown;
use crate::equity::{EquityCurve, closed_pnls};
use crate::expectancy::expectancy;
use crate::report::PerformanceReport;
use crate::rolling::rolling_metrics;
use crate::stats::annualized_sharpe;
use crate::summary::{performance_summary, symbol_performance};
use crate::time_patterns::time_patterns;
use configuration::AnalyticsSettings;
use core_types::{AccountSnapshot, TradeRecord};

/// A stateless calculator for deriving performance metrics from a trade log.
///
/// It only reads its inputs, so one engine can serve any number of accounts
/// from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    settings: AnalyticsSettings,
}

impl AnalyticsEngine {
    pub fn new(settings: AnalyticsSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &AnalyticsSettings {
        &self.settings
    }

    /// The main entry point for calculating performance metrics.
    ///
    /// # Arguments
    ///
    /// * `trades` - The trade log, in any order. Only trades with a non-zero
    ///   realized P&L count as closed.
    /// * `account` - The account the log belongs to, used to size capital
    ///   exposure.
    ///
    /// Never fails: an empty or degenerate log yields the zeroed report.
    pub fn calculate(&self, trades: &[TradeRecord], account: &AccountSnapshot) -> PerformanceReport {
        let mut report = PerformanceReport::new();

        if trades.is_empty() {
            tracing::debug!("No trades to analyze");
            return report;
        }

        self.calculate_profitability(trades, &mut report);
        self.calculate_risk(trades, &mut report);
        self.calculate_distributions(trades, account, &mut report);
        self.calculate_patterns(trades, &mut report);

        tracing::info!(
            trades = report.summary.total_trades,
            closed = report.summary.closed_trades,
            total_pnl = %report.summary.total_pnl,
            profit_factor = %report.summary.profit_factor,
            max_drawdown = %report.drawdown.max_drawdown_amount,
            "Performance report calculated"
        );
        report
    }

    fn calculate_profitability(&self, trades: &[TradeRecord], report: &mut PerformanceReport) {
        report.summary = performance_summary(trades);
        report.symbols = symbol_performance(trades);
    }

    fn calculate_risk(&self, trades: &[TradeRecord], report: &mut PerformanceReport) {
        report.equity_curve = EquityCurve::build(trades);
        report.drawdown = analyze_drawdown(&report.equity_curve.values());
        report.sharpe_ratio = annualized_sharpe(&closed_pnls(trades), self.settings.annualization_periods);
        report.rolling = rolling_metrics(
            trades,
            self.settings.rolling_window,
            self.settings.annualization_periods,
        );
    }

    fn calculate_distributions(&self, trades: &[TradeRecord], account: &AccountSnapshot, report: &mut PerformanceReport) {
        report.r_multiples = r_multiple_distribution(trades, self.settings.risk_per_trade);
        report.pareto = pareto_concentration(trades);
        report.holding_periods = holding_period_distribution(trades);
        report.capital_exposure = capital_exposure(trades, account);
    }

    fn calculate_patterns(&self, trades: &[TradeRecord], report: &mut PerformanceReport) {
        report.time_patterns = time_patterns(trades, self.settings.crypto_markers.as_slice());
        report.expectancy = expectancy(trades, self.settings.risk_per_trade);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::closed_series;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_log_yields_zeroed_report() {
        let report = AnalyticsEngine::default().calculate(&[], &AccountSnapshot::default());
        assert_eq!(report, PerformanceReport::default());
    }

    #[test]
    fn settings_flow_into_the_report() {
        let settings = AnalyticsSettings {
            risk_per_trade: dec!(50),
            rolling_window: 2,
            ..AnalyticsSettings::default()
        };
        let trades = closed_series("AAPL", &[dec!(100), dec!(-50), dec!(150)]);
        let report = AnalyticsEngine::new(settings).calculate(&trades, &AccountSnapshot::default());

        assert_eq!(report.r_multiples.max_r, dec!(3));
        assert_eq!(report.rolling.rolling_profit_factor.len(), 1);
        assert_eq!(report.equity_curve.values(), vec![dec!(100), dec!(50), dec!(200)]);
        assert_eq!(report.drawdown.max_drawdown_amount, dec!(50));
        assert!(report.sharpe_ratio > Decimal::ZERO);
    }
}
