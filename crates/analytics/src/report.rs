use crate::buckets::BucketMap;
use crate::distribution::{CapitalExposure, HoldingPeriodDistribution, ParetoAnalysis, RMultipleDistribution};
use crate::drawdown::DrawdownStats;
use crate::equity::EquityCurve;
use crate::expectancy::ExpectancyReport;
use crate::rolling::RollingMetrics;
use crate::summary::{PerformanceSummary, SymbolPerformance};
use crate::time_patterns::TimePatterns;
use rust_decimal::Decimal;
use serde::Serialize;

/// Everything the analytics know about one trade log.
///
/// This struct is the final output of the `AnalyticsEngine`. Every section has
/// a well-defined zero value, which is exactly what an empty log produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceReport {
    // I. Headline profitability
    pub summary: PerformanceSummary,
    pub symbols: BucketMap<String, SymbolPerformance>,

    // II. Equity and risk
    pub equity_curve: EquityCurve,
    pub drawdown: DrawdownStats,
    /// Annualized Sharpe over every closed trade.
    pub sharpe_ratio: Decimal,
    pub rolling: RollingMetrics,

    // III. Distributions
    pub r_multiples: RMultipleDistribution,
    pub pareto: ParetoAnalysis,
    pub holding_periods: HoldingPeriodDistribution,
    pub capital_exposure: CapitalExposure,

    // IV. When and where the edge is
    pub time_patterns: TimePatterns,
    pub expectancy: ExpectancyReport,
}

impl PerformanceReport {
    /// Creates a new, zeroed-out PerformanceReport.
    pub fn new() -> Self {
        Self {
            summary: PerformanceSummary::default(),
            symbols: BucketMap::new(),
            equity_curve: EquityCurve::default(),
            drawdown: DrawdownStats::default(),
            sharpe_ratio: Decimal::ZERO,
            rolling: RollingMetrics::default(),
            r_multiples: RMultipleDistribution::default(),
            pareto: ParetoAnalysis::default(),
            holding_periods: HoldingPeriodDistribution::default(),
            capital_exposure: CapitalExposure::default(),
            time_patterns: TimePatterns::default(),
            expectancy: ExpectancyReport::default(),
        }
    }
}

impl Default for PerformanceReport {
    fn default() -> Self {
        Self::new()
    }
}
