//! # Papertrail Analytics
//!
//! Performance analytics over a paper-trading trade log: equity curve,
//! drawdown, rolling profit factor and Sharpe, distribution views, time
//! patterns and expectancy.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** A pure logic crate. It depends only on `core-types`
//!   and the analytics settings from `configuration`.
//! - **Stateless Calculation:** Every function reads a `&[TradeRecord]` and
//!   returns plain data. Nothing here mutates shared state, so independent
//!   metrics can be computed in parallel over the same log.
//! - **Total Functions:** Nothing fails. Empty or degenerate input produces
//!   zeroed structures, and every division has a fixed fallback (profit factor
//!   saturates at 999, Sharpe falls back to 0).
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: composes every metric into one report.
//! - `PerformanceReport`: the combined output.
//! - The individual analyzers, for callers that need only one view.

pub mod buckets;
pub mod distribution;
pub mod drawdown;
pub mod engine;
pub mod equity;
pub mod expectancy;
pub mod report;
pub mod rolling;
pub mod stats;
pub mod summary;
pub mod time_patterns;

#[cfg(test)]
mod test_support;

pub use buckets::{BucketMap, DayOfWeek, OutcomeBucket};
pub use distribution::{
    CapitalExposure, ConcentrationRisk, ExposureBucket, HoldingBucket, HoldingPeriod,
    HoldingPeriodDistribution, MaeMfe, ParetoAnalysis, RBuckets, RMultipleDistribution, capital_exposure,
    holding_period_distribution, pareto_concentration, r_multiple_distribution,
};
pub use drawdown::{DrawdownStats, analyze_drawdown};
pub use engine::AnalyticsEngine;
pub use equity::{EquityCurve, EquityPoint, closed_pnls, closed_trades};
pub use expectancy::{ExpectancyBucket, ExpectancyReport, expectancy};
pub use report::PerformanceReport;
pub use rolling::{RollingMetrics, Trend, rolling_metrics};
pub use stats::{PROFIT_FACTOR_SENTINEL, annualized_sharpe, profit_factor};
pub use summary::{PerformanceSummary, SymbolPerformance, performance_summary, symbol_performance};
pub use time_patterns::{AssetClassPatterns, TimePatterns, time_patterns};
