use crate::stats::{percent, ratio};
use rust_decimal::Decimal;
use serde::Serialize;

/// Peak-to-trough statistics of an equity curve.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DrawdownStats {
    /// Largest drop below the running peak, as a percentage of that peak.
    /// Zero whenever the peak it was measured from is zero.
    pub max_drawdown_pct: Decimal,
    pub max_drawdown_amount: Decimal,
    /// Points from the start of the deepest underwater run to its deepest point.
    pub max_drawdown_duration: usize,
    /// Length of every underwater run that recovered to its peak.
    pub underwater_periods: Vec<usize>,
    pub average_underwater_period: Decimal,
    pub peak_equity: Decimal,
    pub final_equity: Decimal,
}

/// Walks `equity_curve` against a running peak that starts at zero.
///
/// A point is underwater when it is strictly below the peak, so a point equal
/// to the peak ends the current underwater run. The first drawdown
/// of the largest amount wins; an equal amount later on does not replace it.
pub fn analyze_drawdown(equity_curve: &[Decimal]) -> DrawdownStats {
    let mut stats = DrawdownStats::default();
    let mut peak = Decimal::ZERO;
    let mut run_start: Option<usize> = None;

    for (i, &value) in equity_curve.iter().enumerate() {
        if value >= peak {
            peak = value;
            if let Some(start) = run_start.take() {
                stats.underwater_periods.push(i - start);
            }
            continue;
        }

        let start = *run_start.get_or_insert(i);
        let amount = peak - value;
        if amount > stats.max_drawdown_amount {
            stats.max_drawdown_amount = amount;
            stats.max_drawdown_pct = if peak > Decimal::ZERO {
                percent(amount, peak)
            } else {
                Decimal::ZERO
            };
            stats.max_drawdown_duration = i - start + 1;
        }
    }

    stats.peak_equity = peak;
    stats.final_equity = equity_curve.last().copied().unwrap_or(Decimal::ZERO);
    stats.average_underwater_period = ratio(
        Decimal::from(stats.underwater_periods.iter().sum::<usize>()),
        Decimal::from(stats.underwater_periods.len()),
    );

    tracing::debug!(
        points = equity_curve.len(),
        max_drawdown = %stats.max_drawdown_amount,
        "Drawdown analyzed"
    );
    stats
}
