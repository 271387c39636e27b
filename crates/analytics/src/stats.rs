use rust_decimal::{Decimal, MathematicalOps};

/// Saturation value for profit factor when there are no losses.
pub const PROFIT_FACTOR_SENTINEL: Decimal = Decimal::from_parts(999, 0, 0, false, 0);

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// `numerator / denominator`, or zero when the denominator is zero.
pub(crate) fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

pub(crate) fn percent(numerator: Decimal, denominator: Decimal) -> Decimal {
    ratio(numerator, denominator) * HUNDRED
}

pub(crate) fn mean(values: &[Decimal]) -> Decimal {
    ratio(values.iter().sum(), Decimal::from(values.len()))
}

/// Sample standard deviation (n - 1). `None` with fewer than two values.
pub(crate) fn sample_std_dev(values: &[Decimal]) -> Option<Decimal> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values);
    let variance = values
        .iter()
        .map(|v| (*v - mean) * (*v - mean))
        .sum::<Decimal>()
        / Decimal::from(values.len() - 1);
    variance.sqrt()
}

/// Gross wins over absolute gross losses, saturating at 999 without losses.
pub fn profit_factor(pnls: &[Decimal]) -> Decimal {
    let wins: Decimal = pnls.iter().filter(|p| **p > Decimal::ZERO).sum();
    let losses: Decimal = pnls.iter().filter(|p| **p < Decimal::ZERO).map(|p| p.abs()).sum();
    if losses.is_zero() {
        PROFIT_FACTOR_SENTINEL
    } else {
        wins / losses
    }
}

/// `mean / stdev * sqrt(periods)`; zero with fewer than two samples or no dispersion.
pub fn annualized_sharpe(pnls: &[Decimal], periods: u32) -> Decimal {
    let Some(std_dev) = sample_std_dev(pnls) else {
        return Decimal::ZERO;
    };
    if std_dev.is_zero() {
        return Decimal::ZERO;
    }
    let annualization = Decimal::from(periods).sqrt().unwrap_or(Decimal::ZERO);
    mean(pnls) / std_dev * annualization
}

/// Fraction (0..=1) of `pnls` that are strictly positive.
pub(crate) fn win_rate(pnls: &[Decimal]) -> Decimal {
    let wins = pnls.iter().filter(|p| **p > Decimal::ZERO).count();
    ratio(Decimal::from(wins), Decimal::from(pnls.len()))
}
