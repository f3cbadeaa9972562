// In crates/analytics/src/fundamentals.rs

use core_types::FundamentalsSnapshot;

/// Number of quarters needed before growth ratios are computed.
const REQUIRED_QUARTERS: usize = 4;
/// Of the three quarter-over-quarter ratios, how many must be positive.
const REQUIRED_POSITIVE: usize = 2;

/// Quarter-over-quarter growth ratios for values ordered most recent first.
///
/// Only computed when exactly four values are present; otherwise the list is empty.
/// A zero previous value yields a ratio of 0.
pub fn growth_ratios(values: &[f64]) -> Vec<f64> {
    if values.len() != REQUIRED_QUARTERS {
        return Vec::new();
    }
    values
        .windows(2)
        .map(|pair| {
            let (current, previous) = (pair[0], pair[1]);
            if previous == 0.0 {
                0.0
            } else {
                (current - previous) / previous.abs()
            }
        })
        .collect()
}

fn metric_passes(values: &[f64]) -> bool {
    growth_ratios(values).iter().filter(|g| **g > 0.0).count() >= REQUIRED_POSITIVE
}

/// Trailing three-quarter growth check: both net income and revenue must have grown in at
/// least two of the last three quarters.
///
/// This is a coarse proxy, not an earnings-quality analysis.
pub fn check_fundamentals_growth(snapshot: &FundamentalsSnapshot) -> bool {
    metric_passes(&snapshot.net_income) && metric_passes(&snapshot.total_revenue)
}
