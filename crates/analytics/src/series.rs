// In crates/analytics/src/series.rs

use core_types::PriceBar;
use std::collections::BTreeMap;
use ta::{Next, Reset};
use ta::indicators::SimpleMovingAverage as Sma;

/// Trailing simple average of `values` over `window` points.
///
/// The first `window - 1` entries are `None`: an average is only reported once a full
/// window of history exists. A zero window yields no values at all.
///
/// Each window is averaged from scratch so rounding error never carries between
/// windows, and a window of identical values averages to exactly that value.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let Ok(mut sma) = Sma::new(window) else {
        return vec![None; values.len()];
    };

    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let slice = &values[i + 1 - window..=i];
            let first = slice[0];
            if slice.iter().all(|v| *v == first) {
                return Some(first);
            }
            sma.reset();
            slice.iter().map(|v| sma.next(*v)).last()
        })
        .collect()
}

/// Simple moving average of the close price.
pub fn moving_average(bars: &[PriceBar], window: usize) -> Vec<Option<f64>> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    rolling_mean(&closes, window)
}

/// Whether the latest point of `series` is at least the point `lookback` positions earlier.
///
/// A series with `lookback` or fewer points gets the benefit of the doubt and counts as
/// trending up. A comparison against a missing average is not trending up.
pub fn is_trending_up(series: &[Option<f64>], lookback: usize) -> bool {
    if series.len() <= lookback {
        return true;
    }
    let latest = series[series.len() - 1];
    let earlier = series[series.len() - 1 - lookback];
    match (latest, earlier) {
        (Some(latest), Some(earlier)) => latest >= earlier,
        _ => false,
    }
}

/// A price series together with the close-price moving averages computed over it.
#[derive(Debug, Clone)]
pub struct AnnotatedSeries {
    bars: Vec<PriceBar>,
    averages: BTreeMap<usize, Vec<Option<f64>>>,
}

impl AnnotatedSeries {
    /// The windows the stage classifier relies on.
    pub const STAGE_WINDOWS: [usize; 6] = [10, 20, 50, 100, 150, 200];

    pub fn new(bars: Vec<PriceBar>, windows: &[usize]) -> Self {
        let averages = windows
            .iter()
            .map(|&window| (window, moving_average(&bars, window)))
            .collect();
        Self { bars, averages }
    }

    pub fn with_stage_windows(bars: Vec<PriceBar>) -> Self {
        Self::new(bars, &Self::STAGE_WINDOWS)
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn latest(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// The full moving-average column for `window`, if it was computed.
    pub fn ma(&self, window: usize) -> Option<&[Option<f64>]> {
        self.averages.get(&window).map(Vec::as_slice)
    }

    /// The moving average for `window` at the most recent bar.
    pub fn latest_ma(&self, window: usize) -> Option<f64> {
        self.ma(window).and_then(|col| col.last().copied().flatten())
    }

    /// `is_trending_up` over the `window` column. An uncomputed window counts as no data.
    pub fn ma_trending_up(&self, window: usize, lookback: usize) -> bool {
        is_trending_up(self.ma(window).unwrap_or(&[]), lookback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: start + Duration::days(i as i64),
                open: None,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000.0,
            })
            .collect()
    }

    #[test]
    fn moving_average_is_missing_until_window_is_full() {
        let closes: Vec<f64> = (1..=30).map(f64::from).collect();
        let bars = bars_from_closes(&closes);

        for window in [1, 5, 10, 30] {
            let ma = moving_average(&bars, window);
            assert_eq!(ma.len(), closes.len());
            for (i, value) in ma.iter().enumerate() {
                if i + 1 < window {
                    assert!(value.is_none(), "window {window} index {i} should be missing");
                } else {
                    let expected =
                        closes[i + 1 - window..=i].iter().sum::<f64>() / window as f64;
                    let actual = value.expect("defined once the window is full");
                    assert!((actual - expected).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn constant_window_averages_to_its_exact_value() {
        for close in [0.1, 0.7, 10.1, 33.3, 123.45] {
            let ma = moving_average(&bars_from_closes(&[close; 300]), 150);
            assert!(ma[149..].iter().all(|v| *v == Some(close)), "close {close}");
        }
    }

    #[test]
    fn moving_average_longer_than_series_is_all_missing() {
        let bars = bars_from_closes(&[1.0, 2.0, 3.0]);
        assert!(moving_average(&bars, 10).iter().all(Option::is_none));
        assert!(moving_average(&bars, 0).iter().all(Option::is_none));
    }

    #[test]
    fn trending_up_gives_benefit_of_the_doubt_on_short_series() {
        let falling = [Some(5.0), Some(4.0), Some(3.0)];
        assert!(is_trending_up(&falling, 3));
        assert!(is_trending_up(&falling, 10));
        assert!(!is_trending_up(&falling, 2));
        assert!(is_trending_up(&[], 0));
    }

    #[test]
    fn trending_up_is_non_strict() {
        let flat = [Some(2.0); 6];
        assert!(is_trending_up(&flat, 5));
        let rising = [Some(1.0), Some(1.5), Some(2.0)];
        assert!(is_trending_up(&rising, 2));
    }

    #[test]
    fn trending_up_against_missing_value_fails() {
        let series = [None, None, Some(3.0), Some(4.0)];
        assert!(!is_trending_up(&series, 3));
        assert!(is_trending_up(&series, 1));
    }

    #[test]
    fn annotated_series_exposes_latest_averages() {
        let closes: Vec<f64> = (1..=20).map(f64::from).collect();
        let series = AnnotatedSeries::new(bars_from_closes(&closes), &[10, 50]);

        assert_eq!(series.latest_ma(10), Some(15.5));
        assert_eq!(series.latest_ma(50), None);
        assert_eq!(series.latest_ma(20), None);
        assert!(series.ma_trending_up(10, 5));
        // An uncomputed window has no points, so the short-series rule applies.
        assert!(series.ma_trending_up(20, 5));
    }
}
