// In crates/core-types/src/types.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// A ticker symbol as understood by the market-data provider (e.g. "AAPL", "0700.HK").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl Symbol {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A single trading session (daily or weekly, depending on the requested interval).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Column-oriented price history as it comes back from a market-data provider.
///
/// Providers may omit whole columns, so `open`, `close` and `volume` are optional.
/// Rows are in chronological order, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OhlcvFrame {
    pub dates: Vec<DateTime<Utc>>,
    pub open: Option<Vec<f64>>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Option<Vec<f64>>,
    pub volume: Option<Vec<f64>>,
}

impl OhlcvFrame {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn has_close(&self) -> bool {
        self.close.is_some()
    }

    pub fn has_volume(&self) -> bool {
        self.volume.is_some()
    }

    /// Builds a frame from row-oriented bars. Every column is present.
    pub fn from_bars(bars: &[PriceBar]) -> Self {
        Self {
            dates: bars.iter().map(|b| b.date).collect(),
            open: Some(bars.iter().map(|b| b.open.unwrap_or(b.close)).collect()),
            high: bars.iter().map(|b| b.high).collect(),
            low: bars.iter().map(|b| b.low).collect(),
            close: Some(bars.iter().map(|b| b.close).collect()),
            volume: Some(bars.iter().map(|b| b.volume).collect()),
        }
    }

    /// Converts the frame into bars, failing with `DataUnavailable` when the frame is
    /// empty or has no close column.
    ///
    /// A missing volume column is read as zero volume.
    pub fn to_bars(&self, symbol: &Symbol) -> Result<Vec<PriceBar>> {
        let closes = match &self.close {
            Some(closes) if !self.is_empty() => closes,
            _ => return Err(Error::data_unavailable(symbol.as_str())),
        };

        let bars: Vec<PriceBar> = self
            .dates
            .iter()
            .zip(&self.high)
            .zip(&self.low)
            .zip(closes)
            .enumerate()
            .map(|(i, (((date, high), low), close))| PriceBar {
                date: *date,
                open: self.open.as_ref().and_then(|o| o.get(i).copied()),
                high: *high,
                low: *low,
                close: *close,
                volume: self
                    .volume
                    .as_ref()
                    .and_then(|v| v.get(i).copied())
                    .unwrap_or(0.0),
            })
            .collect();

        if bars.is_empty() {
            return Err(Error::data_unavailable(symbol.as_str()));
        }
        Ok(bars)
    }
}

/// Trailing quarterly net income and total revenue, most recent quarter first.
///
/// Each sequence holds at most four finite values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundamentalsSnapshot {
    pub net_income: Vec<f64>,
    pub total_revenue: Vec<f64>,
}

impl FundamentalsSnapshot {
    pub const MAX_QUARTERS: usize = 4;

    /// Builds a snapshot from raw quarterly values (most recent first), discarding
    /// missing or non-finite entries before keeping the latest four.
    pub fn from_quarters<I, J>(net_income: I, total_revenue: J) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
        J: IntoIterator<Item = Option<f64>>,
    {
        fn clean(values: impl IntoIterator<Item = Option<f64>>) -> Vec<f64> {
            values
                .into_iter()
                .flatten()
                .filter(|v| v.is_finite())
                .take(FundamentalsSnapshot::MAX_QUARTERS)
                .collect()
        }

        Self {
            net_income: clean(net_income),
            total_revenue: clean(total_revenue),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.net_income.is_empty() && self.total_revenue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn frame(len: usize) -> OhlcvFrame {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        OhlcvFrame {
            dates: (0..len).map(|i| start + chrono::Duration::days(i as i64)).collect(),
            open: None,
            high: vec![12.0; len],
            low: vec![8.0; len],
            close: Some(vec![10.0; len]),
            volume: None,
        }
    }

    #[test]
    fn empty_frame_is_data_unavailable() {
        let err = frame(0).to_bars(&Symbol::from("EMPTY")).unwrap_err();
        assert_eq!(err, Error::data_unavailable("EMPTY"));
        assert!(err.to_string().contains("No data retrieved for EMPTY"));
    }

    #[test]
    fn frame_without_close_is_data_unavailable() {
        let mut f = frame(5);
        f.close = None;
        assert!(matches!(
            f.to_bars(&Symbol::from("MISSING_CLOSE")),
            Err(Error::DataUnavailable { symbol }) if symbol == "MISSING_CLOSE"
        ));
    }

    #[test]
    fn missing_volume_reads_as_zero() {
        let bars = frame(3).to_bars(&Symbol::from("X")).unwrap();
        assert_eq!(bars.len(), 3);
        assert!(bars.iter().all(|b| b.volume == 0.0 && b.open.is_none()));
    }

    #[test]
    fn snapshot_drops_missing_values_and_keeps_four() {
        let snapshot = FundamentalsSnapshot::from_quarters(
            vec![Some(5.0), None, Some(4.0), Some(f64::NAN), Some(3.0), Some(2.0), Some(1.0)],
            vec![None, Some(10.0)],
        );
        assert_eq!(snapshot.net_income, vec![5.0, 4.0, 3.0, 2.0]);
        assert_eq!(snapshot.total_revenue, vec![10.0]);
    }
}
