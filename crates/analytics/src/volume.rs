// In crates/analytics/src/volume.rs

use crate::series::{moving_average, rolling_mean};
use chrono::{DateTime, Utc};
use core_types::{Error, OhlcvFrame, PriceBar, Result, Symbol};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::fmt;

/// Window of the volume moving average that every flag is measured against.
pub const VOLUME_MA_WINDOW: usize = 10;

const ABOVE_AVERAGE_FACTOR: f64 = 1.2;
const STRONG_INCREASE_PCT: f64 = 0.005;
const CLOSING_STRONG_RATIO: f64 = 0.5;
const MILD_PULLBACK_PCT: f64 = -0.05;
const MAX_RANGE_PCT: f64 = 0.08;

const ACCUMULATION_WEIGHT: f64 = 2.0;
const PULLBACK_WEIGHT: f64 = 1.5;

// ============================================================================
// Lookback period
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodUnit {
    Weeks,
    Months,
    Years,
}

/// A requested lookback such as "26wk", "6mo" or "2y".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackPeriod {
    pub count: u32,
    pub unit: PeriodUnit,
}

impl LookbackPeriod {
    /// Used whenever the requested period cannot be read.
    pub const DEFAULT_WEEKS: u32 = 26;

    /// Reads leading digits followed by a `wk`, `mo` or `y` unit. Trailing text after the
    /// unit is ignored.
    pub fn parse(period: &str) -> Option<Self> {
        let digits_end = period
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(period.len());
        let count: u32 = period[..digits_end].parse().ok()?;
        let rest = &period[digits_end..];

        let unit = if rest.starts_with("wk") {
            PeriodUnit::Weeks
        } else if rest.starts_with("mo") {
            PeriodUnit::Months
        } else if rest.starts_with('y') {
            PeriodUnit::Years
        } else {
            return None;
        };
        Some(Self { count, unit })
    }

    /// Approximate length in weeks: a month is 4 weeks, a year 52.
    pub fn weeks(&self) -> u32 {
        match self.unit {
            PeriodUnit::Weeks => self.count,
            PeriodUnit::Months => self.count.saturating_mul(4),
            PeriodUnit::Years => self.count.saturating_mul(52),
        }
    }

    pub fn weeks_or_default(period: &str) -> u32 {
        Self::parse(period).map_or(Self::DEFAULT_WEEKS, |p| p.weeks())
    }
}

// ============================================================================
// Per-bar flags
// ============================================================================

/// Accumulation/distribution flags derived for one weekly bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyFlags {
    pub date: DateTime<Utc>,
    pub close: f64,
    pub volume: f64,
    /// 10-bar average volume, 0 until ten bars exist.
    pub volume_ma: f64,
    pub above_avg_volume: bool,
    pub strong_price_increase: bool,
    pub closing_strong: bool,
    pub accumulation_day: bool,
    pub low_volume_pullback: bool,
    /// Volume relative to its average, 0 when the ratio is not finite.
    pub volume_strength: f64,
}

/// Derives the weekly flags for every bar of `bars`.
pub fn derive_flags(bars: &[PriceBar]) -> Vec<WeeklyFlags> {
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
    let volume_ma: Vec<f64> = rolling_mean(&volumes, VOLUME_MA_WINDOW)
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect();

    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let prev_close = i.checked_sub(1).map(|p| bars[p].close);
            let change = prev_close.map_or(0.0, |prev| bar.close - prev);
            let pct_change = match prev_close {
                Some(prev) => {
                    let pct = (bar.close - prev) / prev;
                    if pct.is_nan() { 0.0 } else { pct }
                }
                None => 0.0,
            };

            let above_avg_volume = bar.volume > volume_ma[i] * ABOVE_AVERAGE_FACTOR;
            let strong_price_increase = pct_change > STRONG_INCREASE_PCT;
            let range = bar.high - bar.low;
            let closing_strong = range > 0.0 && (bar.close - bar.low) / range > CLOSING_STRONG_RATIO;
            let accumulation_day = above_avg_volume && strong_price_increase && closing_strong;

            let mild_pullback = pct_change > MILD_PULLBACK_PCT;
            let calm_range = bar.low > 0.0 && range / bar.low < MAX_RANGE_PCT;
            let previous_uptrend = i >= 2 && bars[i - 2].close < bars[i - 1].close;
            let low_volume_pullback = !above_avg_volume
                && change < 0.0
                && mild_pullback
                && calm_range
                && previous_uptrend;

            let strength = bar.volume / volume_ma[i];
            let volume_strength = if strength.is_finite() { strength } else { 0.0 };

            WeeklyFlags {
                date: bar.date,
                close: bar.close,
                volume: bar.volume,
                volume_ma: volume_ma[i],
                above_avg_volume,
                strong_price_increase,
                closing_strong,
                accumulation_day,
                low_volume_pullback,
                volume_strength,
            }
        })
        .collect()
}

// ============================================================================
// Trend
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Uptrend,
    Downtrend,
    Sideways,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uptrend => write!(f, "Uptrend"),
            Self::Downtrend => write!(f, "Downtrend"),
            Self::Sideways => write!(f, "Sideways"),
        }
    }
}

/// (close moving-average window, trailing bars inspected) for a lookback in weeks.
pub fn trend_window(weeks: u32) -> (usize, usize) {
    match weeks {
        0..=26 => (10, 4),
        27..=52 => (20, 6),
        53..=104 => (50, 8),
        _ => (50, 10),
    }
}

/// Classifies the latest trend from the share of rising bars in the trailing window and
/// the position and slope of the close moving average.
pub fn classify_trend(bars: &[PriceBar], weeks: u32) -> Trend {
    let (ma_window, recent) = trend_window(weeks);
    let n = bars.len();
    let Some(last) = bars.last() else {
        return Trend::Sideways;
    };

    let rising_bars = (n.saturating_sub(recent)..n)
        .filter(|&i| i > 0 && bars[i].close > bars[i - 1].close)
        .count() as f64;

    let sma = moving_average(bars, ma_window);
    let latest_sma = sma.last().copied().flatten();
    let previous_sma = n.checked_sub(2).and_then(|i| sma[i]);

    let above_sma = latest_sma.is_some_and(|ma| last.close > ma);
    let sma_rising = match (latest_sma, previous_sma) {
        (Some(latest), Some(previous)) => latest > previous,
        _ => false,
    };

    let recent = recent as f64;
    if rising_bars >= recent * 0.75 && above_sma && sma_rising {
        Trend::Uptrend
    } else if rising_bars <= recent * 0.25 && !above_sma && !sma_rising {
        Trend::Downtrend
    } else {
        Trend::Sideways
    }
}

// ============================================================================
// Sentiment
// ============================================================================

/// Qualitative reading of the sentiment score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstitutionalActivity {
    StrongAccumulation,
    ModerateAccumulation,
    PotentialDistribution,
    HighDistribution,
    Mixed,
}

impl InstitutionalActivity {
    /// Thresholds are checked in a fixed order: > 0.3, > 0.1, < -0.1, < -0.3.
    ///
    /// Because < -0.1 is tested first, a score at or below -0.3 reads as potential
    /// distribution and `HighDistribution` is never produced from a score.
    pub fn from_score(score: f64) -> Self {
        if score > 0.3 {
            Self::StrongAccumulation
        } else if score > 0.1 {
            Self::ModerateAccumulation
        } else if score < -0.1 {
            Self::PotentialDistribution
        } else if score < -0.3 {
            Self::HighDistribution
        } else {
            Self::Mixed
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::StrongAccumulation => "strong institutional accumulation and bullish momentum.",
            Self::ModerateAccumulation => "moderate accumulation with potential bullish trend.",
            Self::PotentialDistribution => {
                "potential distribution, suggesting institutional selling pressure."
            }
            Self::HighDistribution => "high distribution, indicating possible downtrend.",
            Self::Mixed => "mixed activity, with no clear sign of accumulation or distribution.",
        }
    }
}

/// Sentiment score rounded to two decimals. Non-finite inputs score 0.
pub fn sentiment_score(weighted_accumulation: f64, pullback_count: usize, total_bars: usize) -> f64 {
    let raw = (ACCUMULATION_WEIGHT * weighted_accumulation - PULLBACK_WEIGHT * pullback_count as f64)
        / total_bars.max(1) as f64;
    if !raw.is_finite() {
        return 0.0;
    }
    // Round the exact binary value; the shortest decimal form can invent a midpoint tie.
    Decimal::from_f64_retain(raw)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven))
        .and_then(|d| d.to_f64())
        .unwrap_or(0.0)
}

// ============================================================================
// Result
// ============================================================================

/// Volume accumulation insights for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccumulationResult {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Accumulation Days")]
    pub accumulation_days: usize,
    #[serde(rename = "Low Volume Pullbacks")]
    pub low_volume_pullbacks: usize,
    #[serde(rename = "Sentiment Score")]
    pub sentiment_score: f64,
    #[serde(rename = "Latest Trend")]
    pub latest_trend: Trend,
    #[serde(rename = "Analysis")]
    pub analysis: String,
    #[serde(skip)]
    pub activity: InstitutionalActivity,
}

/// Scores weekly volume behaviour over `period` (e.g. "6mo").
///
/// Fails with `DataUnavailable` when the frame is empty or lacks close or volume data.
/// Short series are scored as-is.
pub fn score_accumulation(
    symbol: &Symbol,
    frame: &OhlcvFrame,
    period: &str,
) -> Result<AccumulationResult> {
    if !frame.has_volume() {
        return Err(Error::data_unavailable(symbol.as_str()));
    }
    let bars = frame.to_bars(symbol)?;
    let flags = derive_flags(&bars);

    let accumulation_days = flags.iter().filter(|f| f.accumulation_day).count();
    let low_volume_pullbacks = flags.iter().filter(|f| f.low_volume_pullback).count();

    let weeks = LookbackPeriod::weeks_or_default(period);
    let latest_trend = classify_trend(&bars, weeks);

    let weighted_accumulation: f64 = flags
        .iter()
        .filter(|f| f.accumulation_day)
        .map(|f| f.volume_strength)
        .sum();
    let sentiment_score = sentiment_score(weighted_accumulation, low_volume_pullbacks, bars.len());
    let activity = InstitutionalActivity::from_score(sentiment_score);

    tracing::debug!(
        symbol = %symbol,
        bars = bars.len(),
        weeks,
        accumulation_days,
        low_volume_pullbacks,
        sentiment_score,
        trend = %latest_trend,
        "Volume accumulation scored"
    );

    let analysis = format!(
        "The stock has shown {accumulation_days} accumulation days over the last {period}, \
         while experiencing {low_volume_pullbacks} low-volume pullbacks. \
         The latest trend is {latest_trend}. \
         This suggests {}",
        activity.description()
    );

    Ok(AccumulationResult {
        ticker: symbol.to_string(),
        accumulation_days,
        low_volume_pullbacks,
        sentiment_score,
        latest_trend,
        analysis,
        activity,
    })
}

/// Whether the latest bar traded more than `factor` times its 10-bar average volume.
/// Series shorter than ten bars never qualify.
pub fn is_high_volume(bars: &[PriceBar], factor: f64) -> bool {
    if bars.len() < VOLUME_MA_WINDOW {
        return false;
    }
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
    let latest_ma = rolling_mean(&volumes, VOLUME_MA_WINDOW)
        .last()
        .copied()
        .flatten()
        .unwrap_or(0.0);
    volumes[volumes.len() - 1] > latest_ma * factor
}
