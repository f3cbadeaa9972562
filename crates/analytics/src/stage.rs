// In crates/analytics/src/stage.rs

use crate::fundamentals::check_fundamentals_growth;
use crate::series::AnnotatedSeries;
use core_types::{FundamentalsSnapshot, OhlcvFrame, PriceBar, Result, Symbol};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bars in each of the two windows compared by the higher-highs/higher-lows check.
pub const SWING_WINDOW: usize = 120;
/// Lookback of the relative-strength proxy (roughly six months of daily bars).
pub const RS_LOOKBACK: usize = 126;

/// (window, lookback) pairs that must all be trending up.
const TRENDING_WINDOWS: [(usize, usize); 5] = [(10, 5), (20, 10), (50, 25), (100, 50), (200, 100)];

/// A single pass/fail criterion, reported as "Yes" or "No".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Check {
    Yes,
    No,
}

impl Check {
    pub fn passed(self) -> bool {
        self == Check::Yes
    }
}

impl From<bool> for Check {
    fn from(passed: bool) -> Self {
        if passed { Check::Yes } else { Check::No }
    }
}

/// The tiered Stage 2 verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageVerdict {
    No,
    Yes,
    #[serde(rename = "Yes+")]
    YesPlus,
    #[serde(rename = "Yes++")]
    YesPlusPlus,
}

impl StageVerdict {
    /// Combines the technical gate with the number of bonus criteria met.
    /// Bonuses only count once every technical criterion passed.
    pub fn from_criteria(technical_pass: bool, bonus_count: usize) -> Self {
        match (technical_pass, bonus_count) {
            (false, _) => StageVerdict::No,
            (true, 0) => StageVerdict::Yes,
            (true, 1) => StageVerdict::YesPlus,
            (true, _) => StageVerdict::YesPlusPlus,
        }
    }
}

impl fmt::Display for StageVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StageVerdict::No => "No",
            StageVerdict::Yes => "Yes",
            StageVerdict::YesPlus => "Yes+",
            StageVerdict::YesPlusPlus => "Yes++",
        };
        f.write_str(label)
    }
}

/// The outcome of a Stage 2 classification for one ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResult {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "MA_sequence_10>20>50>100>200")]
    pub ma_sequence: Check,
    #[serde(rename = "MAs_trending_up")]
    pub mas_trending_up: Check,
    #[serde(rename = "Price_above_50d_or_30w(150d)")]
    pub price_above_support: Check,
    #[serde(rename = "Higher_highs_higher_lows")]
    pub higher_highs_lows: Check,
    #[serde(rename = "EPS_sales_growth_3Q")]
    pub fundamentals_growth: Check,
    #[serde(rename = "RS_>=70")]
    pub relative_strength: Check,
    #[serde(rename = "Stage2_Overall")]
    pub overall: StageVerdict,
}

/// Classifies a ticker's price history against the Stage 2 criteria.
///
/// Fails with `DataUnavailable` when the frame is empty or has no close prices. Every
/// other shortfall (short history, missing averages) degrades individual criteria.
pub fn classify_stage(
    symbol: &Symbol,
    frame: &OhlcvFrame,
    fundamentals: &FundamentalsSnapshot,
) -> Result<StageResult> {
    let bars = frame.to_bars(symbol)?;
    let series = AnnotatedSeries::with_stage_windows(bars);
    Ok(classify_annotated(symbol, &series, fundamentals))
}

/// Classification over an already annotated, non-empty series.
pub fn classify_annotated(
    symbol: &Symbol,
    series: &AnnotatedSeries,
    fundamentals: &FundamentalsSnapshot,
) -> StageResult {
    let price = series.latest().map(|b| b.close).unwrap_or_default();

    let ma_sequence = check_ma_sequence(series);
    let mas_trending_up = check_mas_trending_up(series);
    let price_above_support = check_price_above_support(series);
    let higher_highs_lows = check_higher_highs_lows(series.bars());
    let fundamentals_growth = check_fundamentals_growth(fundamentals);
    let relative_strength = relative_strength_proxy(series.bars(), price);

    let technical_pass = ma_sequence && mas_trending_up && price_above_support && higher_highs_lows;
    let bonus_count = [fundamentals_growth, relative_strength]
        .iter()
        .filter(|passed| **passed)
        .count();
    let overall = StageVerdict::from_criteria(technical_pass, bonus_count);

    tracing::debug!(
        symbol = %symbol,
        bars = series.len(),
        ma_sequence,
        mas_trending_up,
        price_above_support,
        higher_highs_lows,
        fundamentals_growth,
        relative_strength,
        %overall,
        "Stage 2 criteria evaluated"
    );

    StageResult {
        ticker: symbol.to_string(),
        ma_sequence: ma_sequence.into(),
        mas_trending_up: mas_trending_up.into(),
        price_above_support: price_above_support.into(),
        higher_highs_lows: higher_highs_lows.into(),
        fundamentals_growth: fundamentals_growth.into(),
        relative_strength: relative_strength.into(),
        overall,
    }
}

/// MA10 > MA20 > MA50 > MA100 > MA200 at the latest bar, strictly.
pub fn check_ma_sequence(series: &AnnotatedSeries) -> bool {
    let averages = [10, 20, 50, 100, 200].map(|window| series.latest_ma(window));
    let [Some(ma10), Some(ma20), Some(ma50), Some(ma100), Some(ma200)] = averages else {
        return false;
    };
    ma10 > ma20 && ma20 > ma50 && ma50 > ma100 && ma100 > ma200
}

/// Every tracked average is at or above its value a window-specific number of bars ago.
pub fn check_mas_trending_up(series: &AnnotatedSeries) -> bool {
    TRENDING_WINDOWS
        .iter()
        .all(|&(window, lookback)| series.ma_trending_up(window, lookback))
}

/// The latest close is above the 50-bar or the 150-bar average.
/// A missing average never satisfies its side of the condition.
pub fn check_price_above_support(series: &AnnotatedSeries) -> bool {
    let Some(price) = series.latest().map(|b| b.close) else {
        return false;
    };
    let above = |window| series.latest_ma(window).is_some_and(|ma| price > ma);
    above(50) || above(150)
}

/// The most recent 120 bars made both a higher high and a higher low than the bars before.
///
/// The prior window is the 120 bars before the recent one, or everything before it when
/// fewer than 240 bars exist.
pub fn check_higher_highs_lows(bars: &[PriceBar]) -> bool {
    if bars.len() < SWING_WINDOW {
        return false;
    }
    let split = bars.len() - SWING_WINDOW;
    let recent = &bars[split..];
    let prior = &bars[split.saturating_sub(SWING_WINDOW)..split];
    if recent.is_empty() || prior.is_empty() {
        return false;
    }

    let max_high = |window: &[PriceBar]| window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
    let min_low = |window: &[PriceBar]| window.iter().map(|b| b.low).fold(f64::MAX, f64::min);

    max_high(recent) > max_high(prior) && min_low(recent) > min_low(prior)
}

/// Placeholder for a percentile relative-strength rank: passes when the return since the
/// close 126 bars ago is positive.
pub fn relative_strength_proxy(bars: &[PriceBar], price: f64) -> bool {
    if bars.len() < RS_LOOKBACK {
        return false;
    }
    let start_price = bars[bars.len() - RS_LOOKBACK].close;
    if !start_price.is_finite() || start_price <= 0.0 {
        return false;
    }
    (price - start_price) / start_price > 0.0
}
