// In crates/analytics/src/lib.rs

//! Stage 2 screening signals computed from price/volume history and quarterly fundamentals.
//!
//! Every entry point is a pure function of its inputs: the caller fetches the data, the
//! functions here annotate and classify it.

pub mod fundamentals;
pub mod series;
pub mod stage;
pub mod volume;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use fundamentals::{check_fundamentals_growth, growth_ratios};
pub use series::{AnnotatedSeries, is_trending_up, moving_average, rolling_mean};
pub use stage::{Check, StageResult, StageVerdict, classify_stage};
pub use volume::{
    AccumulationResult, InstitutionalActivity, LookbackPeriod, Trend, WeeklyFlags,
    is_high_volume, score_accumulation,
};
