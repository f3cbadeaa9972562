// In crates/analytics/src/fixtures.rs

//! Named price/fundamentals scenarios for tests.

use chrono::{Duration, TimeZone, Utc};
use core_types::{FundamentalsSnapshot, OhlcvFrame, Symbol};

/// Bars generated for every non-empty scenario.
pub const SCENARIO_BARS: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Strictly rising closes, no fundamentals.
    Up,
    /// Constant closes, no fundamentals.
    Flat,
    /// Strictly rising closes with four quarters of growing income and revenue.
    BonusBoth,
    /// No bars at all.
    Empty,
    /// Highs and lows but no close column.
    MissingClose,
}

impl Scenario {
    pub const ALL: [Scenario; 5] = [
        Scenario::Up,
        Scenario::Flat,
        Scenario::BonusBoth,
        Scenario::Empty,
        Scenario::MissingClose,
    ];

    pub fn symbol(self) -> Symbol {
        let name = match self {
            Scenario::Up => "TEST_UP",
            Scenario::Flat => "TEST_FLAT",
            Scenario::BonusBoth => "TEST_BONUS_BOTH",
            Scenario::Empty => "EMPTY",
            Scenario::MissingClose => "MISSING_CLOSE",
        };
        Symbol::new(name)
    }

    /// The daily price frame and fundamentals snapshot for this scenario.
    pub fn build(self) -> (OhlcvFrame, FundamentalsSnapshot) {
        match self {
            Scenario::Up => (rising_frame(), FundamentalsSnapshot::default()),
            Scenario::Flat => (flat_frame(), FundamentalsSnapshot::default()),
            Scenario::BonusBoth => (
                rising_frame(),
                FundamentalsSnapshot {
                    net_income: vec![200.0, 150.0, 100.0, 50.0],
                    total_revenue: vec![400.0, 300.0, 200.0, 100.0],
                },
            ),
            Scenario::Empty => (OhlcvFrame::default(), FundamentalsSnapshot::default()),
            Scenario::MissingClose => {
                let mut frame = rising_frame();
                frame.close = None;
                (frame, FundamentalsSnapshot::default())
            }
        }
    }
}

fn frame_from_closes(closes: Vec<f64>) -> OhlcvFrame {
    let end = Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap();
    let len = closes.len() as i64;
    OhlcvFrame {
        dates: (0..len).map(|i| end - Duration::days(len - 1 - i)).collect(),
        open: Some(closes.clone()),
        high: closes.iter().map(|c| c + 2.0).collect(),
        low: closes.iter().map(|c| c - 2.0).collect(),
        volume: Some(vec![1_000_000.0; closes.len()]),
        close: Some(closes),
    }
}

fn rising_frame() -> OhlcvFrame {
    frame_from_closes((0..SCENARIO_BARS).map(|i| 100.0 + i as f64).collect())
}

fn flat_frame() -> OhlcvFrame {
    frame_from_closes(vec![100.0; SCENARIO_BARS])
}
