// In crates/api-client/src/provider.rs

use crate::error::Result;
use crate::screener::{hk_listing_query, ScreenPreset, ScreenerQuery, ScreenerRow};
use crate::universe::{is_main_board, to_yahoo_hk_code};
use async_trait::async_trait;
use core_types::{FundamentalsSnapshot, OhlcvFrame, Symbol};
use std::collections::HashSet;

/// Everything the screening service needs from the outside world.
///
/// `ApiClient` is the live implementation; tests substitute canned data.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Price history over `range` (e.g. `"2y"`, `"6mo"`) sampled at `interval`
    /// (`"1d"`, `"1wk"`), oldest bar first.
    async fn history(&self, symbol: &Symbol, range: &str, interval: &str) -> Result<OhlcvFrame>;

    /// Up to four most recent quarters of net income and total revenue.
    async fn quarterly_fundamentals(&self, symbol: &Symbol) -> Result<FundamentalsSnapshot>;

    /// Current S&P 500 constituents as provider tickers.
    async fn sp500_tickers(&self) -> Result<Vec<String>>;

    async fn scan(&self, query: &ScreenerQuery) -> Result<Vec<ScreenerRow>>;

    /// Main board Hong Kong stocks in `.HK` form.
    async fn hk_yahoo_codes(&self) -> Result<Vec<String>> {
        let rows = self.scan(&hk_listing_query()).await?;
        // First occurrence wins; the scanner does not return rows in code order.
        let mut seen = HashSet::new();
        let codes: Vec<String> = rows
            .iter()
            .filter_map(ScreenerRow::name)
            .filter(|code| is_main_board(code))
            .filter_map(|code| to_yahoo_hk_code(&code))
            .filter(|code| seen.insert(code.clone()))
            .collect();
        Ok(codes)
    }

    /// Names of the stocks matching a preset screen.
    async fn screen(&self, preset: ScreenPreset) -> Result<Vec<String>> {
        let rows = self.scan(&preset.query()).await?;
        Ok(rows.iter().filter_map(ScreenerRow::name).collect())
    }
}
