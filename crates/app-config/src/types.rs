// In crates/app-config/src/types.rs

use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The application's general settings.
    pub app: AppSettings,
    pub server: ServerSettings,
    /// Where price history and fundamentals are fetched from.
    pub market_data: MarketDataSettings,
    #[serde(default)]
    pub screener: ScreenerSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone)]
pub struct MarketDataSettings {
    /// Base URL of the chart (price history) endpoint, without the symbol.
    pub chart_base_url: String,
    /// Base URL of the fundamentals time-series endpoint, without the symbol.
    pub fundamentals_base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// History requested for a Stage 2 classification.
    #[serde(default = "default_stage2_range")]
    pub stage2_range: String,
    #[serde(default = "default_daily")]
    pub stage2_interval: String,
    #[serde(default = "default_weekly")]
    pub volume_interval: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ScreenerSettings {
    /// Base URL of the stock scanner; the market name is appended as a path segment.
    pub scanner_base_url: String,
    /// Page listing the S&P 500 constituents.
    pub sp500_source_url: String,
    /// Pause between tickers during a market-wide scan.
    pub scan_delay_ms: u64,
    pub default_period: String,
    pub default_min_volume_factor: f64,
}

impl Default for ScreenerSettings {
    fn default() -> Self {
        Self {
            scanner_base_url: "https://scanner.tradingview.com".into(),
            sp500_source_url: "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies".into(),
            scan_delay_ms: 2_000,
            default_period: "6mo".into(),
            default_min_volume_factor: 1.5,
        }
    }
}

// Helper functions for serde defaults.
fn default_user_agent() -> String { "Mozilla/5.0 (compatible; stage-screener/0.1)".into() }
fn default_timeout() -> u64 { 20 }
fn default_stage2_range() -> String { "2y".into() }
fn default_daily() -> String { "1d".into() }
fn default_weekly() -> String { "1wk".into() }
