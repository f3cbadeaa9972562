// In crates/api-client/src/types.rs

use reqwest::Client;
use serde::Deserialize;

/// The HTTP client for every upstream the screener talks to: the chart and fundamentals
/// endpoints, the stock scanner, and the index-membership page.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// The persistent HTTP client.
    pub http_client: Client,
    pub chart_base_url: String,
    pub fundamentals_base_url: String,
    pub scanner_base_url: String,
    pub sp500_source_url: String,
}

/// Top-level body of a chart response.
#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    pub chart: ChartBody,
}

#[derive(Debug, Deserialize)]
pub struct ChartBody {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<UpstreamError>,
}

/// Error object embedded in chart and fundamentals responses.
#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamError {
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    /// Bar open times in seconds since the epoch. Absent when the range has no bars.
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Debug, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<RawQuote>,
}

/// Column-oriented OHLCV values; individual entries are null on sessions without trades.
#[derive(Debug, Deserialize, Default)]
pub struct RawQuote {
    pub open: Option<Vec<Option<f64>>>,
    pub high: Option<Vec<Option<f64>>>,
    pub low: Option<Vec<Option<f64>>>,
    pub close: Option<Vec<Option<f64>>>,
    pub volume: Option<Vec<Option<f64>>>,
}
