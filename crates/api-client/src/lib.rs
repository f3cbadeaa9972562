// In crates/api-client/src/lib.rs

use app_config::types::{MarketDataSettings, ScreenerSettings};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use core_types::{FundamentalsSnapshot, OhlcvFrame, Symbol};
use reqwest::{RequestBuilder, StatusCode};
use std::time::Duration as StdDuration;

pub mod error;
pub mod provider;
pub mod screener;
pub mod types;
pub mod universe;
pub mod yahoo;

// Re-export public types
pub use error::{Error, Result};
pub use provider::MarketDataProvider;
pub use screener::{Filter, ScreenPreset, ScreenerQuery, ScreenerRow};
pub use types::*;
pub use universe::{is_main_board, to_yahoo_hk_code};

/// How far back the quarterly fundamentals request reaches.
const FUNDAMENTALS_LOOKBACK_DAYS: i64 = 730;

impl ApiClient {
    /// Constructs a new ApiClient from the market data and screener settings.
    pub fn new(market_data: &MarketDataSettings, screener: &ScreenerSettings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(market_data.user_agent.clone())
            .timeout(StdDuration::from_secs(market_data.request_timeout_secs))
            .build()
            .map_err(|e| Error::ClientBuildError(e.to_string()))?;

        Ok(ApiClient {
            http_client,
            chart_base_url: market_data.chart_base_url.trim_end_matches('/').to_string(),
            fundamentals_base_url: market_data
                .fundamentals_base_url
                .trim_end_matches('/')
                .to_string(),
            scanner_base_url: screener.scanner_base_url.trim_end_matches('/').to_string(),
            sp500_source_url: screener.sp500_source_url.clone(),
        })
    }

    /// Sends a request and returns the status with the raw body.
    async fn send(&self, request: RequestBuilder) -> Result<(StatusCode, String)> {
        let response = request.send().await.map_err(Error::RequestFailed)?;
        let status = response.status();
        let text = response.text().await.map_err(Error::RequestFailed)?;
        Ok((status, text))
    }
}

/// Upstream error bodies usually carry their own error object; when they do not parse,
/// report the HTTP status instead of the deserialization failure.
fn with_status<T>(status: StatusCode, body: &str, parsed: Result<T>) -> Result<T> {
    match parsed {
        Err(Error::DeserializationFailed(_)) if !status.is_success() => Err(Error::ApiError {
            code: status.as_u16().to_string(),
            msg: body.chars().take(200).collect(),
        }),
        other => other,
    }
}

#[async_trait]
impl MarketDataProvider for ApiClient {
    async fn history(&self, symbol: &Symbol, range: &str, interval: &str) -> Result<OhlcvFrame> {
        let url = format!("{}/{}", self.chart_base_url, symbol);
        tracing::debug!(%symbol, range, interval, "Fetching price history");

        let request = self
            .http_client
            .get(&url)
            .query(&[("range", range), ("interval", interval), ("includePrePost", "false")]);
        let (status, body) = self.send(request).await?;

        let frame = with_status(status, &body, yahoo::parse_chart_response(&body))?;
        tracing::debug!(%symbol, bars = frame.len(), "Price history received");
        Ok(frame)
    }

    async fn quarterly_fundamentals(&self, symbol: &Symbol) -> Result<FundamentalsSnapshot> {
        let url = format!("{}/{}", self.fundamentals_base_url, symbol);
        let now = Utc::now();
        let period1 = (now - Duration::days(FUNDAMENTALS_LOOKBACK_DAYS)).timestamp().to_string();
        let period2 = now.timestamp().to_string();
        let series = format!("{},{}", yahoo::NET_INCOME_SERIES, yahoo::TOTAL_REVENUE_SERIES);

        let request = self.http_client.get(&url).query(&[
            ("symbol", symbol.as_str()),
            ("type", series.as_str()),
            ("period1", period1.as_str()),
            ("period2", period2.as_str()),
        ]);
        let (status, body) = self.send(request).await?;

        with_status(status, &body, yahoo::parse_fundamentals_response(&body))
    }

    async fn sp500_tickers(&self) -> Result<Vec<String>> {
        let (status, body) = self.send(self.http_client.get(&self.sp500_source_url)).await?;
        if !status.is_success() {
            return Err(Error::ApiError {
                code: status.as_u16().to_string(),
                msg: "Failed to load the S&P 500 constituents page".to_string(),
            });
        }
        universe::parse_sp500_table(&body)
    }

    async fn scan(&self, query: &ScreenerQuery) -> Result<Vec<ScreenerRow>> {
        let url = format!("{}/{}/scan", self.scanner_base_url, query.market);
        tracing::debug!(market = %query.market, filters = query.filter.len(), "Running scanner query");

        let (status, body) = self.send(self.http_client.post(&url).json(query)).await?;
        if !status.is_success() {
            return Err(Error::ApiError {
                code: status.as_u16().to_string(),
                msg: body.chars().take(200).collect(),
            });
        }

        let response: screener::ScanResponse = serde_json::from_str(&body)?;
        tracing::debug!(total = response.total_count, returned = response.data.len(), "Scanner query done");
        Ok(response.data)
    }
}
