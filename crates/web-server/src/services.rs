// In crates/web-server/src/services.rs

//! Fetch-then-analyze orchestration behind the HTTP handlers and the CLI.

use crate::error::Result;
use analytics::{AccumulationResult, StageResult, classify_stage, is_high_volume, score_accumulation};
use api_client::MarketDataProvider;
use app_config::types::{MarketDataSettings, ScreenerSettings};
use core_types::{FundamentalsSnapshot, OhlcvFrame, Symbol};
use std::time::Duration;

/// Fetches daily history and quarterly fundamentals, then classifies the ticker.
///
/// A fundamentals failure only fails the growth criterion.
pub async fn analyze_stage2(
    provider: &dyn MarketDataProvider,
    market_data: &MarketDataSettings,
    symbol: &Symbol,
) -> Result<StageResult> {
    let frame = fetch_history(
        provider,
        symbol,
        &market_data.stage2_range,
        &market_data.stage2_interval,
    )
    .await?;

    let fundamentals = match provider.quarterly_fundamentals(symbol).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::warn!(symbol = %symbol, error = %e, "Fundamentals unavailable, growth check will fail");
            FundamentalsSnapshot::default()
        }
    };

    let result = classify_stage(symbol, &frame, &fundamentals)?;
    tracing::info!(symbol = %symbol, overall = %result.overall, "Stage 2 classification complete");
    Ok(result)
}

/// Fetches weekly history over `period` and scores volume accumulation.
pub async fn analyze_volume(
    provider: &dyn MarketDataProvider,
    market_data: &MarketDataSettings,
    symbol: &Symbol,
    period: &str,
) -> Result<AccumulationResult> {
    let frame = fetch_history(provider, symbol, period, &market_data.volume_interval).await?;
    let result = score_accumulation(symbol, &frame, period)?;
    tracing::info!(
        symbol = %symbol,
        sentiment_score = result.sentiment_score,
        trend = %result.latest_trend,
        "Volume analysis complete"
    );
    Ok(result)
}

/// Walks a market's universe one ticker at a time and keeps those whose latest weekly
/// volume exceeds `min_volume_factor` times its 10-week average.
///
/// Tickers that fail to load or have too little history are skipped.
pub async fn search_high_volume_tickers(
    provider: &dyn MarketDataProvider,
    market_data: &MarketDataSettings,
    screener: &ScreenerSettings,
    market: &str,
    period: &str,
    min_volume_factor: f64,
) -> Result<Vec<String>> {
    let tickers = match market {
        "sp500" => provider.sp500_tickers().await?,
        "hkex" => provider.hk_yahoo_codes().await?,
        other => return Err(core_types::Error::UnsupportedMarket(other.to_string()).into()),
    };
    tracing::info!(market, tickers = tickers.len(), period, min_volume_factor, "Starting high-volume scan");

    let delay = Duration::from_millis(screener.scan_delay_ms);
    let mut matches = Vec::new();

    for (i, ticker) in tickers.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let symbol = Symbol::new(ticker.as_str());
        let frame = match provider.history(&symbol, period, &market_data.volume_interval).await {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(symbol = %symbol, error = %e, "Skipping ticker");
                continue;
            }
        };
        if !frame.has_volume() {
            continue;
        }
        let Ok(bars) = frame.to_bars(&symbol) else {
            continue;
        };

        if is_high_volume(&bars, min_volume_factor) {
            tracing::info!(symbol = %symbol, "High volume detected");
            matches.push(ticker.clone());
        }
    }

    tracing::info!(market, matched = matches.len(), "High-volume scan complete");
    Ok(matches)
}

/// History for one ticker. An upstream "not found" means the ticker has no data.
async fn fetch_history(
    provider: &dyn MarketDataProvider,
    symbol: &Symbol,
    range: &str,
    interval: &str,
) -> Result<OhlcvFrame> {
    match provider.history(symbol, range, interval).await {
        Ok(frame) => {
            tracing::debug!(symbol = %symbol, bars = frame.len(), range, interval, "History fetched");
            Ok(frame)
        }
        Err(api_client::Error::ApiError { code, .. }) if code == "Not Found" || code == "404" => {
            Err(core_types::Error::data_unavailable(symbol.as_str()).into())
        }
        Err(e) => Err(e.into()),
    }
}
