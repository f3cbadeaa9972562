// In app/src/main.rs

use anyhow::Result;
use api_client::{ApiClient, MarketDataProvider, ScreenPreset};
use app_config::types::Settings;
use clap::{Parser, Subcommand};
use core_types::Symbol;
use serde::Serialize;
use std::sync::Arc;
use web_server::{AppState, services};

mod telemetry;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "Stage 2 stock screening service.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Starts the HTTP API.
    Serve,

    /// Classifies a ticker against the Stage 2 criteria.
    Stage2 {
        /// The ticker to analyze (e.g., "AAPL", "0700.HK").
        ticker: String,
    },

    /// Scores weekly volume accumulation for a ticker.
    Volume {
        ticker: String,

        /// Lookback such as "6mo", "1y" or "12wk". Defaults to the configured period.
        #[arg(short, long)]
        period: Option<String>,
    },

    /// Scans a market for tickers trading on unusually high volume.
    ScanVolume {
        /// "sp500" or "hkex".
        #[arg(short, long, default_value = "sp500")]
        market: String,

        #[arg(short, long)]
        period: Option<String>,

        /// Multiple of the 10-week average volume the latest week must exceed.
        #[arg(long)]
        min_volume_factor: Option<f64>,
    },

    /// Lists Hong Kong main board stocks as Yahoo Finance codes.
    HkCodes,

    /// Runs a preset screen ("hk", "hk-volume" or "us").
    Screen { preset: String },
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = app_config::load_settings()?;
    telemetry::init(&settings.app.log_level);
    tracing::info!(environment = %settings.app.environment, "Settings loaded");

    let client = ApiClient::new(&settings.market_data, &settings.screener)?;

    match cli.command {
        Commands::Serve => serve(settings, client).await?,
        Commands::Stage2 { ticker } => {
            let symbol = Symbol::new(ticker.trim());
            let result = services::analyze_stage2(&client, &settings.market_data, &symbol).await?;
            print_json(&result)?;
        }
        Commands::Volume { ticker, period } => {
            let symbol = Symbol::new(ticker.trim());
            let period = period.unwrap_or_else(|| settings.screener.default_period.clone());
            let result =
                services::analyze_volume(&client, &settings.market_data, &symbol, &period).await?;
            print_json(&result)?;
        }
        Commands::ScanVolume { market, period, min_volume_factor } => {
            let period = period.unwrap_or_else(|| settings.screener.default_period.clone());
            let factor = min_volume_factor.unwrap_or(settings.screener.default_min_volume_factor);
            let tickers = services::search_high_volume_tickers(
                &client,
                &settings.market_data,
                &settings.screener,
                &market,
                &period,
                factor,
            )
            .await?;
            print_json(&tickers)?;
        }
        Commands::HkCodes => {
            let codes = client.hk_yahoo_codes().await?;
            print_json(&codes)?;
        }
        Commands::Screen { preset } => {
            let preset: ScreenPreset = preset.parse()?;
            let names = client.screen(preset).await?;
            print_json(&names)?;
        }
    }

    Ok(())
}

/// The `serve` command. Runs until the process is terminated.
async fn serve(settings: Settings, client: ApiClient) -> Result<()> {
    let state = AppState::new(
        Arc::new(client),
        settings.market_data.clone(),
        settings.screener.clone(),
    );
    web_server::run(settings.server, state).await?;
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
