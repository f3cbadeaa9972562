// In crates/web-server/src/lib.rs

use analytics::{AccumulationResult, StageResult};
use api_client::{MarketDataProvider, ScreenPreset};
use app_config::types::{MarketDataSettings, ScreenerSettings, ServerSettings};
use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json,
    routing::get,
};
use core_types::Symbol;
use std::sync::Arc;
use tokio::net::TcpListener;
use types::{ApiResponse, HighVolumeParams, VolumeParams};

pub mod error;
pub mod services;
pub mod types;

// Re-export our custom error type for convenience.
pub use error::{Error, Result};

/// The shared application state that is available to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn MarketDataProvider>,
    pub market_data: Arc<MarketDataSettings>,
    pub screener: Arc<ScreenerSettings>,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        market_data: MarketDataSettings,
        screener: ScreenerSettings,
    ) -> Self {
        Self {
            provider,
            market_data: Arc::new(market_data),
            screener: Arc::new(screener),
        }
    }
}

/// Creates the main application router with all routes and middleware.
pub fn create_router(app_state: AppState) -> Router {
    let cors = tower_http::cors::CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    Router::new()
        .route("/health", get(health_check_handler))
        .route("/analyze/stage2/{ticker}", get(stage2_handler))
        .route("/analyze/volume/{ticker}", get(volume_handler))
        .route("/stocks/hk/yahoo_codes", get(hk_codes_handler))
        .route("/screener/{preset}", get(screener_handler))
        .route("/scan/high-volume", get(high_volume_handler))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// A simple health check handler.
async fn health_check_handler() -> &'static str {
    "OK"
}

/// Handler for `GET /analyze/stage2/{ticker}`
async fn stage2_handler(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<ApiResponse<StageResult>>> {
    let symbol = Symbol::new(ticker.trim());
    let result = services::analyze_stage2(state.provider.as_ref(), &state.market_data, &symbol).await?;
    Ok(Json(ApiResponse::success(result)))
}

/// Handler for `GET /analyze/volume/{ticker}?period=6mo`
async fn volume_handler(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(params): Query<VolumeParams>,
) -> Result<Json<ApiResponse<AccumulationResult>>> {
    let symbol = Symbol::new(ticker.trim());
    let period = params.period.unwrap_or_else(|| state.screener.default_period.clone());
    let result =
        services::analyze_volume(state.provider.as_ref(), &state.market_data, &symbol, &period).await?;
    Ok(Json(ApiResponse::success(result)))
}

/// Handler for `GET /stocks/hk/yahoo_codes`
async fn hk_codes_handler(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<String>>>> {
    let codes = state.provider.hk_yahoo_codes().await?;
    tracing::info!(count = codes.len(), "Hong Kong main board codes listed");
    Ok(Json(ApiResponse::success(codes)))
}

/// Handler for `GET /screener/{preset}`
async fn screener_handler(
    State(state): State<AppState>,
    Path(preset): Path<String>,
) -> Result<Json<ApiResponse<Vec<String>>>> {
    let preset: ScreenPreset = preset
        .parse()
        .map_err(|e: api_client::Error| Error::InvalidRequest(e.to_string()))?;
    let names = state.provider.screen(preset).await?;
    tracing::info!(%preset, count = names.len(), "Screener preset evaluated");
    Ok(Json(ApiResponse::success(names)))
}

/// Handler for `GET /scan/high-volume?market=sp500&period=6mo&min_volume_factor=1.5`
async fn high_volume_handler(
    State(state): State<AppState>,
    Query(params): Query<HighVolumeParams>,
) -> Result<Json<ApiResponse<Vec<String>>>> {
    let period = params.period.unwrap_or_else(|| state.screener.default_period.clone());
    let factor = params
        .min_volume_factor
        .unwrap_or(state.screener.default_min_volume_factor);

    let tickers = services::search_high_volume_tickers(
        state.provider.as_ref(),
        &state.market_data,
        &state.screener,
        &params.market,
        &period,
        factor,
    )
    .await?;
    Ok(Json(ApiResponse::success(tickers)))
}

/// The main entry point for running the web server.
///
/// This function sets up the TCP listener and serves the application router.
/// It will run forever until the process is terminated.
pub async fn run(settings: ServerSettings, app_state: AppState) -> Result<()> {
    let app = create_router(app_state);

    let address = format!("{}:{}", settings.host, settings.port);
    tracing::info!("Web server listening on {}", address);

    let listener = TcpListener::bind(&address).await.map_err(Error::ServerBindError)?;

    axum::serve(listener, app.into_make_service())
        .await
        .map_err(Error::ServerError)?;

    Ok(())
}
