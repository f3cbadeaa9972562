// In crates/core-types/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The price series for a requested symbol was empty or had no close prices.
    #[error("No data retrieved for {symbol}. Please check the ticker symbol.")]
    DataUnavailable { symbol: String },

    #[error("Unsupported market '{0}'. Supported markets: 'sp500', 'hkex'")]
    UnsupportedMarket(String),
}

impl Error {
    pub fn data_unavailable(symbol: impl Into<String>) -> Self {
        Self::DataUnavailable { symbol: symbol.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
