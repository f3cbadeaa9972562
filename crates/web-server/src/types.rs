// In crates/web-server/src/types.rs

use serde::{Deserialize, Serialize};

/// The success envelope shared by every endpoint. Failures use the same shape with
/// `status: "error"` and a `message` (see `Error::into_response`).
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { status: "success", data }
    }
}

/// Query parameters for `GET /analyze/volume/{ticker}`.
#[derive(Debug, Deserialize)]
pub struct VolumeParams {
    pub period: Option<String>,
}

/// Query parameters for `GET /scan/high-volume`.
#[derive(Debug, Deserialize)]
pub struct HighVolumeParams {
    #[serde(default = "default_market")]
    pub market: String,
    pub period: Option<String>,
    pub min_volume_factor: Option<f64>,
}

fn default_market() -> String {
    "sp500".to_string()
}
