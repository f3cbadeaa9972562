// In crates/web-server/src/error.rs

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Domain(#[from] core_types::Error),
    #[error("Upstream request failed: {0}")]
    Upstream(#[from] api_client::Error),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("Failed to bind server address: {0}")]
    ServerBindError(std::io::Error),
    #[error("Server error: {0}")]
    ServerError(std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Domain(core_types::Error::DataUnavailable { .. }) => StatusCode::NOT_FOUND,
            Error::Domain(core_types::Error::UnsupportedMarket(_)) => StatusCode::BAD_REQUEST,
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::Upstream(_) => StatusCode::BAD_GATEWAY,
            Error::ServerBindError(_) | Error::ServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let body = serde_json::json!({
            "status": "error",
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_unavailable_is_not_found() {
        let err = Error::from(core_types::Error::data_unavailable("ZZZZ"));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            err.to_string(),
            "No data retrieved for ZZZZ. Please check the ticker symbol."
        );
    }

    #[test]
    fn upstream_failures_are_bad_gateway() {
        let err = Error::from(api_client::Error::ApiError {
            code: "503".to_string(),
            msg: "unavailable".to_string(),
        });
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn unsupported_market_is_bad_request() {
        let err = Error::from(core_types::Error::UnsupportedMarket("nasdaq".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
