//! Unified error type for the trail-conditions service.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Weather provider failure: network, non-2xx status, timeout, bad payload.
    #[error("Weather provider error: {0}")]
    Provider(String),

    /// Forecast values that cannot be turned into trail metrics.
    #[error("Trail metrics calculation failed: {0}")]
    Calculation(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
