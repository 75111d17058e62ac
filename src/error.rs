use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("data unavailable for {ticker}: {reason}")]
    DataUnavailable { ticker: String, reason: String },

    #[error("invalid threshold {0}: must be a finite number")]
    InvalidThreshold(f64),

    #[error("invalid date range: start {start} must be before end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("invalid return series: {0}")]
    InvalidSeries(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
