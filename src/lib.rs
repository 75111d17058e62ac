pub mod batch;
pub mod calendar;
pub mod config;
pub mod error;
pub mod market_data;
pub mod model;
pub mod survival;

pub use batch::{analyze_series, BatchProcessor, ResultRow, RowOutcome, TickerStats};
pub use survival::{
    compute_interarrival_days, compute_running_days, kaplan_meier, mean_residual_life, Threshold,
};
