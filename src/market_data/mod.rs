pub mod universe;
pub mod yahoo;

use std::future::Future;

use anyhow::Result;

use crate::model::ReturnSeries;

pub use universe::{Universe, OPCOES_TOP_50};
pub use yahoo::{parse_chart_body, parse_chart_response, ChartWindow, YahooChartClient};

/// Supplies the return series for one ticker.
///
/// Any error, including timeouts, is reported per ticker and never aborts a
/// batch.
pub trait SeriesSource {
    fn fetch_series(&self, ticker: &str) -> impl Future<Output = Result<ReturnSeries>> + Send;
}
