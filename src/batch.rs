use anyhow::Result;
use chrono::NaiveDate;
use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::AppError;
use crate::market_data::SeriesSource;
use crate::model::{ReturnKind, ReturnSeries};
use crate::survival::{
    extract_events, mean_residual_life_at, EventSummary, KaplanMeierTable, Threshold,
};

pub const DEFAULT_CONCURRENCY: usize = 4;

/// Survival statistics for one ticker evaluated at its running days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TickerStats {
    /// `None` when the series has no incident at all.
    pub running_days: Option<i64>,
    pub event_count: usize,
    pub interarrival_count: usize,
    pub mean_residual_life: f64,
    pub survival: f64,
    pub hazard: f64,
    pub cumulative_hazard: f64,
}

impl TickerStats {
    /// Fewer than two incidents: no gap distribution to evaluate.
    fn degenerate(summary: &EventSummary) -> Self {
        Self {
            running_days: summary.running_days,
            event_count: summary.event_count,
            interarrival_count: summary.interarrival_days.len(),
            mean_residual_life: 0.0,
            survival: 1.0,
            hazard: 0.0,
            cumulative_hazard: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowOutcome {
    Available(TickerStats),
    Unavailable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub ticker: String,
    #[serde(flatten)]
    pub outcome: RowOutcome,
}

impl ResultRow {
    pub fn stats(&self) -> Option<&TickerStats> {
        match &self.outcome {
            RowOutcome::Available(stats) => Some(stats),
            RowOutcome::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.stats().is_some()
    }
}

/// Runs the full pipeline on one series.
pub fn analyze_series(
    series: &ReturnSeries,
    threshold: Threshold,
    kind: ReturnKind,
    reference_date: NaiveDate,
) -> TickerStats {
    let summary = extract_events(series, threshold, kind, reference_date);
    let durations = &summary.interarrival_days;
    let t = match summary.running_days {
        Some(t) if !durations.is_empty() => t,
        _ => return TickerStats::degenerate(&summary),
    };

    let mrl = mean_residual_life_at(durations, t);
    let km = KaplanMeierTable::fit(durations).nearest(t);
    TickerStats {
        running_days: Some(t),
        event_count: summary.event_count,
        interarrival_count: durations.len(),
        mean_residual_life: mrl.value(),
        survival: km.survival(),
        hazard: km.hazard(),
        cumulative_hazard: km.cumulative_hazard(),
    }
}

pub struct BatchProcessor<S: SeriesSource> {
    source: S,
    reference_date: NaiveDate,
    return_kind: ReturnKind,
    concurrency: usize,
}

impl<S: SeriesSource> BatchProcessor<S> {
    pub fn new(source: S, reference_date: NaiveDate) -> Self {
        Self {
            source,
            reference_date,
            return_kind: ReturnKind::default(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Maximum number of tickers in flight at once.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_return_kind(mut self, kind: ReturnKind) -> Self {
        self.return_kind = kind;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// One row per ticker, in input order. Never fails as a whole: a ticker
    /// that cannot be fetched or analyzed becomes an unavailable row.
    pub async fn process_batch(&self, tickers: &[String], threshold: Threshold) -> Vec<ResultRow> {
        let batch_id = Uuid::new_v4();
        let span = tracing::info_span!("batch", %batch_id);

        async {
            tracing::info!(
                tickers = tickers.len(),
                threshold = threshold.value(),
                reference_date = %self.reference_date,
                concurrency = self.concurrency,
                "Starting batch"
            );

            let rows: Vec<ResultRow> = stream::iter(tickers)
                .map(|ticker| self.process_ticker(ticker, threshold))
                .buffered(self.concurrency)
                .collect()
                .await;

            let unavailable = rows.iter().filter(|r| !r.is_available()).count();
            tracing::info!(rows = rows.len(), unavailable, "Batch complete");
            rows
        }
        .instrument(span)
        .await
    }

    async fn process_ticker(&self, ticker: &str, threshold: Threshold) -> ResultRow {
        let outcome = match self.analyze_ticker(ticker, threshold).await {
            Ok(stats) => {
                tracing::debug!(
                    ticker,
                    running_days = ?stats.running_days,
                    events = stats.event_count,
                    "Ticker analyzed"
                );
                RowOutcome::Available(stats)
            }
            Err(e) => {
                let reason = format!("{:#}", e);
                tracing::warn!(ticker, error = %reason, "Failed to process ticker");
                RowOutcome::Unavailable { reason }
            }
        };
        ResultRow {
            ticker: ticker.to_string(),
            outcome,
        }
    }

    async fn analyze_ticker(&self, ticker: &str, threshold: Threshold) -> Result<TickerStats> {
        let series = self.source.fetch_series(ticker).await?;
        if series.is_empty() {
            return Err(AppError::DataUnavailable {
                ticker: ticker.to_string(),
                reason: "empty return series".to_string(),
            }
            .into());
        }
        Ok(analyze_series(
            &series,
            threshold,
            self.return_kind,
            self.reference_date,
        ))
    }
}
