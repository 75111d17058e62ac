use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::business_day_count;
use crate::error::AppError;
use crate::model::{ReturnKind, ReturnSeries};

/// Return level below which an observation counts as an incident.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(value: f64) -> Result<Self, AppError> {
        if !value.is_finite() {
            return Err(AppError::InvalidThreshold(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Strict comparison: a return equal to the threshold is not an incident.
    pub fn is_crossed_by(self, r: f64) -> bool {
        r < self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(-0.05)
    }
}

impl TryFrom<f64> for Threshold {
    type Error = AppError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Threshold> for f64 {
    fn from(t: Threshold) -> Self {
        t.0
    }
}

/// Everything the survival estimators need from one series.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSummary {
    pub event_count: usize,
    pub last_event: Option<NaiveDate>,
    /// Whole-day gaps between consecutive incidents, in event order.
    pub interarrival_days: Vec<i64>,
    /// Business days from the last incident to the reference date.
    pub running_days: Option<i64>,
}

/// Timestamps of all incidents, ascending.
pub fn event_timestamps(
    series: &ReturnSeries,
    threshold: Threshold,
    kind: ReturnKind,
) -> Vec<DateTime<FixedOffset>> {
    let mut out: Vec<_> = series
        .observations()
        .iter()
        .filter(|o| threshold.is_crossed_by(o.value(kind)))
        .map(|o| o.timestamp)
        .collect();
    out.sort();
    out
}

/// Successive differences in whole days. Partial days are truncated.
pub fn interarrival_days(timestamps: &[DateTime<FixedOffset>]) -> Vec<i64> {
    timestamps
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days())
        .collect()
}

pub fn extract_events(
    series: &ReturnSeries,
    threshold: Threshold,
    kind: ReturnKind,
    reference_date: NaiveDate,
) -> EventSummary {
    let timestamps = event_timestamps(series, threshold, kind);
    let last_event = timestamps.last().map(|t| t.date_naive());
    EventSummary {
        event_count: timestamps.len(),
        last_event,
        interarrival_days: interarrival_days(&timestamps),
        running_days: last_event.map(|d| business_day_count(d, reference_date)),
    }
}

/// Interarrival durations on log returns.
pub fn compute_interarrival_days(series: &ReturnSeries, threshold: Threshold) -> Vec<i64> {
    interarrival_days(&event_timestamps(series, threshold, ReturnKind::Log))
}

/// Business days since the last log-return incident, `None` without incidents.
pub fn compute_running_days(
    series: &ReturnSeries,
    threshold: Threshold,
    reference_date: NaiveDate,
) -> Option<i64> {
    event_timestamps(series, threshold, ReturnKind::Log)
        .last()
        .map(|t| business_day_count(t.date_naive(), reference_date))
}
