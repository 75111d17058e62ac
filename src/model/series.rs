use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::model::bar::PriceBar;

/// Which return column incident detection reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnKind {
    #[default]
    Log,
    Simple,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnObservation {
    pub timestamp: DateTime<FixedOffset>,
    pub simple_return: f64,
    pub log_return: f64,
}

impl ReturnObservation {
    pub fn from_simple(timestamp: DateTime<FixedOffset>, simple_return: f64) -> Self {
        Self {
            timestamp,
            simple_return,
            log_return: simple_return.ln_1p(),
        }
    }

    pub fn value(&self, kind: ReturnKind) -> f64 {
        match kind {
            ReturnKind::Log => self.log_return,
            ReturnKind::Simple => self.simple_return,
        }
    }
}

/// Chronologically ordered returns with strictly increasing timestamps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReturnSeries {
    observations: Vec<ReturnObservation>,
}

impl ReturnSeries {
    /// Sorts by timestamp and rejects duplicate timestamps.
    pub fn new(mut observations: Vec<ReturnObservation>) -> Result<Self, AppError> {
        observations.sort_by_key(|o| o.timestamp);
        if let Some(pair) = observations
            .windows(2)
            .find(|w| w[0].timestamp == w[1].timestamp)
        {
            return Err(AppError::InvalidSeries(format!(
                "duplicate timestamp {}",
                pair[0].timestamp
            )));
        }
        Ok(Self { observations })
    }

    /// Derives simple and log returns from consecutive closes.
    ///
    /// The first bar has no predecessor and yields no observation; pairs with
    /// an undefined return are skipped.
    pub fn from_bars(bars: &[PriceBar]) -> Result<Self, AppError> {
        let observations = bars
            .windows(2)
            .filter_map(|w| {
                let r = w[1].simple_return_from(&w[0])?;
                let obs = ReturnObservation::from_simple(w[1].timestamp, r);
                obs.log_return.is_finite().then_some(obs)
            })
            .collect();
        Self::new(observations)
    }

    pub fn observations(&self) -> &[ReturnObservation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn ts(day: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 1, day, 0, 0, 0)
            .unwrap()
    }

    #[test]
    fn new_sorts_observations() {
        let series = ReturnSeries::new(vec![
            ReturnObservation::from_simple(ts(3), 0.01),
            ReturnObservation::from_simple(ts(1), -0.02),
        ])
        .unwrap();
        assert_eq!(series.observations()[0].timestamp, ts(1));
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn duplicate_timestamps_rejected() {
        let err = ReturnSeries::new(vec![
            ReturnObservation::from_simple(ts(2), 0.01),
            ReturnObservation::from_simple(ts(2), 0.02),
        ])
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidSeries(_)));
    }

    #[test]
    fn from_bars_computes_log_returns() {
        let start = ts(1);
        let closes = [100.0, 110.0, 99.0];
        let bars: Vec<PriceBar> = closes
            .iter()
            .enumerate()
            .map(|(i, c)| PriceBar {
                timestamp: start + Duration::days(i as i64),
                open: *c,
                high: *c,
                low: *c,
                close: *c,
                volume: 0.0,
            })
            .collect();

        let series = ReturnSeries::from_bars(&bars).unwrap();
        assert_eq!(series.len(), 2);
        let first = &series.observations()[0];
        assert!((first.simple_return - 0.1).abs() < 1e-12);
        assert!((first.log_return - 1.1f64.ln()).abs() < 1e-12);
        let second = &series.observations()[1];
        assert!((second.simple_return + 0.1).abs() < 1e-12);
        assert!((second.value(ReturnKind::Log) - 0.9f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn total_loss_is_dropped() {
        let start = ts(1);
        let bars: Vec<PriceBar> = [10.0, 0.0]
            .iter()
            .enumerate()
            .map(|(i, c)| PriceBar {
                timestamp: start + Duration::days(i as i64),
                open: *c,
                high: *c,
                low: *c,
                close: *c,
                volume: 0.0,
            })
            .collect();
        // ln(1 + -1) is -inf and is not a usable observation.
        assert!(ReturnSeries::from_bars(&bars).unwrap().is_empty());
    }
}
