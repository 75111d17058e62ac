//! Tie-aware Kaplan–Meier estimator with cumulative (Nelson–Aalen style)
//! hazard.
//!
//! Every duration is an observed event; nothing is censored. Observations are
//! grouped by distinct duration and the risk set shrinks by the whole group
//! at each step:
//!
//! ```text
//! h_i = d_i / n_i
//! S_i = S_{i-1} * (1 - h_i)
//! H_i = H_{i-1} + h_i
//! n_{i+1} = n_i - d_i
//! ```

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KmRow {
    pub time: i64,
    pub at_risk: usize,
    pub events: usize,
    pub survival: f64,
    pub hazard: f64,
    pub cumulative_hazard: f64,
}

/// Result of looking a duration up in a table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SurvivalEstimate {
    Observed(KmRow),
    /// No durations were observed; reads as survival 1, zero hazard.
    NoData,
}

impl SurvivalEstimate {
    pub fn survival(&self) -> f64 {
        match self {
            Self::Observed(row) => row.survival,
            Self::NoData => 1.0,
        }
    }

    pub fn hazard(&self) -> f64 {
        match self {
            Self::Observed(row) => row.hazard,
            Self::NoData => 0.0,
        }
    }

    pub fn cumulative_hazard(&self) -> f64 {
        match self {
            Self::Observed(row) => row.cumulative_hazard,
            Self::NoData => 0.0,
        }
    }

    /// `(survival, hazard, cumulative_hazard)`
    pub fn triple(&self) -> (f64, f64, f64) {
        (self.survival(), self.hazard(), self.cumulative_hazard())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KaplanMeierTable {
    rows: Vec<KmRow>,
}

impl KaplanMeierTable {
    pub fn fit(durations: &[i64]) -> Self {
        let mut sorted = durations.to_vec();
        sorted.sort_unstable();

        let mut rows = Vec::new();
        let mut at_risk = sorted.len();
        let mut survival = 1.0;
        let mut cumulative_hazard = 0.0;

        for group in sorted.chunk_by(|a, b| a == b) {
            let events = group.len();
            let hazard = events as f64 / at_risk as f64;
            survival *= 1.0 - hazard;
            cumulative_hazard += hazard;
            rows.push(KmRow {
                time: group[0],
                at_risk,
                events,
                survival,
                hazard,
                cumulative_hazard,
            });
            at_risk -= events;
        }
        Self { rows }
    }

    pub fn rows(&self) -> &[KmRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row whose time is closest to `t`; on a tie the earlier row wins.
    /// Never interpolates between rows.
    pub fn nearest(&self, t: i64) -> SurvivalEstimate {
        let mut best: Option<(&KmRow, u64)> = None;
        for row in &self.rows {
            let dist = row.time.abs_diff(t);
            match best {
                Some((_, d)) if d <= dist => {}
                _ => best = Some((row, dist)),
            }
        }
        match best {
            Some((row, _)) => SurvivalEstimate::Observed(*row),
            None => SurvivalEstimate::NoData,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum KaplanMeier {
    At(SurvivalEstimate),
    Table(KaplanMeierTable),
}

/// Full table when `t` is `None`, nearest-row lookup otherwise. An empty
/// sample always yields the default estimate.
pub fn kaplan_meier(durations: &[i64], t: Option<i64>) -> KaplanMeier {
    if durations.is_empty() {
        return KaplanMeier::At(SurvivalEstimate::NoData);
    }
    let table = KaplanMeierTable::fit(durations);
    match t {
        Some(t) => KaplanMeier::At(table.nearest(t)),
        None => KaplanMeier::Table(table),
    }
}
