//! Mean residual life over an empirical duration sample.
//!
//! `MRL(t) = mean(D - t | D >= t)`. Past the longest observed duration there
//! is no data and the estimate is reported as [`ResidualLife::BeyondHorizon`],
//! which reads as `0.0`.

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ResidualLife {
    Observed { mean: f64, eligible: usize },
    BeyondHorizon,
}

impl ResidualLife {
    pub fn value(&self) -> f64 {
        match self {
            Self::Observed { mean, .. } => *mean,
            Self::BeyondHorizon => 0.0,
        }
    }
}

/// Ordered mapping from each distinct duration to its mean residual life.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MrlCurve {
    points: BTreeMap<i64, f64>,
}

impl MrlCurve {
    pub fn get(&self, t: i64) -> Option<f64> {
        self.points.get(&t).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.points.iter().map(|(t, m)| (*t, *m))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MeanResidualLife {
    At(ResidualLife),
    Curve(MrlCurve),
}

/// Point estimate when `t` is given, full curve otherwise.
pub fn mean_residual_life(durations: &[i64], t: Option<i64>) -> MeanResidualLife {
    match t {
        Some(t) => MeanResidualLife::At(mean_residual_life_at(durations, t)),
        None => MeanResidualLife::Curve(mean_residual_life_curve(durations)),
    }
}

pub fn mean_residual_life_at(durations: &[i64], t: i64) -> ResidualLife {
    let (sum, eligible) = durations
        .iter()
        .filter(|d| **d >= t)
        .fold((0i128, 0usize), |(sum, n), d| {
            (sum + (i128::from(*d) - i128::from(t)), n + 1)
        });
    if eligible == 0 {
        return ResidualLife::BeyondHorizon;
    }
    ResidualLife::Observed {
        mean: sum as f64 / eligible as f64,
        eligible,
    }
}

/// One point per distinct duration, computed from suffix sums of the sorted
/// sample.
pub fn mean_residual_life_curve(durations: &[i64]) -> MrlCurve {
    let mut sorted = durations.to_vec();
    sorted.sort_unstable();

    let n = sorted.len();
    // Wide accumulator: sums and t * eligible can exceed i64 for extreme durations.
    let mut suffix = vec![0i128; n + 1];
    for i in (0..n).rev() {
        suffix[i] = suffix[i + 1] + i128::from(sorted[i]);
    }

    let mut points = BTreeMap::new();
    let mut i = 0;
    while i < n {
        let t = sorted[i];
        let eligible = (n - i) as i128;
        let excess = suffix[i] - i128::from(t) * eligible;
        points.insert(t, excess as f64 / eligible as f64);
        while i < n && sorted[i] == t {
            i += 1;
        }
    }
    MrlCurve { points }
}
