pub mod events;
pub mod kaplan_meier;
pub mod mrl;

pub use events::{
    compute_interarrival_days, compute_running_days, event_timestamps, extract_events,
    interarrival_days, EventSummary, Threshold,
};
pub use kaplan_meier::{kaplan_meier, KaplanMeier, KaplanMeierTable, KmRow, SurvivalEstimate};
pub use mrl::{
    mean_residual_life, mean_residual_life_at, mean_residual_life_curve, MeanResidualLife,
    MrlCurve, ResidualLife,
};
