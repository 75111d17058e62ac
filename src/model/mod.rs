pub mod bar;
pub mod series;

pub use bar::PriceBar;
pub use series::{ReturnKind, ReturnObservation, ReturnSeries};
