use chrono::{DateTime, FixedOffset};

/// One OHLCV bar stamped in the exchange's local offset.
///
/// `close` is the adjusted close when the provider reports one.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub timestamp: DateTime<FixedOffset>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// Simple return from `prev` to `self`, or `None` when undefined.
    pub fn simple_return_from(&self, prev: &PriceBar) -> Option<f64> {
        if prev.close == 0.0 {
            return None;
        }
        let r = self.close / prev.close - 1.0;
        r.is_finite().then_some(r)
    }
}
