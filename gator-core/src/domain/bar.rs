//! Bar: the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLC bar for one trading day of the tracked instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Rejections raised while validating an incoming bar stream.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarError {
    #[error("bar {date} failed the OHLC sanity check")]
    Insane { date: NaiveDate },
    #[error("bar {date} is not after the previous bar {previous}")]
    OutOfOrder { date: NaiveDate, previous: NaiveDate },
}

impl Bar {
    /// Midpoint of the bar's range, `(high + low) / 2`.
    ///
    /// This is the series the smoothers, trend windows and z-score filter consume.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// Returns true if any OHLC field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic OHLC sanity check: high >= low, high >= open, high >= close, etc.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }
}

/// Check that a bar sequence is sane and strictly increasing in date.
///
/// The engine assumes this contract holds; hosts call this at the boundary.
pub fn validate_sequence(bars: &[Bar]) -> Result<(), BarError> {
    let mut previous: Option<NaiveDate> = None;
    for bar in bars {
        if !bar.is_sane() {
            return Err(BarError::Insane { date: bar.date });
        }
        if let Some(prev) = previous {
            if bar.date <= prev {
                return Err(BarError::OutOfOrder {
                    date: bar.date,
                    previous: prev,
                });
            }
        }
        previous = Some(bar.date);
    }
    Ok(())
}
