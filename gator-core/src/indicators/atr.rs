//! Average True Range (ATR), streaming form.
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|)
//! ATR uses Wilder smoothing (EMA with alpha = 1/period).
//! The first bar has no previous close, so its range is skipped; the seed is the
//! mean of the next `period` true ranges. Ready after `period + 1` bars.
//!
//! The engine itself only consumes an [`AtrReading`]. Hosts with their own
//! platform ATR pass that reading in; `WilderAtr` is the reference source.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::domain::Bar;

/// Ready flag plus current value of an externally computed ATR.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtrReading {
    pub is_ready: bool,
    pub value: f64,
}

impl AtrReading {
    pub fn ready(value: f64) -> Self {
        Self {
            is_ready: true,
            value,
        }
    }

    pub fn not_ready() -> Self {
        Self {
            is_ready: false,
            value: f64::NAN,
        }
    }

    /// The value, if ready and finite.
    pub fn value(&self) -> Option<f64> {
        if self.is_ready && self.value.is_finite() {
            Some(self.value)
        } else {
            None
        }
    }
}

/// True range of `bar` given the previous close.
pub fn true_range(bar: &Bar, prev_close: f64) -> f64 {
    (bar.high - bar.low)
        .max((bar.high - prev_close).abs())
        .max((bar.low - prev_close).abs())
}

#[derive(Debug, Clone)]
pub struct WilderAtr {
    period: usize,
    prev_close: Option<f64>,
    seed_sum: f64,
    seed_count: usize,
    value: Option<f64>,
}

impl WilderAtr {
    pub fn new(period: usize) -> Result<Self, ConfigError> {
        if period < 1 {
            return Err(ConfigError::InvalidPeriod {
                name: "atr".into(),
                value: period,
            });
        }
        Ok(Self {
            period,
            prev_close: None,
            seed_sum: 0.0,
            seed_count: 0,
            value: None,
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn update(&mut self, bar: &Bar) -> AtrReading {
        if let Some(pc) = self.prev_close {
            let tr = true_range(bar, pc);
            match self.value {
                Some(prev) => {
                    let alpha = 1.0 / self.period as f64;
                    self.value = Some(alpha * tr + (1.0 - alpha) * prev);
                }
                None => {
                    self.seed_sum += tr;
                    self.seed_count += 1;
                    if self.seed_count == self.period {
                        self.value = Some(self.seed_sum / self.period as f64);
                    }
                }
            }
        }
        self.prev_close = Some(bar.close);
        self.reading()
    }

    pub fn reading(&self) -> AtrReading {
        match self.value {
            Some(v) => AtrReading::ready(v),
            None => AtrReading::not_ready(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.value.is_some()
    }
}
