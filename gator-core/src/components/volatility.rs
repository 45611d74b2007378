//! Volatility stop: turns an external ATR reading into stop bands and
//! ATR-relative stop levels.
//!
//! bands: close ± band_multiplier × ATR
//! stop below a reference: reference − multiplier × ATR
//!
//! A reading that is not ready (or not finite, or negative) yields nothing. A
//! ready zero still counts as a reading, but gives no bands and no stop.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::indicators::AtrReading;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolatilityConfig {
    pub band_multiplier: f64,
}

impl Default for VolatilityConfig {
    fn default() -> Self {
        Self {
            band_multiplier: 2.0,
        }
    }
}

impl VolatilityConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.band_multiplier > 0.0 && self.band_multiplier.is_finite() {
            Ok(())
        } else {
            Err(ConfigError::NonPositive {
                name: "volatility.band_multiplier".into(),
                value: self.band_multiplier,
            })
        }
    }
}

/// Charting bands around the close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StopBands {
    pub upper: f64,
    pub lower: f64,
}

#[derive(Debug, Clone)]
pub struct VolatilityStop {
    band_multiplier: f64,
    reading: AtrReading,
}

impl VolatilityStop {
    pub fn new(config: VolatilityConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            band_multiplier: config.band_multiplier,
            reading: AtrReading::not_ready(),
        })
    }

    pub fn update(&mut self, reading: AtrReading) {
        self.reading = reading;
    }

    /// Usable ATR value, if any. Zero is usable.
    pub fn atr(&self) -> Option<f64> {
        self.reading.value().filter(|v| v.is_finite() && *v >= 0.0)
    }

    pub fn bands(&self, close: f64) -> Option<StopBands> {
        let width = self.stop_distance(self.band_multiplier)?;
        Some(StopBands {
            upper: close + width,
            lower: close - width,
        })
    }

    /// `multiplier × ATR`, only for a strictly positive ATR.
    pub fn stop_distance(&self, multiplier: f64) -> Option<f64> {
        self.atr().filter(|atr| *atr > 0.0).map(|atr| atr * multiplier)
    }

    pub fn stop_below(&self, reference: f64, multiplier: f64) -> Option<f64> {
        self.stop_distance(multiplier).map(|d| reference - d)
    }
}
