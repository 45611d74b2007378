//! Trend gate: decides whether the recent history is in a persistent up-trend.
//!
//! - `Slope`: short/long EMA over the last `long` values of three series
//!   (typical price, fast line, medium line). Each must have its short EMA
//!   above its long EMA and a short-EMA rise above `slope_threshold`.
//! - `Hurst`: Hurst exponent of the last `window` typical prices above
//!   `threshold`.
//! - `Disabled`: always trending.
//!
//! Insufficient history reads as "not trending", never as an error.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::indicators::hurst::MIN_HURST_LEN;
use crate::indicators::{ema_seeded, hurst_exponent, RollingWindow};

fn default_short() -> usize {
    5
}

fn default_long() -> usize {
    20
}

fn default_slope_threshold() -> f64 {
    0.01
}

fn default_hurst_window() -> usize {
    40
}

fn default_hurst_threshold() -> f64 {
    0.5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TrendDetector {
    Slope {
        #[serde(default = "default_short")]
        short: usize,
        #[serde(default = "default_long")]
        long: usize,
        #[serde(default = "default_slope_threshold")]
        slope_threshold: f64,
    },
    Hurst {
        #[serde(default = "default_hurst_window")]
        window: usize,
        #[serde(default = "default_hurst_threshold")]
        threshold: f64,
        #[serde(default)]
        max_lag: Option<usize>,
    },
    Disabled,
}

impl Default for TrendDetector {
    fn default() -> Self {
        TrendDetector::Slope {
            short: default_short(),
            long: default_long(),
            slope_threshold: default_slope_threshold(),
        }
    }
}

/// Bounded histories the detector reads from.
#[derive(Debug, Clone, Copy)]
pub struct TrendInputs<'a> {
    pub typical: &'a RollingWindow,
    pub fast: &'a RollingWindow,
    pub medium: &'a RollingWindow,
}

/// Result of one trend evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendReading {
    pub trending: bool,
    /// Hurst exponent, when the persistence test ran.
    pub hurst: Option<f64>,
}

impl TrendReading {
    fn flag(trending: bool) -> Self {
        Self {
            trending,
            hurst: None,
        }
    }
}

impl TrendDetector {
    pub fn name(&self) -> &'static str {
        match self {
            TrendDetector::Slope { .. } => "slope",
            TrendDetector::Hurst { .. } => "hurst",
            TrendDetector::Disabled => "disabled",
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            TrendDetector::Slope {
                short,
                long,
                slope_threshold,
            } => {
                if short < 1 {
                    return Err(ConfigError::InvalidPeriod {
                        name: "trend.short".into(),
                        value: short,
                    });
                }
                if short >= long {
                    return Err(ConfigError::InvalidWindow {
                        name: "trend.long".into(),
                        value: long,
                        reason: format!("must be greater than short ({short})"),
                    });
                }
                positive("trend.slope_threshold", slope_threshold)
            }
            TrendDetector::Hurst {
                window,
                threshold,
                max_lag,
            } => {
                if window < MIN_HURST_LEN {
                    return Err(ConfigError::InvalidWindow {
                        name: "trend.window".into(),
                        value: window,
                        reason: format!("must be at least {MIN_HURST_LEN}"),
                    });
                }
                if let Some(lag) = max_lag {
                    if lag < 3 {
                        return Err(ConfigError::InvalidWindow {
                            name: "trend.max_lag".into(),
                            value: lag,
                            reason: "must be at least 3".into(),
                        });
                    }
                }
                positive("trend.threshold", threshold)
            }
            TrendDetector::Disabled => Ok(()),
        }
    }

    /// History length each input window must hold.
    pub fn history_len(&self) -> usize {
        match *self {
            TrendDetector::Slope { long, .. } => long,
            TrendDetector::Hurst { window, .. } => window,
            TrendDetector::Disabled => 1,
        }
    }

    pub fn evaluate(&self, inputs: TrendInputs<'_>) -> TrendReading {
        match *self {
            TrendDetector::Slope {
                short,
                long,
                slope_threshold,
            } => {
                let trending = [inputs.typical, inputs.fast, inputs.medium]
                    .into_iter()
                    .all(|w| match w.tail(long) {
                        Some(series) => slope_trending(&series, short, long, slope_threshold),
                        None => false,
                    });
                TrendReading::flag(trending)
            }
            TrendDetector::Hurst {
                window,
                threshold,
                max_lag,
            } => match inputs.typical.tail(window) {
                Some(series) => {
                    let h = hurst_exponent(&series, max_lag);
                    TrendReading {
                        trending: h > threshold,
                        hurst: Some(h),
                    }
                }
                None => TrendReading::flag(false),
            },
            TrendDetector::Disabled => TrendReading::flag(true),
        }
    }
}

/// Slope test over one series of at least `long` values.
pub fn slope_trending(series: &[f64], short: usize, long: usize, threshold: f64) -> bool {
    if series.len() < long || series.is_empty() {
        return false;
    }
    let window = &series[series.len() - long..];
    let fast = ema_seeded(window, short);
    let slow = ema_seeded(window, long);
    let (Some(&first), Some(&last), Some(&slow_last)) = (fast.first(), fast.last(), slow.last())
    else {
        return false;
    };
    if first == 0.0 {
        return false;
    }
    last > slow_last && (last - first) / first > threshold
}

fn positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive {
            name: name.into(),
            value,
        })
    }
}
