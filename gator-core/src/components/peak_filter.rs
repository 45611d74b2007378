//! Peak confirmation filter: a z-score gate that defers "expensive" entries.
//!
//! z = (x - mean(window)) / std(window), population std over the last
//! `lookback` reference prices.
//!
//! - z < -k: cheap, pass and drop any wait.
//! - z > +k while idle: start waiting with `x` as the reference, block.
//! - waiting: count the bar. A value under the reference confirms a reversal
//!   (block, stop waiting). Reaching `max_peak_days` without one means the
//!   move is a trend, not a peak (pass, stop waiting). Otherwise keep blocking.
//! - otherwise: pass.
//!
//! A window that is not yet full blocks. A flat window (std = 0) passes.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ConfigError;
use crate::indicators::RollingWindow;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakFilterConfig {
    pub enabled: bool,
    pub lookback: usize,
    pub k: f64,
    pub max_peak_days: usize,
    /// Start waiting (without a reference) right after every exit.
    pub arm_after_exit: bool,
}

impl Default for PeakFilterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            lookback: 20,
            k: 1.5,
            max_peak_days: 2,
            arm_after_exit: false,
        }
    }
}

impl PeakFilterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookback < 2 {
            return Err(ConfigError::InvalidWindow {
                name: "peak_filter.lookback".into(),
                value: self.lookback,
                reason: "must be at least 2".into(),
            });
        }
        if !(self.k > 0.0 && self.k.is_finite()) {
            return Err(ConfigError::NonPositive {
                name: "peak_filter.k".into(),
                value: self.k,
            });
        }
        if self.max_peak_days < 1 {
            return Err(ConfigError::InvalidPeriod {
                name: "peak_filter.max_peak_days".into(),
                value: self.max_peak_days,
            });
        }
        Ok(())
    }
}

/// Waiting state carried between bars.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PeakState {
    pub waiting: bool,
    pub reference_price: Option<f64>,
    pub days_waited: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeakVerdict {
    /// Filter switched off.
    Disabled,
    NotReady,
    FlatWindow,
    Cheap,
    Neutral,
    StartedWaiting,
    StillWaiting,
    ReversalConfirmed,
    WaitExpired,
}

impl PeakVerdict {
    pub fn is_pass(self) -> bool {
        matches!(
            self,
            PeakVerdict::Disabled
                | PeakVerdict::FlatWindow
                | PeakVerdict::Cheap
                | PeakVerdict::Neutral
                | PeakVerdict::WaitExpired
        )
    }
}

#[derive(Debug, Clone)]
pub struct PeakConfirmationFilter {
    config: PeakFilterConfig,
    window: RollingWindow,
    state: PeakState,
    last_z: Option<f64>,
}

impl PeakConfirmationFilter {
    pub fn new(config: PeakFilterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            window: RollingWindow::new(config.lookback),
            state: PeakState::default(),
            last_z: None,
        })
    }

    pub fn config(&self) -> &PeakFilterConfig {
        &self.config
    }

    pub fn state(&self) -> PeakState {
        self.state
    }

    pub fn is_waiting(&self) -> bool {
        self.config.enabled && self.state.waiting
    }

    /// Waiting on a specific expensive signal (as opposed to a wait armed
    /// after an exit, which only advances when a new signal arrives).
    pub fn has_deferred_signal(&self) -> bool {
        self.is_waiting() && self.state.reference_price.is_some()
    }

    /// z-score from the most recent evaluation.
    pub fn last_z(&self) -> Option<f64> {
        self.last_z
    }

    /// Append the bar's reference price to the window.
    pub fn observe(&mut self, value: f64) {
        self.window.push(value);
    }

    /// z-score of `value` against the current window, `None` when the window
    /// is short or flat.
    pub fn z_score(&self, value: f64) -> Option<f64> {
        if !self.window.is_full() {
            return None;
        }
        let mean = self.window.mean()?;
        let std = self.window.std_dev()?;
        if std == 0.0 {
            return None;
        }
        Some((value - mean) / std)
    }

    pub fn evaluate(&mut self, value: f64) -> PeakVerdict {
        self.last_z = None;
        if !self.config.enabled {
            return PeakVerdict::Disabled;
        }
        if !self.window.is_full() {
            return PeakVerdict::NotReady;
        }
        let (Some(mean), Some(std)) = (self.window.mean(), self.window.std_dev()) else {
            return PeakVerdict::NotReady;
        };
        if std == 0.0 {
            return PeakVerdict::FlatWindow;
        }

        let z = (value - mean) / std;
        self.last_z = Some(z);
        let k = self.config.k;

        if z < -k {
            self.clear();
            return PeakVerdict::Cheap;
        }
        if z > k && !self.state.waiting {
            self.state = PeakState {
                waiting: true,
                reference_price: Some(value),
                days_waited: 0,
            };
            debug!(value, z, "peak filter waiting on expensive price");
            return PeakVerdict::StartedWaiting;
        }
        if self.state.waiting {
            self.state.days_waited += 1;
            if let Some(reference) = self.state.reference_price {
                if value < reference {
                    debug!(value, reference, "peak filter confirmed reversal");
                    self.clear();
                    return PeakVerdict::ReversalConfirmed;
                }
            }
            if self.state.days_waited >= self.config.max_peak_days {
                debug!(days = self.state.days_waited, "peak filter wait expired");
                self.clear();
                return PeakVerdict::WaitExpired;
            }
            return PeakVerdict::StillWaiting;
        }
        PeakVerdict::Neutral
    }

    /// Drop any waiting state.
    pub fn clear(&mut self) {
        self.state = PeakState::default();
    }

    /// Start waiting with no reference price; the wait can then only expire.
    pub fn arm_without_reference(&mut self) {
        self.state = PeakState {
            waiting: true,
            reference_price: None,
            days_waited: 0,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(lookback: usize, k: f64, max_peak_days: usize) -> PeakConfirmationFilter {
        PeakConfirmationFilter::new(PeakFilterConfig {
            enabled: true,
            lookback,
            k,
            max_peak_days,
            arm_after_exit: false,
        })
        .unwrap()
    }

    fn seeded(values: &[f64]) -> PeakConfirmationFilter {
        let mut f = filter(values.len(), 1.5, 2);
        for &v in values {
            f.observe(v);
        }
        f
    }

    // 1..=10: mean 5.5, population std ≈ 2.872
    const SEED: [f64; 10] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];

    #[test]
    fn disabled_passes() {
        let mut f = PeakConfirmationFilter::new(PeakFilterConfig::default()).unwrap();
        assert_eq!(f.evaluate(1_000.0), PeakVerdict::Disabled);
        assert!(PeakVerdict::Disabled.is_pass());
    }

    #[test]
    fn short_window_blocks() {
        let mut f = filter(5, 1.5, 2);
        f.observe(1.0);
        f.observe(2.0);
        assert_eq!(f.evaluate(1.5), PeakVerdict::NotReady);
        assert!(!PeakVerdict::NotReady.is_pass());
    }

    #[test]
    fn flat_window_passes() {
        let mut f = seeded(&[50.0; 10]);
        assert_eq!(f.evaluate(80.0), PeakVerdict::FlatWindow);
        assert!(f.z_score(80.0).is_none());
    }

    #[test]
    fn cheap_passes_and_clears_wait() {
        let mut f = seeded(&SEED);
        assert_eq!(f.evaluate(12.0), PeakVerdict::StartedWaiting);
        assert!(f.is_waiting());
        assert!(f.has_deferred_signal());
        assert_eq!(f.evaluate(0.0), PeakVerdict::Cheap);
        assert!(!f.is_waiting());
    }

    #[test]
    fn neutral_passes() {
        let mut f = seeded(&SEED);
        assert_eq!(f.evaluate(6.0), PeakVerdict::Neutral);
        let z = f.last_z().unwrap();
        assert!(z.abs() < 1.5);
    }

    #[test]
    fn reversal_blocks() {
        let mut f = seeded(&SEED);
        assert_eq!(f.evaluate(12.0), PeakVerdict::StartedWaiting);
        assert_eq!(f.evaluate(11.0), PeakVerdict::ReversalConfirmed);
        assert!(!f.is_waiting());
    }

    #[test]
    fn sustained_expensive_expires_into_pass() {
        let mut f = seeded(&SEED);
        assert_eq!(f.evaluate(12.0), PeakVerdict::StartedWaiting);
        assert_eq!(f.evaluate(12.5), PeakVerdict::StillWaiting);
        assert_eq!(f.state().days_waited, 1);
        assert_eq!(f.evaluate(13.0), PeakVerdict::WaitExpired);
        assert!(!f.is_waiting());
    }

    #[test]
    fn armed_without_reference_only_expires() {
        let mut f = seeded(&SEED);
        f.arm_without_reference();
        assert!(f.is_waiting());
        assert!(!f.has_deferred_signal());
        // a lower value cannot confirm a reversal without a reference
        assert_eq!(f.evaluate(5.0), PeakVerdict::StillWaiting);
        assert_eq!(f.evaluate(4.0), PeakVerdict::WaitExpired);
    }

    #[test]
    fn validate_rejects_bad_config() {
        let bad = PeakFilterConfig {
            lookback: 1,
            ..PeakFilterConfig::default()
        };
        assert!(bad.validate().is_err());
        let bad = PeakFilterConfig {
            k: -1.0,
            ..PeakFilterConfig::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(ConfigError::NonPositive { .. })
        ));
        let bad = PeakFilterConfig {
            max_peak_days: 0,
            ..PeakFilterConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
