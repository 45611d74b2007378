//! Lagged smoother: Wilder-style recursive average emitted with a forward shift.
//!
//! Recursive: acc[t] = (acc[t-1] * (period - 1) + price[t]) / period
//! Seed: acc[0] = price[0] (no averaging window).
//! Shift: the emitted value is the accumulator from `shift` updates ago.
//!
//! The accumulator only starts feeding the shift buffer once it has absorbed
//! `period` updates, so the first emitted value is already a full-period
//! average. Readiness therefore lands on update `period + shift + 1`.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::config::ConfigError;

/// Construction parameters for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSpec {
    pub period: usize,
    #[serde(default)]
    pub shift: usize,
}

impl LineSpec {
    pub const fn new(period: usize, shift: usize) -> Self {
        Self { period, shift }
    }
}

/// Output of one smoother update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmootherOutput {
    /// Accumulator value from `shift` updates ago, once the buffer is full.
    pub shifted: Option<f64>,
    /// Unshifted accumulator before this update.
    pub previous: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct LaggedSmoother {
    period: usize,
    shift: usize,
    accumulator: Option<f64>,
    updates: usize,
    buffer: VecDeque<f64>,
}

impl LaggedSmoother {
    pub fn new(period: usize, shift: usize) -> Result<Self, ConfigError> {
        if period < 1 {
            return Err(ConfigError::InvalidPeriod {
                name: "smoother".into(),
                value: period,
            });
        }
        Ok(Self {
            period,
            shift,
            accumulator: None,
            updates: 0,
            buffer: VecDeque::with_capacity(shift + 1),
        })
    }

    pub fn from_spec(spec: LineSpec) -> Result<Self, ConfigError> {
        Self::new(spec.period, spec.shift)
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn shift(&self) -> usize {
        self.shift
    }

    /// Number of updates needed before `is_ready` turns true.
    pub fn warmup_updates(&self) -> usize {
        self.period + self.shift + 1
    }

    pub fn update(&mut self, price: f64) -> SmootherOutput {
        let previous = self.accumulator;
        let period = self.period as f64;
        let acc = match previous {
            None => price,
            Some(prev) => (prev * (period - 1.0) + price) / period,
        };
        self.accumulator = Some(acc);

        // The update that completes the first full period only seeds the
        // accumulator; buffering starts with the next one.
        if self.updates >= self.period {
            if self.buffer.len() == self.shift + 1 {
                self.buffer.pop_front();
            }
            self.buffer.push_back(acc);
        }
        self.updates += 1;

        SmootherOutput {
            shifted: self.shifted(),
            previous,
        }
    }

    /// Current shifted value, `None` until the shift buffer is full.
    pub fn shifted(&self) -> Option<f64> {
        if self.buffer.len() == self.shift + 1 {
            self.buffer.front().copied()
        } else {
            None
        }
    }

    /// Most recent unshifted accumulator.
    pub fn current(&self) -> Option<f64> {
        self.accumulator
    }

    pub fn updates(&self) -> usize {
        self.updates
    }

    pub fn is_ready(&self) -> bool {
        self.updates >= self.period && self.buffer.len() == self.shift + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn rejects_zero_period() {
        assert!(matches!(
            LaggedSmoother::new(0, 2),
            Err(ConfigError::InvalidPeriod { value: 0, .. })
        ));
    }

    #[test]
    fn first_update_seeds_accumulator() {
        let mut s = LaggedSmoother::new(5, 0).unwrap();
        let out = s.update(42.0);
        assert_eq!(out.previous, None);
        assert_eq!(s.current(), Some(42.0));
    }

    #[test]
    fn recursion_matches_wilder_formula() {
        // period 3: acc = (acc*2 + p) / 3
        let mut s = LaggedSmoother::new(3, 0).unwrap();
        s.update(10.0);
        s.update(13.0); // (10*2 + 13)/3 = 11
        assert_approx(s.current().unwrap(), 11.0, DEFAULT_EPSILON);
        let out = s.update(17.0); // (11*2 + 17)/3 = 13
        assert_approx(s.current().unwrap(), 13.0, DEFAULT_EPSILON);
        assert_approx(out.previous.unwrap(), 11.0, DEFAULT_EPSILON);
    }

    #[test]
    fn shift_delays_emitted_value() {
        let mut s = LaggedSmoother::new(1, 2).unwrap();
        // period 1: acc == price. First update only seeds.
        assert_eq!(s.update(1.0).shifted, None);
        assert_eq!(s.update(2.0).shifted, None);
        assert_eq!(s.update(3.0).shifted, None);
        // Buffer holds [2, 3, 4] → emits the value from 2 updates ago.
        assert_eq!(s.update(4.0).shifted, Some(2.0));
        assert_eq!(s.update(5.0).shifted, Some(3.0));
    }

    #[test]
    fn readiness_boundary() {
        let mut s = LaggedSmoother::new(5, 3).unwrap();
        for i in 0..8 {
            s.update(100.0 + i as f64);
            assert!(!s.is_ready(), "ready too early at update {}", i + 1);
        }
        s.update(200.0);
        assert!(s.is_ready());
        assert_eq!(s.updates(), s.warmup_updates());
    }

    #[test]
    fn line_spec_shift_defaults_to_zero() {
        let spec: LineSpec = serde_json::from_str(r#"{"period": 8}"#).unwrap();
        assert_eq!(spec, LineSpec::new(8, 0));
    }
}
