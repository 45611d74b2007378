//! The three comparison lines (fast / medium / slow) and their ordering tests.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::indicators::{LaggedSmoother, LineSpec};

/// Period/shift pairs for the three lines. Periods must be strictly increasing
/// from fast to slow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinesConfig {
    pub fast: LineSpec,
    pub medium: LineSpec,
    pub slow: LineSpec,
}

impl Default for LinesConfig {
    fn default() -> Self {
        Self {
            fast: LineSpec::new(5, 3),
            medium: LineSpec::new(8, 5),
            slow: LineSpec::new(13, 8),
        }
    }
}

impl LinesConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, spec) in [
            ("lines.fast", self.fast),
            ("lines.medium", self.medium),
            ("lines.slow", self.slow),
        ] {
            if spec.period < 1 {
                return Err(ConfigError::InvalidPeriod {
                    name: name.into(),
                    value: spec.period,
                });
            }
        }
        if !(self.fast.period < self.medium.period && self.medium.period < self.slow.period) {
            return Err(ConfigError::PeriodOrder {
                fast: self.fast.period,
                medium: self.medium.period,
                slow: self.slow.period,
            });
        }
        Ok(())
    }
}

/// Shifted values of all three lines on one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSnapshot {
    pub fast: f64,
    pub medium: f64,
    pub slow: f64,
}

impl LineSnapshot {
    pub fn new(fast: f64, medium: f64, slow: f64) -> Self {
        Self { fast, medium, slow }
    }

    /// fast > medium > slow ("open mouth").
    pub fn is_bullish(&self) -> bool {
        self.fast > self.medium && self.medium > self.slow
    }

    /// fast < medium < slow ("on the back").
    pub fn is_bearish(&self) -> bool {
        self.fast < self.medium && self.medium < self.slow
    }

    pub fn price_above_fast(&self, price: f64) -> bool {
        price > self.fast
    }

    pub fn price_below_all(&self, price: f64) -> bool {
        price < self.fast && price < self.medium && price < self.slow
    }

    /// Signed distance fast − medium.
    pub fn fast_medium_gap(&self) -> f64 {
        self.fast - self.medium
    }

    /// Every line strictly above its value in `previous`.
    pub fn rising_from(&self, previous: &LineSnapshot) -> bool {
        self.fast > previous.fast && self.medium > previous.medium && self.slow > previous.slow
    }

    /// Every pairwise distance wider than `threshold_pct` of the slow line.
    pub fn mouth_open(&self, threshold_pct: f64) -> bool {
        let min = self.slow * threshold_pct;
        (self.slow - self.medium).abs() > min
            && (self.slow - self.fast).abs() > min
            && (self.medium - self.fast).abs() > min
    }
}

/// Per-line shifted outputs of one update. Lines warm up independently.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineOutputs {
    pub fast: Option<f64>,
    pub medium: Option<f64>,
    pub slow: Option<f64>,
}

impl LineOutputs {
    /// All three lines, once every one of them is emitting.
    pub fn snapshot(&self) -> Option<LineSnapshot> {
        Some(LineSnapshot::new(self.fast?, self.medium?, self.slow?))
    }
}

/// Three lagged smoothers fed from the same price series.
#[derive(Debug, Clone)]
pub struct LineTriple {
    fast: LaggedSmoother,
    medium: LaggedSmoother,
    slow: LaggedSmoother,
}

impl LineTriple {
    pub fn new(config: &LinesConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            fast: LaggedSmoother::from_spec(config.fast)?,
            medium: LaggedSmoother::from_spec(config.medium)?,
            slow: LaggedSmoother::from_spec(config.slow)?,
        })
    }

    pub fn update(&mut self, price: f64) -> LineOutputs {
        LineOutputs {
            fast: self.fast.update(price).shifted,
            medium: self.medium.update(price).shifted,
            slow: self.slow.update(price).shifted,
        }
    }

    pub fn snapshot(&self) -> Option<LineSnapshot> {
        if !self.is_ready() {
            return None;
        }
        Some(LineSnapshot::new(
            self.fast.shifted()?,
            self.medium.shifted()?,
            self.slow.shifted()?,
        ))
    }

    pub fn is_ready(&self) -> bool {
        self.fast.is_ready() && self.medium.is_ready() && self.slow.is_ready()
    }

    /// Updates needed before all three lines emit.
    pub fn warmup_updates(&self) -> usize {
        self.fast
            .warmup_updates()
            .max(self.medium.warmup_updates())
            .max(self.slow.warmup_updates())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_lines_validate() {
        assert!(LinesConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_unordered_periods() {
        let config = LinesConfig {
            fast: LineSpec::new(8, 0),
            medium: LineSpec::new(8, 0),
            slow: LineSpec::new(13, 0),
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PeriodOrder { .. })
        ));
    }

    #[test]
    fn rejects_zero_period() {
        let config = LinesConfig {
            fast: LineSpec::new(0, 0),
            ..LinesConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPeriod { .. })
        ));
    }

    #[test]
    fn ordering_predicates() {
        let bull = LineSnapshot::new(12.0, 11.0, 10.0);
        assert!(bull.is_bullish());
        assert!(!bull.is_bearish());
        let bear = LineSnapshot::new(10.0, 11.0, 12.0);
        assert!(bear.is_bearish());
        assert!(bear.price_below_all(9.5));
        assert!(!bear.price_below_all(10.5));
        let tangled = LineSnapshot::new(11.0, 10.0, 12.0);
        assert!(!tangled.is_bullish());
        assert!(!tangled.is_bearish());
    }

    #[test]
    fn rising_and_mouth_width() {
        let prev = LineSnapshot::new(11.0, 10.5, 10.0);
        let now = LineSnapshot::new(12.0, 11.0, 10.2);
        assert!(now.rising_from(&prev));
        assert!(!prev.rising_from(&now));
        let flat_slow = LineSnapshot::new(12.0, 11.0, 10.0);
        assert!(!flat_slow.rising_from(&prev));

        // slow 100, 2% threshold = 2.0: gaps 3 / 6 / 3 are open, a 1.5 gap is not
        assert!(LineSnapshot::new(106.0, 103.0, 100.0).mouth_open(0.02));
        assert!(!LineSnapshot::new(104.5, 103.0, 100.0).mouth_open(0.02));
    }

    #[test]
    fn triple_ready_after_slowest_warmup() {
        let mut lines = LineTriple::new(&LinesConfig::default()).unwrap();
        // slow: 13 + 8 + 1 = 22 updates
        assert_eq!(lines.warmup_updates(), 22);
        for i in 0..21 {
            lines.update(100.0 + i as f64);
        }
        assert!(lines.snapshot().is_none());
        let out = lines.update(200.0);
        assert!(out.snapshot().is_some());
        assert_eq!(out.snapshot(), lines.snapshot());
    }

    #[test]
    fn fast_line_emits_before_slow() {
        let mut lines = LineTriple::new(&LinesConfig::default()).unwrap();
        let mut first_fast = None;
        for i in 0..22 {
            let out = lines.update(100.0);
            if out.fast.is_some() && first_fast.is_none() {
                first_fast = Some(i + 1);
            }
        }
        // fast: 5 + 3 + 1 = 9 updates
        assert_eq!(first_fast, Some(9));
    }
}
