//! Named presets: common strategy variants as ready-made configurations.

use std::fmt;
use std::str::FromStr;

use super::{ConfigError, EngineConfig, ExitConfig};
use crate::components::{
    CatchUpMode, EntryConfig, ExitRule, GapReference, LinesConfig, PeakFilterConfig,
    TrendDetector, VolatilityConfig,
};
use crate::indicators::LineSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyPreset {
    /// Shifted 13/8, 8/5, 5/3 lines with line-cross exits.
    ShiftedAlligator,
    /// Unshifted 20/12/8 lines, z-score peak filter, tight percent stops.
    PeakFiltered,
    /// Unshifted 13/8/5 lines with an ATR stop from the running high.
    AtrStop,
    /// `PeakFiltered` gated by Hurst persistence instead of EMA slope.
    HurstGated,
}

fn unshifted(fast: usize, medium: usize, slow: usize) -> LinesConfig {
    LinesConfig {
        fast: LineSpec::new(fast, 0),
        medium: LineSpec::new(medium, 0),
        slow: LineSpec::new(slow, 0),
    }
}

impl StrategyPreset {
    pub fn to_config(self) -> EngineConfig {
        match self {
            Self::ShiftedAlligator => EngineConfig {
                lines: LinesConfig::default(),
                trend: TrendDetector::default(),
                entry: EntryConfig::default(),
                peak_filter: PeakFilterConfig::default(),
                volatility: VolatilityConfig::default(),
                exit: ExitConfig::default(),
            },
            Self::PeakFiltered => EngineConfig {
                lines: unshifted(8, 12, 20),
                trend: TrendDetector::default(),
                entry: EntryConfig {
                    catch_up: CatchUpMode::AlwaysArmed,
                    min_separation_atr: 0.0,
                    max_gap_pct: Some(6.0),
                    gap_reference: GapReference::Fast,
                    condition_check: None,
                },
                peak_filter: PeakFilterConfig {
                    enabled: true,
                    lookback: 20,
                    k: 1.5,
                    max_peak_days: 2,
                    arm_after_exit: true,
                },
                volatility: VolatilityConfig::default(),
                exit: ExitConfig {
                    cooldown_bars: 3,
                    rules: vec![
                        ExitRule::TrailingStop { pct: 0.003 },
                        ExitRule::HardStop { pct: 0.003 },
                    ],
                },
            },
            Self::AtrStop => EngineConfig {
                lines: unshifted(5, 8, 13),
                trend: TrendDetector::default(),
                entry: EntryConfig::default(),
                peak_filter: PeakFilterConfig::default(),
                volatility: VolatilityConfig::default(),
                exit: ExitConfig {
                    cooldown_bars: 1,
                    rules: vec![
                        ExitRule::AtrStop { multiplier: 0.2 },
                        ExitRule::MouthClosing,
                        ExitRule::PriceBelowSlow,
                    ],
                },
            },
            Self::HurstGated => {
                let mut config = Self::PeakFiltered.to_config();
                config.trend = TrendDetector::Hurst {
                    window: 40,
                    threshold: 0.5,
                    max_lag: None,
                };
                config.entry.max_gap_pct = Some(30.0);
                config
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ShiftedAlligator => "shifted_alligator",
            Self::PeakFiltered => "peak_filtered",
            Self::AtrStop => "atr_stop",
            Self::HurstGated => "hurst_gated",
        }
    }

    /// All presets as a slice.
    pub fn all() -> &'static [StrategyPreset] {
        &[
            Self::ShiftedAlligator,
            Self::PeakFiltered,
            Self::AtrStop,
            Self::HurstGated,
        ]
    }
}

impl fmt::Display for StrategyPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyPreset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::all()
            .iter()
            .copied()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownPreset(s.to_string()))
    }
}
