//! Engine configuration: every period, gate and exit rule of one engine.
//!
//! Loaded from TOML, validated up front, and hashed for run identification.
//! Every section has defaults, so a partial file only overrides what it names.

mod preset;

pub use preset::StrategyPreset;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::components::{
    EntryConfig, ExitRule, LinesConfig, PeakFilterConfig, TrendDetector, VolatilityConfig,
};

// ─── Error type ──────────────────────────────────────────────────────

/// Errors raised while building or loading a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name}: period must be >= 1, got {value}")]
    InvalidPeriod { name: String, value: usize },
    #[error("line periods must satisfy fast < medium < slow, got {fast} / {medium} / {slow}")]
    PeriodOrder {
        fast: usize,
        medium: usize,
        slow: usize,
    },
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: String, value: f64 },
    #[error("{name} out of range ({expected}), got {value}")]
    OutOfRange {
        name: String,
        value: f64,
        expected: String,
    },
    #[error("{name} = {value}: {reason}")]
    InvalidWindow {
        name: String,
        value: usize,
        reason: String,
    },
    #[error("exit rule list is empty")]
    EmptyExitRules,
    #[error("exit rule listed twice: {0}")]
    DuplicateExitRule(String),
    #[error("unknown preset: {0}")]
    UnknownPreset(String),
    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("cannot serialize config to TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("cannot serialize config to JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ─── Sections ────────────────────────────────────────────────────────

/// Exit section: cooldown length and the ordered rule list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitConfig {
    /// Bars after a BUY or SELL during which the opposite side is suppressed.
    pub cooldown_bars: usize,
    /// Priority order; the first rule that triggers wins.
    pub rules: Vec<ExitRule>,
}

impl Default for ExitConfig {
    fn default() -> Self {
        Self {
            cooldown_bars: 0,
            rules: vec![
                ExitRule::FastLineDecline { bars: 2 },
                ExitRule::PriceBelowSlow,
                ExitRule::PriceBelowMedium,
                ExitRule::MouthClosing,
            ],
        }
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub lines: LinesConfig,
    pub trend: TrendDetector,
    pub entry: EntryConfig,
    pub peak_filter: PeakFilterConfig,
    pub volatility: VolatilityConfig,
    pub exit: ExitConfig,
}

impl EngineConfig {
    /// Check every section. Called by the engine constructor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.lines.validate()?;
        self.trend.validate()?;
        self.entry.validate()?;
        self.peak_filter.validate()?;
        self.volatility.validate()?;
        crate::components::exit::validate_rules(&self.exit.rules)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Content hash of the canonical JSON form (blake3, hex).
    ///
    /// Two configs with identical fields always share a hash.
    pub fn config_hash(&self) -> Result<String, ConfigError> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
