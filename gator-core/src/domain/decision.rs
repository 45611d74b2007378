//! Per-bar decisions and the reasons attached to them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which entry rule produced a BUY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryReason {
    /// Lines were already in bullish order when tracking started.
    StartupCatchUp,
    /// Price crossed above the lines with bullish order and all gates passed.
    BullishCrossover,
    /// An "expensive" crossover whose peak wait expired without a reversal.
    DeferredCrossover,
    /// Rising lines, open mouth and two rising closes.
    ConditionCheck,
}

impl EntryReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StartupCatchUp => "startup_catch_up",
            Self::BullishCrossover => "bullish_crossover",
            Self::DeferredCrossover => "deferred_crossover",
            Self::ConditionCheck => "condition_check",
        }
    }
}

/// Which exit rule produced a SELL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    FastLineDecline,
    PriceBelowSlow,
    PriceBelowMedium,
    MouthClosing,
    FastCrossBelowMedium,
    FastCrossBelowSlow,
    TrailingStop,
    HardStop,
    AtrStop,
}

impl ExitReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FastLineDecline => "fast_line_decline",
            Self::PriceBelowSlow => "price_below_slow",
            Self::PriceBelowMedium => "price_below_medium",
            Self::MouthClosing => "mouth_closing",
            Self::FastCrossBelowMedium => "fast_cross_below_medium",
            Self::FastCrossBelowSlow => "fast_cross_below_slow",
            Self::TrailingStop => "trailing_stop",
            Self::HardStop => "hard_stop",
            Self::AtrStop => "atr_stop",
        }
    }
}

impl fmt::Display for EntryReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exactly one of these is emitted per bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Buy(EntryReason),
    Sell(ExitReason),
    Hold,
}

impl Decision {
    pub fn is_buy(&self) -> bool {
        matches!(self, Self::Buy(_))
    }

    pub fn is_sell(&self) -> bool {
        matches!(self, Self::Sell(_))
    }

    /// Short diagnostic string for the rule that fired, `None` for HOLD.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Self::Buy(r) => Some(r.as_str()),
            Self::Sell(r) => Some(r.as_str()),
            Self::Hold => None,
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            Self::Buy(_) => "BUY",
            Self::Sell(_) => "SELL",
            Self::Hold => "HOLD",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason() {
            Some(reason) => write!(f, "{}({reason})", self.action()),
            None => f.write_str(self.action()),
        }
    }
}
