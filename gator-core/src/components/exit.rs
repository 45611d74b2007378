//! Exit evaluator: ordered list of exit rules, first match wins.
//!
//! Rules:
//! - `fast_line_decline`: fast line strictly falling over the last `bars`
//!   steps and fast − medium < ATR.
//! - `price_below_slow` / `price_below_medium`: close under that line.
//! - `mouth_closing`: fast line under the medium line.
//! - `fast_cross_below_medium`: fast was at or above medium on the previous
//!   bar and is now under it by more than `buffer` (fast × (1 + buffer) <
//!   medium).
//! - `fast_cross_below_slow`: fast was at or above slow on the previous bar
//!   and is now under it.
//! - `trailing_stop`: close <= highest × (1 − pct).
//! - `hard_stop`: close <= entry × (1 − pct).
//! - `atr_stop`: close <= highest − multiplier × ATR.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::domain::ExitReason;
use crate::indicators::RollingWindow;

use super::lines::LineSnapshot;
use super::volatility::VolatilityStop;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExitRule {
    FastLineDecline { bars: usize },
    PriceBelowSlow,
    PriceBelowMedium,
    MouthClosing,
    FastCrossBelowMedium {
        #[serde(default)]
        buffer: f64,
    },
    FastCrossBelowSlow,
    TrailingStop { pct: f64 },
    HardStop { pct: f64 },
    AtrStop { multiplier: f64 },
}

impl ExitRule {
    pub fn reason(&self) -> ExitReason {
        match self {
            ExitRule::FastLineDecline { .. } => ExitReason::FastLineDecline,
            ExitRule::PriceBelowSlow => ExitReason::PriceBelowSlow,
            ExitRule::PriceBelowMedium => ExitReason::PriceBelowMedium,
            ExitRule::MouthClosing => ExitReason::MouthClosing,
            ExitRule::FastCrossBelowMedium { .. } => ExitReason::FastCrossBelowMedium,
            ExitRule::FastCrossBelowSlow => ExitReason::FastCrossBelowSlow,
            ExitRule::TrailingStop { .. } => ExitReason::TrailingStop,
            ExitRule::HardStop { .. } => ExitReason::HardStop,
            ExitRule::AtrStop { .. } => ExitReason::AtrStop,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            ExitRule::FastLineDecline { bars } => {
                if (2..=3).contains(&bars) {
                    Ok(())
                } else {
                    Err(ConfigError::InvalidWindow {
                        name: "exit.fast_line_decline.bars".into(),
                        value: bars,
                        reason: "must be 2 or 3".into(),
                    })
                }
            }
            ExitRule::TrailingStop { pct } => fraction("exit.trailing_stop.pct", pct),
            ExitRule::HardStop { pct } => fraction("exit.hard_stop.pct", pct),
            ExitRule::AtrStop { multiplier } => {
                if multiplier > 0.0 && multiplier.is_finite() {
                    Ok(())
                } else {
                    Err(ConfigError::NonPositive {
                        name: "exit.atr_stop.multiplier".into(),
                        value: multiplier,
                    })
                }
            }
            ExitRule::FastCrossBelowMedium { buffer } => {
                if buffer >= 0.0 && buffer < 1.0 {
                    Ok(())
                } else {
                    Err(ConfigError::OutOfRange {
                        name: "exit.fast_cross_below_medium.buffer".into(),
                        value: buffer,
                        expected: "0 <= buffer < 1".into(),
                    })
                }
            }
            ExitRule::PriceBelowSlow
            | ExitRule::PriceBelowMedium
            | ExitRule::MouthClosing
            | ExitRule::FastCrossBelowSlow => Ok(()),
        }
    }

    /// Fast-line history this rule reads, in values.
    pub fn history_len(&self) -> usize {
        match *self {
            ExitRule::FastLineDecline { bars } => bars + 1,
            _ => 1,
        }
    }

    pub fn triggers(&self, ctx: &ExitContext<'_>) -> bool {
        let close = ctx.close;
        match *self {
            ExitRule::FastLineDecline { bars } => {
                let Some(history) = ctx.fast_history.tail(bars + 1) else {
                    return false;
                };
                let falling = history.windows(2).all(|w| w[0] > w[1]);
                match ctx.stop.atr() {
                    Some(atr) => falling && ctx.lines.fast_medium_gap() < atr,
                    None => false,
                }
            }
            ExitRule::PriceBelowSlow => close < ctx.lines.slow,
            ExitRule::PriceBelowMedium => close < ctx.lines.medium,
            ExitRule::MouthClosing => ctx.lines.fast < ctx.lines.medium,
            ExitRule::FastCrossBelowMedium { buffer } => match ctx.previous {
                Some(prev) => {
                    prev.fast >= prev.medium && ctx.lines.fast * (1.0 + buffer) < ctx.lines.medium
                }
                None => false,
            },
            ExitRule::FastCrossBelowSlow => match ctx.previous {
                Some(prev) => prev.fast >= prev.slow && ctx.lines.fast < ctx.lines.slow,
                None => false,
            },
            ExitRule::TrailingStop { pct } => close <= ctx.highest * (1.0 - pct),
            ExitRule::HardStop { pct } => close <= ctx.entry_price * (1.0 - pct),
            ExitRule::AtrStop { multiplier } => match ctx.stop.stop_below(ctx.highest, multiplier) {
                Some(level) => close <= level,
                None => false,
            },
        }
    }
}

fn fraction(name: &str, pct: f64) -> Result<(), ConfigError> {
    if pct > 0.0 && pct < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name: name.into(),
            value: pct,
            expected: "0 < pct < 1".into(),
        })
    }
}

/// What the rules read on one invested bar.
#[derive(Debug, Clone, Copy)]
pub struct ExitContext<'a> {
    pub close: f64,
    pub lines: LineSnapshot,
    /// Lines on the previous bar, once all three were emitting.
    pub previous: Option<LineSnapshot>,
    pub fast_history: &'a RollingWindow,
    pub stop: &'a VolatilityStop,
    pub entry_price: f64,
    pub highest: f64,
}

#[derive(Debug, Clone)]
pub struct ExitEvaluator {
    rules: Vec<ExitRule>,
}

impl ExitEvaluator {
    pub fn new(rules: Vec<ExitRule>) -> Result<Self, ConfigError> {
        validate_rules(&rules)?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[ExitRule] {
        &self.rules
    }

    /// Longest fast-line history any rule needs.
    pub fn history_len(&self) -> usize {
        self.rules.iter().map(ExitRule::history_len).max().unwrap_or(1)
    }

    pub fn evaluate(&self, ctx: &ExitContext<'_>) -> Option<ExitReason> {
        self.rules
            .iter()
            .find(|rule| rule.triggers(ctx))
            .map(ExitRule::reason)
    }
}

/// Non-empty, no rule kind twice, every rule individually valid.
pub fn validate_rules(rules: &[ExitRule]) -> Result<(), ConfigError> {
    if rules.is_empty() {
        return Err(ConfigError::EmptyExitRules);
    }
    for (i, rule) in rules.iter().enumerate() {
        rule.validate()?;
        if rules[..i].iter().any(|r| r.reason() == rule.reason()) {
            return Err(ConfigError::DuplicateExitRule(rule.reason().as_str().to_string()));
        }
    }
    Ok(())
}
