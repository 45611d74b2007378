//! Entry evaluator: decides BUY while flat.
//!
//! Priority:
//! 1. Catch-up: trend up, lines in bullish order and close above the fast
//!    line. Fires once, every time, or never depending on [`CatchUpMode`].
//! 2. Signal: a fired crossover, or the optional condition check, that passes
//!    the trend gate, the minimum fast/medium separation and the gap guard is
//!    handed to the peak filter. While the filter holds a deferred signal it
//!    is consulted every flat bar, so an expired wait can still turn into a
//!    (deferred) entry. A wait armed after an exit only advances on signal
//!    bars.
//! 3. Hold.
//!
//! The condition check fires when all three lines rose since the previous
//! bar, the close is above every line, the last two closes were rising and
//! every pairwise line distance exceeds `threshold_pct` of the slow line.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::domain::EntryReason;

use super::lines::LineSnapshot;
use super::peak_filter::{PeakConfirmationFilter, PeakVerdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatchUpMode {
    Disabled,
    /// Spent by the first BUY of any kind.
    #[default]
    Once,
    AlwaysArmed,
}

/// Line the gap guard measures the typical price against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapReference {
    #[default]
    Slow,
    Fast,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionCheck {
    /// Minimum pairwise line distance as a fraction of the slow line.
    pub threshold_pct: f64,
}

impl Default for ConditionCheck {
    fn default() -> Self {
        Self {
            threshold_pct: 0.02,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryConfig {
    pub catch_up: CatchUpMode,
    /// Required fast − medium distance, in ATR multiples.
    pub min_separation_atr: f64,
    /// Block when the typical price sits more than this many percent above
    /// the `gap_reference` line. `None` turns the guard off.
    pub max_gap_pct: Option<f64>,
    pub gap_reference: GapReference,
    /// Rule-based entry signal alongside the crossover. `None` turns it off.
    pub condition_check: Option<ConditionCheck>,
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            catch_up: CatchUpMode::Once,
            min_separation_atr: 1.0,
            max_gap_pct: None,
            gap_reference: GapReference::Slow,
            condition_check: None,
        }
    }
}

impl EntryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_separation_atr >= 0.0 && self.min_separation_atr.is_finite()) {
            return Err(ConfigError::OutOfRange {
                name: "entry.min_separation_atr".into(),
                value: self.min_separation_atr,
                expected: ">= 0".into(),
            });
        }
        if let Some(gap) = self.max_gap_pct {
            if !(gap > 0.0 && gap.is_finite()) {
                return Err(ConfigError::NonPositive {
                    name: "entry.max_gap_pct".into(),
                    value: gap,
                });
            }
        }
        if let Some(check) = self.condition_check {
            if !(check.threshold_pct > 0.0 && check.threshold_pct.is_finite()) {
                return Err(ConfigError::NonPositive {
                    name: "entry.condition_check.threshold_pct".into(),
                    value: check.threshold_pct,
                });
            }
        }
        Ok(())
    }
}

/// Everything the evaluator reads on one bar.
#[derive(Debug, Clone, Copy)]
pub struct EntryContext {
    pub close: f64,
    pub typical: f64,
    pub lines: LineSnapshot,
    pub atr: f64,
    pub trending: bool,
    pub crossover: bool,
    /// Lines on the previous bar, once all three were emitting.
    pub previous: Option<LineSnapshot>,
    /// Closes one and two bars back.
    pub prior_closes: Option<(f64, f64)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryOutcome {
    pub reason: Option<EntryReason>,
    /// Peak filter verdict, when the filter was consulted.
    pub peak: Option<PeakVerdict>,
}

impl EntryOutcome {
    fn hold(peak: Option<PeakVerdict>) -> Self {
        Self { reason: None, peak }
    }
}

#[derive(Debug, Clone)]
pub struct EntryEvaluator {
    config: EntryConfig,
    catch_up_spent: bool,
}

impl EntryEvaluator {
    pub fn new(config: EntryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            catch_up_spent: false,
        })
    }

    pub fn catch_up_armed(&self) -> bool {
        match self.config.catch_up {
            CatchUpMode::Disabled => false,
            CatchUpMode::Once => !self.catch_up_spent,
            CatchUpMode::AlwaysArmed => true,
        }
    }

    pub fn separation_ok(&self, lines: &LineSnapshot, atr: f64) -> bool {
        lines.fast_medium_gap() >= self.config.min_separation_atr * atr
    }

    pub fn gap_ok(&self, lines: &LineSnapshot, typical: f64) -> bool {
        let Some(pct) = self.config.max_gap_pct else {
            return true;
        };
        let reference = match self.config.gap_reference {
            GapReference::Slow => lines.slow,
            GapReference::Fast => lines.fast,
        };
        reference * (1.0 + pct / 100.0) >= typical
    }

    pub fn condition_met(&self, ctx: &EntryContext) -> bool {
        let Some(check) = self.config.condition_check else {
            return false;
        };
        let (Some(previous), Some((last_close, before))) = (ctx.previous, ctx.prior_closes) else {
            return false;
        };
        let lines = ctx.lines;
        ctx.close > lines.fast.max(lines.medium).max(lines.slow)
            && lines.rising_from(&previous)
            && ctx.close > last_close
            && last_close > before
            && lines.mouth_open(check.threshold_pct)
    }

    pub fn evaluate(
        &self,
        ctx: &EntryContext,
        filter: &mut PeakConfirmationFilter,
    ) -> EntryOutcome {
        if self.catch_up_armed()
            && ctx.trending
            && ctx.lines.is_bullish()
            && ctx.lines.price_above_fast(ctx.close)
        {
            return EntryOutcome {
                reason: Some(EntryReason::StartupCatchUp),
                peak: None,
            };
        }

        let gates = ctx.trending
            && self.separation_ok(&ctx.lines, ctx.atr)
            && self.gap_ok(&ctx.lines, ctx.typical);

        let condition = !ctx.crossover && self.condition_met(ctx);
        let signal = ctx.crossover || condition;
        if !((signal && gates) || filter.has_deferred_signal()) {
            return EntryOutcome::hold(None);
        }

        let verdict = filter.evaluate(ctx.typical);
        if verdict.is_pass() && gates {
            let reason = if ctx.crossover {
                EntryReason::BullishCrossover
            } else if condition {
                EntryReason::ConditionCheck
            } else {
                EntryReason::DeferredCrossover
            };
            return EntryOutcome {
                reason: Some(reason),
                peak: Some(verdict),
            };
        }
        EntryOutcome::hold(Some(verdict))
    }

    /// Record a BUY.
    pub fn on_buy(&mut self) {
        if self.config.catch_up == CatchUpMode::Once {
            self.catch_up_spent = true;
        }
    }
}
