//! Signal engine: per-bar orchestration for one tracked instrument.
//!
//! Per bar, strictly in this order:
//! 1. Feed the typical price to the lines, histories and peak-filter window.
//! 2. Not ready (any line or ATR missing) → HOLD.
//! 3. Step the crossover state machine (flat or invested).
//! 4. Evaluate the trend gate.
//! 5. Flat: entry evaluator (unless cooling down). Invested: raise the high
//!    watermark, then exit evaluator (unless cooling down).
//! 6. Apply BUY/SELL side effects.
//! 7. Decrement the cooldown.

use chrono::NaiveDate;
use tracing::{debug, info, trace};

use crate::components::{
    CrossoverStateMachine, EntryContext, EntryEvaluator, ExitContext, ExitEvaluator,
    LineSnapshot, LineTriple, PeakConfirmationFilter, PeakVerdict, TrendDetector, TrendInputs,
    TrendReading, VolatilityStop,
};
use crate::config::{ConfigError, EngineConfig};
use crate::domain::{Bar, Decision, EntryReason, ExitReason, PositionState};
use crate::indicators::{AtrReading, RollingWindow};

use super::report::{BarReport, Diagnostics};

/// Streaming BUY/SELL/HOLD engine. One instance per instrument.
#[derive(Debug, Clone)]
pub struct SignalEngine {
    config: EngineConfig,
    lines: LineTriple,
    volatility: VolatilityStop,
    trend: TrendDetector,
    crossover: CrossoverStateMachine,
    peak_filter: PeakConfirmationFilter,
    entry: EntryEvaluator,
    exit: ExitEvaluator,
    position: PositionState,
    typical_history: RollingWindow,
    fast_history: RollingWindow,
    medium_history: RollingWindow,
    closes: RollingWindow,
    previous_lines: Option<LineSnapshot>,
    bars_seen: usize,
    last_date: Option<NaiveDate>,
}

/// What happened on a ready bar before side effects are applied.
struct Step {
    decision: Decision,
    fired: bool,
    trend: TrendReading,
    peak: Option<PeakVerdict>,
}

impl SignalEngine {
    /// Validate `config` and build every component. An invalid config never
    /// produces an engine.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let trend_len = config.trend.history_len().max(1);
        let exit = ExitEvaluator::new(config.exit.rules.clone())?;
        let fast_len = trend_len.max(exit.history_len());

        Ok(Self {
            lines: LineTriple::new(&config.lines)?,
            volatility: VolatilityStop::new(config.volatility)?,
            trend: config.trend.clone(),
            crossover: CrossoverStateMachine::new(),
            peak_filter: PeakConfirmationFilter::new(config.peak_filter)?,
            entry: EntryEvaluator::new(config.entry)?,
            exit,
            position: PositionState::new(),
            typical_history: RollingWindow::new(trend_len),
            fast_history: RollingWindow::new(fast_len),
            medium_history: RollingWindow::new(trend_len),
            closes: RollingWindow::new(3),
            previous_lines: None,
            bars_seen: 0,
            last_date: None,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn position(&self) -> &PositionState {
        &self.position
    }

    pub fn crossover(&self) -> &CrossoverStateMachine {
        &self.crossover
    }

    pub fn peak_filter(&self) -> &PeakConfirmationFilter {
        &self.peak_filter
    }

    pub fn bars_seen(&self) -> usize {
        self.bars_seen
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.last_date
    }

    /// Process one bar. Bars must arrive in strictly increasing date order;
    /// see [`crate::domain::validate_sequence`].
    pub fn on_bar(&mut self, bar: &Bar, atr: AtrReading) -> BarReport {
        let typical = bar.typical_price();
        let outputs = self.lines.update(typical);
        self.typical_history.push(typical);
        self.closes.push(bar.close);
        self.peak_filter.observe(typical);
        if let Some(fast) = outputs.fast {
            self.fast_history.push(fast);
        }
        if let Some(medium) = outputs.medium {
            self.medium_history.push(medium);
        }
        self.volatility.update(atr);
        self.bars_seen += 1;
        self.last_date = Some(bar.date);

        let snapshot = outputs.snapshot();
        let previous = self.previous_lines;
        if snapshot.is_some() {
            self.previous_lines = snapshot;
        }
        let (Some(lines), Some(atr_value)) = (snapshot, self.volatility.atr()) else {
            trace!(date = %bar.date, "warming up");
            self.position.tick_cooldown();
            return self.report(bar, snapshot, false, None);
        };
        trace!(
            date = %bar.date,
            fast = lines.fast,
            medium = lines.medium,
            slow = lines.slow,
            atr = atr_value,
            "lines"
        );

        let step = self.decide(bar, typical, lines, previous, atr_value);
        match step.decision {
            Decision::Buy(reason) => self.apply_buy(bar, reason),
            Decision::Sell(reason) => self.apply_sell(bar, reason),
            Decision::Hold => {}
        }
        self.position.tick_cooldown();
        self.report(bar, Some(lines), true, Some(step))
    }

    fn decide(
        &mut self,
        bar: &Bar,
        typical: f64,
        lines: LineSnapshot,
        previous: Option<LineSnapshot>,
        atr: f64,
    ) -> Step {
        let fired = self.crossover.update(bar.close, &lines);
        let trend = self.trend.evaluate(TrendInputs {
            typical: &self.typical_history,
            fast: &self.fast_history,
            medium: &self.medium_history,
        });

        if !self.position.is_invested() {
            if self.position.cooldown_active() {
                return Step {
                    decision: Decision::Hold,
                    fired,
                    trend,
                    peak: None,
                };
            }
            let outcome = self.entry.evaluate(
                &EntryContext {
                    close: bar.close,
                    typical,
                    lines,
                    atr,
                    trending: trend.trending,
                    crossover: fired,
                    previous,
                    prior_closes: self.closes.back(1).zip(self.closes.back(2)),
                },
                &mut self.peak_filter,
            );
            return Step {
                decision: outcome.reason.map_or(Decision::Hold, Decision::Buy),
                fired,
                trend,
                peak: outcome.peak,
            };
        }

        self.position.mark(bar.close);
        let decision = match (
            self.position.entry_price,
            self.position.highest_price_since_entry,
        ) {
            (Some(entry_price), Some(highest)) if !self.position.cooldown_active() => self
                .exit
                .evaluate(&ExitContext {
                    close: bar.close,
                    lines,
                    previous,
                    fast_history: &self.fast_history,
                    stop: &self.volatility,
                    entry_price,
                    highest,
                })
                .map_or(Decision::Hold, Decision::Sell),
            _ => Decision::Hold,
        };
        Step {
            decision,
            fired,
            trend,
            peak: None,
        }
    }

    fn apply_buy(&mut self, bar: &Bar, reason: EntryReason) {
        info!(date = %bar.date, price = bar.close, reason = reason.as_str(), "BUY");
        self.position.open(bar.close, self.config.exit.cooldown_bars);
        self.peak_filter.clear();
        self.entry.on_buy();
    }

    fn apply_sell(&mut self, bar: &Bar, reason: ExitReason) {
        info!(
            date = %bar.date,
            price = bar.close,
            entry = self.position.entry_price,
            reason = reason.as_str(),
            "SELL"
        );
        self.position.close(self.config.exit.cooldown_bars);
        self.crossover.rearm();
        if self.config.peak_filter.arm_after_exit && self.config.peak_filter.enabled {
            debug!(date = %bar.date, "peak filter armed after exit");
            self.peak_filter.arm_without_reference();
        }
    }

    fn report(
        &self,
        bar: &Bar,
        lines: Option<LineSnapshot>,
        ready: bool,
        step: Option<Step>,
    ) -> BarReport {
        let peak_state = self.peak_filter.state();
        let (decision, fired, trend, peak) = match step {
            Some(s) => (s.decision, s.fired, Some(s.trend), s.peak),
            None => (Decision::Hold, false, None, None),
        };
        BarReport {
            date: bar.date,
            close: bar.close,
            decision,
            lines,
            bands: self.volatility.bands(bar.close),
            atr: self.volatility.atr(),
            diagnostics: Diagnostics {
                ready,
                crossover_state: self.crossover.state(),
                crossover_fired: fired,
                trending: trend.is_some_and(|t| t.trending),
                hurst: trend.and_then(|t| t.hurst),
                peak_verdict: peak,
                peak_waiting: self.peak_filter.is_waiting(),
                days_waited: peak_state.days_waited,
                z_score: peak.and(self.peak_filter.last_z()),
                invested: self.position.is_invested(),
                entry_price: self.position.entry_price,
                highest_price: self.position.highest_price_since_entry,
                cooldown_remaining: self.position.cooldown_remaining,
            },
        }
    }
}
