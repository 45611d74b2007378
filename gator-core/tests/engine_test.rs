//! Integration tests for the signal engine.
//!
//! Tests:
//! 1. Ramp-then-fall scenario: one BUY near the first bullish crossover, one
//!    SELL from the trailing stop, with the right reasons.
//! 2. Exit rule order decides the reason when several rules fire together.
//! 3. Peak filter deferral, reversal and post-exit arming through the engine.
//! 4. Catch-up modes.
//! 5. Determinism of replays.
//! 6. Gap reference, line cross exits and the condition-check entry.

use chrono::NaiveDate;
use gator_core::components::{
    CatchUpMode, ConditionCheck, CrossoverState, ExitRule, GapReference, PeakFilterConfig,
    PeakVerdict, TrendDetector,
};
use gator_core::domain::{Bar, Decision, EntryReason, ExitReason};
use gator_core::engine::{replay, BarReport, SignalEngine};
use gator_core::indicators::{AtrReading, WilderAtr};
use gator_core::{EngineConfig, StrategyPreset};

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

/// open = previous close, high/low one point outside the body.
fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
            }
        })
        .collect()
}

/// 100 → 130 in steps of 1, then down to 90 in steps of 4.
fn ramp_then_fall() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..=30).map(|i| 100.0 + i as f64).collect();
    closes.extend((1..=10).map(|k| 130.0 - 4.0 * k as f64));
    closes
}

/// Shifted 5/3, 8/5, 13/8 lines, no trend gate, 10% gap over the fast line,
/// 3% trailing and hard stops.
fn scenario_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.trend = TrendDetector::Disabled;
    config.entry.catch_up = CatchUpMode::Disabled;
    config.entry.max_gap_pct = Some(10.0);
    config.entry.gap_reference = GapReference::Fast;
    config.exit.cooldown_bars = 1;
    config.exit.rules = vec![
        ExitRule::TrailingStop { pct: 0.03 },
        ExitRule::HardStop { pct: 0.03 },
    ];
    config
}

fn peak_filter(arm_after_exit: bool) -> PeakFilterConfig {
    PeakFilterConfig {
        enabled: true,
        lookback: 20,
        k: 1.5,
        max_peak_days: 2,
        arm_after_exit,
    }
}

fn run(config: &EngineConfig, closes: &[f64]) -> Vec<BarReport> {
    replay(config, &make_bars(closes), 14).unwrap().reports
}

fn trades(reports: &[BarReport]) -> Vec<(usize, Decision)> {
    reports
        .iter()
        .enumerate()
        .filter(|(_, r)| r.decision != Decision::Hold)
        .map(|(i, r)| (i, r.decision))
        .collect()
}

// ──────────────────────────────────────────────
// Ramp then fall
// ──────────────────────────────────────────────

#[test]
fn ramp_then_fall_buys_once_and_sells_once() {
    let reports = run(&scenario_config(), &ramp_then_fall());

    assert_eq!(
        trades(&reports),
        vec![
            (21, Decision::Buy(EntryReason::BullishCrossover)),
            (31, Decision::Sell(ExitReason::TrailingStop)),
        ]
    );

    // First ready bar: lines bullish, price above the fast line.
    let buy = &reports[21];
    assert!(buy.is_ready());
    assert!(!reports[20].is_ready());
    let lines = buy.lines.unwrap();
    assert!(lines.is_bullish());
    assert!(buy.close > lines.fast);
    assert!(buy.diagnostics.crossover_fired);
    assert_eq!(buy.diagnostics.entry_price, Some(121.0));

    // 126 <= 130 * 0.97 while 126 > 121 * 0.97: the trailing stop fires first.
    let sell = &reports[31];
    assert_eq!(sell.diagnostics.entry_price, None);
    assert!(!sell.diagnostics.invested);
    assert_eq!(sell.diagnostics.crossover_state, CrossoverState::Rearmed);
}

#[test]
fn watermark_tracks_highest_close() {
    let reports = run(&scenario_config(), &ramp_then_fall());
    for (i, report) in reports.iter().enumerate().take(31).skip(21) {
        assert_eq!(report.diagnostics.highest_price, Some(100.0 + i as f64));
    }
}

#[test]
fn cooldown_counts_down_after_each_trade() {
    let reports = run(&scenario_config(), &ramp_then_fall());
    // Set to 1 on the trade bar and decremented at the end of that same bar.
    assert_eq!(reports[21].diagnostics.cooldown_remaining, 0);
    assert_eq!(reports[31].diagnostics.cooldown_remaining, 0);
}

#[test]
fn catch_up_takes_the_crossover_bar_when_armed() {
    let mut config = scenario_config();
    config.entry.catch_up = CatchUpMode::Once;
    let reports = run(&config, &ramp_then_fall());
    assert_eq!(
        trades(&reports),
        vec![
            (21, Decision::Buy(EntryReason::StartupCatchUp)),
            (31, Decision::Sell(ExitReason::TrailingStop)),
        ]
    );
}

// ──────────────────────────────────────────────
// Exit priority
// ──────────────────────────────────────────────

#[test]
fn rule_order_decides_reason_when_stops_coincide() {
    // Entry at the high, then a 5% drop trips both 3% stops at once.
    let mut closes: Vec<f64> = (0..22).map(|i| 100.0 + i as f64).collect();
    closes.extend([115.0, 110.0]);

    let trailing_first = run(&scenario_config(), &closes);
    assert_eq!(
        trades(&trailing_first),
        vec![
            (21, Decision::Buy(EntryReason::BullishCrossover)),
            (22, Decision::Sell(ExitReason::TrailingStop)),
        ]
    );

    let mut config = scenario_config();
    config.exit.rules.reverse();
    let hard_first = run(&config, &closes);
    assert_eq!(hard_first[22].decision, Decision::Sell(ExitReason::HardStop));
}

#[test]
fn cooldown_delays_exit() {
    let mut closes: Vec<f64> = (0..22).map(|i| 100.0 + i as f64).collect();
    closes.extend([115.0, 110.0, 105.0]);
    let mut config = scenario_config();
    config.exit.cooldown_bars = 3;
    let reports = run(&config, &closes);
    assert!(reports[21].decision.is_buy());
    assert_eq!(reports[22].decision, Decision::Hold);
    assert_eq!(reports[23].decision, Decision::Hold);
    assert!(reports[24].decision.is_sell());
}

// ──────────────────────────────────────────────
// Peak filter through the engine
// ──────────────────────────────────────────────

#[test]
fn expensive_crossover_is_deferred_then_taken() {
    // A straight ramp puts the crossover bar ~1.65 std above its 20-bar mean.
    let mut config = scenario_config();
    config.peak_filter = peak_filter(false);
    let reports = run(&config, &ramp_then_fall());

    assert_eq!(
        reports[21].diagnostics.peak_verdict,
        Some(PeakVerdict::StartedWaiting)
    );
    assert!(reports[21].diagnostics.peak_waiting);
    assert!(reports[21].diagnostics.z_score.unwrap() > 1.5);
    assert_eq!(
        reports[22].diagnostics.peak_verdict,
        Some(PeakVerdict::StillWaiting)
    );
    assert_eq!(reports[22].diagnostics.days_waited, 1);

    assert_eq!(
        trades(&reports),
        vec![
            (23, Decision::Buy(EntryReason::DeferredCrossover)),
            (31, Decision::Sell(ExitReason::TrailingStop)),
        ]
    );
}

#[test]
fn reversal_after_expensive_crossover_blocks_entry() {
    let mut closes: Vec<f64> = (0..22).map(|i| 100.0 + i as f64).collect();
    closes.extend([119.0, 123.0, 124.0, 125.0, 126.0]);
    let mut config = scenario_config();
    config.peak_filter = peak_filter(false);
    let reports = run(&config, &closes);

    assert_eq!(
        reports[22].diagnostics.peak_verdict,
        Some(PeakVerdict::ReversalConfirmed)
    );
    assert!(trades(&reports).is_empty());
}

#[test]
fn wait_armed_after_exit_never_buys_without_a_crossover() {
    let mut config = scenario_config();
    config.peak_filter = peak_filter(true);
    let reports = run(&config, &ramp_then_fall());

    assert!(reports[31].decision.is_sell());
    assert!(reports[31].diagnostics.peak_waiting);
    for report in &reports[32..] {
        assert_eq!(report.decision, Decision::Hold);
        assert!(report.diagnostics.peak_waiting);
    }
}

// ──────────────────────────────────────────────
// Catch-up modes
// ──────────────────────────────────────────────

#[test]
fn always_armed_catch_up_reenters_after_exit() {
    let mut closes: Vec<f64> = (0..22).map(|i| 100.0 + i as f64).collect();
    closes.push(115.0);
    closes.extend((0..8).map(|k| 117.0 + 2.0 * k as f64));

    let mut once = scenario_config();
    once.entry.catch_up = CatchUpMode::Once;
    assert_eq!(
        trades(&run(&once, &closes)),
        vec![
            (21, Decision::Buy(EntryReason::StartupCatchUp)),
            (22, Decision::Sell(ExitReason::TrailingStop)),
            (23, Decision::Buy(EntryReason::BullishCrossover)),
        ]
    );

    let mut always = scenario_config();
    always.entry.catch_up = CatchUpMode::AlwaysArmed;
    assert_eq!(
        trades(&run(&always, &closes)),
        vec![
            (21, Decision::Buy(EntryReason::StartupCatchUp)),
            (22, Decision::Sell(ExitReason::TrailingStop)),
            (23, Decision::Buy(EntryReason::StartupCatchUp)),
        ]
    );
}

// ──────────────────────────────────────────────
// Determinism
// ──────────────────────────────────────────────

fn wavy_closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            100.0 + t * 0.15 + (t * 0.21).sin() * 8.0 + (t * 0.05).cos() * 4.0
        })
        .collect()
}

#[test]
fn replay_is_deterministic_for_every_preset() {
    let bars = make_bars(&wavy_closes(400));
    for preset in StrategyPreset::all() {
        let config = preset.to_config();
        let a = replay(&config, &bars, 14).unwrap();
        let b = replay(&config, &bars, 14).unwrap();
        assert_eq!(a.reports, b.reports, "{preset}");
        assert_eq!(a.log.digest(), b.log.digest(), "{preset}");
    }
}

#[test]
fn streaming_matches_replay() {
    let config = StrategyPreset::AtrStop.to_config();
    let bars = make_bars(&wavy_closes(300));
    let batch = replay(&config, &bars, 14).unwrap().reports;

    let mut engine = SignalEngine::new(config).unwrap();
    let mut atr = WilderAtr::new(14).unwrap();
    let streamed: Vec<BarReport> = bars
        .iter()
        .map(|bar| engine.on_bar(bar, atr.update(bar)))
        .collect();
    assert_eq!(batch, streamed);
}

#[test]
fn one_decision_per_bar_and_alternating_trades() {
    let bars = make_bars(&wavy_closes(500));
    for preset in StrategyPreset::all() {
        let out = replay(&preset.to_config(), &bars, 14).unwrap();
        assert_eq!(out.reports.len(), bars.len());
        let mut invested = false;
        for report in &out.reports {
            match report.decision {
                Decision::Buy(_) => {
                    assert!(!invested, "{preset}: BUY while invested");
                    invested = true;
                }
                Decision::Sell(_) => {
                    assert!(invested, "{preset}: SELL while flat");
                    invested = false;
                }
                Decision::Hold => {}
            }
            assert_eq!(report.diagnostics.invested, invested);
        }
    }
}

#[test]
fn not_ready_reading_always_holds() {
    let mut engine = SignalEngine::new(scenario_config()).unwrap();
    for bar in &make_bars(&ramp_then_fall()) {
        let report = engine.on_bar(bar, AtrReading::not_ready());
        assert_eq!(report.decision, Decision::Hold);
        assert!(!report.is_ready());
    }
}

// ──────────────────────────────────────────────
// Gap reference, cross exits, condition check
// ──────────────────────────────────────────────

#[test]
fn slow_gap_reference_blocks_the_extended_ramp() {
    // At bar 21 the typical price sits within 10% of the fast line but more
    // than 10% above the slow line.
    let mut config = scenario_config();
    config.entry.gap_reference = GapReference::Slow;
    let reports = run(&config, &ramp_then_fall());

    assert!(trades(&reports).is_empty());
    assert!(reports[21].diagnostics.crossover_fired);
}

#[test]
fn fast_cross_below_slow_exits_on_the_cross_bar() {
    let mut config = scenario_config();
    config.exit.rules = vec![ExitRule::FastCrossBelowSlow];
    let reports = run(&config, &ramp_then_fall());

    assert_eq!(
        trades(&reports),
        vec![
            (21, Decision::Buy(EntryReason::BullishCrossover)),
            (39, Decision::Sell(ExitReason::FastCrossBelowSlow)),
        ]
    );
    let prev = reports[38].lines.unwrap();
    let lines = reports[39].lines.unwrap();
    assert!(prev.fast >= prev.slow);
    assert!(lines.fast < lines.slow);
}

#[test]
fn medium_cross_buffer_delays_exit_to_the_slow_cross() {
    let mut config = scenario_config();
    config.exit.rules = vec![
        ExitRule::FastCrossBelowMedium { buffer: 0.0 },
        ExitRule::FastCrossBelowSlow,
    ];
    let reports = run(&config, &ramp_then_fall());
    assert_eq!(
        trades(&reports)[1],
        (37, Decision::Sell(ExitReason::FastCrossBelowMedium))
    );

    // A 2% buffer is never cleared by the shallow medium cross.
    config.exit.rules[0] = ExitRule::FastCrossBelowMedium { buffer: 0.02 };
    let reports = run(&config, &ramp_then_fall());
    assert_eq!(
        trades(&reports)[1],
        (39, Decision::Sell(ExitReason::FastCrossBelowSlow))
    );
}

/// Ramp to 130, a one-bar drop to 125, then rising closes from 126.
fn dip_and_recover() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..=30).map(|i| 100.0 + i as f64).collect();
    closes.push(125.0);
    closes.extend((0..10).map(|i| 126.0 + i as f64));
    closes
}

#[test]
fn condition_check_reenters_after_crossover_lost_to_cooldown() {
    let mut config = scenario_config();
    config.exit.cooldown_bars = 2;

    // The re-cross on bar 32 lands inside the cooldown and is dropped.
    let reports = run(&config, &dip_and_recover());
    assert!(reports[32].diagnostics.crossover_fired);
    assert_eq!(
        trades(&reports),
        vec![
            (21, Decision::Buy(EntryReason::BullishCrossover)),
            (31, Decision::Sell(ExitReason::TrailingStop)),
        ]
    );

    config.entry.condition_check = Some(ConditionCheck { threshold_pct: 0.02 });
    let reports = run(&config, &dip_and_recover());
    assert_eq!(
        trades(&reports),
        vec![
            (21, Decision::Buy(EntryReason::BullishCrossover)),
            (31, Decision::Sell(ExitReason::TrailingStop)),
            (33, Decision::Buy(EntryReason::ConditionCheck)),
        ]
    );
    assert!(!reports[33].diagnostics.crossover_fired);
}
