//! Batch replay: validate a bar series, derive ATR readings and run it
//! through a fresh engine.

use crate::config::{ConfigError, EngineConfig};
use crate::domain::{validate_sequence, Bar, BarError};
use crate::fingerprint::DecisionLog;
use crate::indicators::WilderAtr;

use super::report::BarReport;
use super::signal_engine::SignalEngine;

/// Conventional Wilder ATR length.
pub const DEFAULT_ATR_PERIOD: usize = 14;

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Bars(#[from] BarError),
}

#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    pub reports: Vec<BarReport>,
    pub log: DecisionLog,
}

/// Replay `bars` through a new engine built from `config`, using a
/// [`WilderAtr`] of `atr_period` as the volatility source.
pub fn replay(
    config: &EngineConfig,
    bars: &[Bar],
    atr_period: usize,
) -> Result<ReplayOutcome, ReplayError> {
    validate_sequence(bars)?;
    let mut engine = SignalEngine::new(config.clone())?;
    let mut atr = WilderAtr::new(atr_period)?;
    let mut log = DecisionLog::new();
    let mut reports = Vec::with_capacity(bars.len());

    for bar in bars {
        let reading = atr.update(bar);
        let report = engine.on_bar(bar, reading);
        log.record(&report);
        reports.push(report);
    }

    Ok(ReplayOutcome { reports, log })
}
