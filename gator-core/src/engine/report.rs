//! Per-bar output of the engine: the decision plus read-only charting and
//! diagnostic state.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::components::{CrossoverState, LineSnapshot, PeakVerdict, StopBands};
use crate::domain::Decision;

/// Internal state after the bar was processed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Lines and ATR were all available on this bar.
    pub ready: bool,
    pub crossover_state: CrossoverState,
    pub crossover_fired: bool,
    pub trending: bool,
    pub hurst: Option<f64>,
    /// Peak filter verdict, when the filter was consulted.
    pub peak_verdict: Option<PeakVerdict>,
    pub peak_waiting: bool,
    pub days_waited: usize,
    pub z_score: Option<f64>,
    pub invested: bool,
    pub entry_price: Option<f64>,
    pub highest_price: Option<f64>,
    pub cooldown_remaining: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarReport {
    pub date: NaiveDate,
    pub close: f64,
    pub decision: Decision,
    pub lines: Option<LineSnapshot>,
    pub bands: Option<StopBands>,
    pub atr: Option<f64>,
    pub diagnostics: Diagnostics,
}

impl BarReport {
    pub fn is_ready(&self) -> bool {
        self.diagnostics.ready
    }
}

/// Flat row for CSV output.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub date: NaiveDate,
    pub close: f64,
    pub action: &'static str,
    pub reason: Option<&'static str>,
    pub fast: Option<f64>,
    pub medium: Option<f64>,
    pub slow: Option<f64>,
    pub atr: Option<f64>,
    pub band_upper: Option<f64>,
    pub band_lower: Option<f64>,
    pub crossover_state: &'static str,
    pub trending: bool,
    pub z_score: Option<f64>,
    pub peak_waiting: bool,
    pub invested: bool,
    pub cooldown_remaining: usize,
}

impl From<&BarReport> for ReportRow {
    fn from(report: &BarReport) -> Self {
        let d = &report.diagnostics;
        Self {
            date: report.date,
            close: report.close,
            action: report.decision.action(),
            reason: report.decision.reason(),
            fast: report.lines.map(|l| l.fast),
            medium: report.lines.map(|l| l.medium),
            slow: report.lines.map(|l| l.slow),
            atr: report.atr,
            band_upper: report.bands.map(|b| b.upper),
            band_lower: report.bands.map(|b| b.lower),
            crossover_state: d.crossover_state.as_str(),
            trending: d.trending,
            z_score: d.z_score,
            peak_waiting: d.peak_waiting,
            invested: d.invested,
            cooldown_remaining: d.cooldown_remaining,
        }
    }
}
