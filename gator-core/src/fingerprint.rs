//! Run fingerprinting: deterministic identification of replays.
//!
//! - `EngineConfig::config_hash()`: identity of the configuration.
//! - `DecisionLog`: the (date, decision) sequence of one replay, with a
//!   digest so two replays can be compared by hash alone.
//! - `RunSummary`: counts plus both hashes, for the CLI and run history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, EngineConfig};
use crate::domain::Decision;
use crate::engine::BarReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionEntry {
    pub date: NaiveDate,
    pub decision: Decision,
}

/// Ordered decisions of one replay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionLog {
    entries: Vec<DecisionEntry>,
}

impl DecisionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, report: &BarReport) {
        self.entries.push(DecisionEntry {
            date: report.date,
            decision: report.decision,
        });
    }

    pub fn entries(&self) -> &[DecisionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn buys(&self) -> usize {
        self.entries.iter().filter(|e| e.decision.is_buy()).count()
    }

    pub fn sells(&self) -> usize {
        self.entries.iter().filter(|e| e.decision.is_sell()).count()
    }

    /// Only the BUY/SELL entries.
    pub fn trades(&self) -> impl Iterator<Item = &DecisionEntry> {
        self.entries
            .iter()
            .filter(|e| !matches!(e.decision, Decision::Hold))
    }

    /// blake3 over the date and decision of every entry, in order.
    pub fn digest(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for entry in &self.entries {
            hasher.update(entry.date.to_string().as_bytes());
            hasher.update(b"|");
            hasher.update(entry.decision.to_string().as_bytes());
            hasher.update(b"\n");
        }
        hasher.finalize().to_hex().to_string()
    }
}

/// Everything needed to recognise a replay without its reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub bars: usize,
    pub buys: usize,
    pub sells: usize,
    pub config_hash: String,
    pub decision_digest: String,
}

impl RunSummary {
    pub fn new(config: &EngineConfig, log: &DecisionLog) -> Result<Self, ConfigError> {
        Ok(Self {
            bars: log.len(),
            buys: log.buys(),
            sells: log.sells(),
            config_hash: config.config_hash()?,
            decision_digest: log.digest(),
        })
    }
}
