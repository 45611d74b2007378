//! Position state owned by the engine.
//!
//! The engine never sizes or places orders; it only tracks whether it has
//! signalled an open long, where that entry happened and the high watermark
//! since then.

use serde::{Deserialize, Serialize};

/// Open-long bookkeeping plus the cooldown counter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionState {
    /// Close of the BUY bar. Set only on BUY, cleared only on SELL.
    pub entry_price: Option<f64>,
    /// Highest close seen since entry (inclusive of the entry bar).
    pub highest_price_since_entry: Option<f64>,
    /// Bars left before the opposite-direction evaluator may run.
    pub cooldown_remaining: usize,
}

impl PositionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_invested(&self) -> bool {
        self.entry_price.is_some()
    }

    /// Record a BUY at `price` and start the cooldown.
    pub fn open(&mut self, price: f64, cooldown: usize) {
        self.entry_price = Some(price);
        self.highest_price_since_entry = Some(price);
        self.cooldown_remaining = cooldown;
    }

    /// Record a SELL and start the cooldown.
    pub fn close(&mut self, cooldown: usize) {
        self.entry_price = None;
        self.highest_price_since_entry = None;
        self.cooldown_remaining = cooldown;
    }

    /// Raise the high watermark to `price` if it is a new high. No-op when flat.
    pub fn mark(&mut self, price: f64) {
        if let Some(high) = self.highest_price_since_entry.as_mut() {
            if price > *high {
                *high = price;
            }
        }
    }

    pub fn cooldown_active(&self) -> bool {
        self.cooldown_remaining > 0
    }

    /// End-of-bar cooldown decrement.
    pub fn tick_cooldown(&mut self) {
        self.cooldown_remaining = self.cooldown_remaining.saturating_sub(1);
    }
}
