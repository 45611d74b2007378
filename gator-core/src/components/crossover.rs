//! Crossover state machine: one-shot bullish entry trigger.
//!
//! States:
//! - `BelowAll`: price under every line with the lines in bearish order.
//! - `AboveLines`: a bullish crossover has fired; no new signal until reset.
//! - `MouthShut`: the lines lost bullish order while a signal was outstanding.
//! - `Rearmed`: price fell back under the fast line with the lines still
//!   tangled; the next bullish crossover may fire again.
//!
//! Exactly one transition is taken per bar. The bearish reset to `BelowAll`
//! wins over every other transition.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::lines::LineSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CrossoverState {
    #[default]
    BelowAll,
    AboveLines,
    MouthShut,
    Rearmed,
}

impl CrossoverState {
    /// Pure transition for one bar. Returns the next state and whether a
    /// bullish crossover fired on this bar.
    pub fn step(self, price: f64, lines: &LineSnapshot) -> (CrossoverState, bool) {
        let bullish = lines.is_bullish();
        if lines.price_below_all(price) && lines.is_bearish() {
            return (CrossoverState::BelowAll, false);
        }
        match self {
            CrossoverState::BelowAll | CrossoverState::Rearmed
                if lines.price_above_fast(price) && bullish =>
            {
                (CrossoverState::AboveLines, true)
            }
            CrossoverState::AboveLines if !bullish => (CrossoverState::MouthShut, false),
            CrossoverState::MouthShut if lines.price_above_fast(price) && bullish => {
                (CrossoverState::AboveLines, true)
            }
            CrossoverState::MouthShut if !bullish && price < lines.fast => {
                (CrossoverState::Rearmed, false)
            }
            state => (state, false),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CrossoverState::BelowAll => "BELOW_ALL",
            CrossoverState::AboveLines => "ABOVE_LINES",
            CrossoverState::MouthShut => "MOUTH_SHUT",
            CrossoverState::Rearmed => "REARMED",
        }
    }
}

/// Stateful wrapper around [`CrossoverState::step`].
#[derive(Debug, Clone, Default)]
pub struct CrossoverStateMachine {
    state: CrossoverState,
}

impl CrossoverStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CrossoverState {
        self.state
    }

    /// Advance one bar; true when a bullish crossover fired.
    pub fn update(&mut self, price: f64, lines: &LineSnapshot) -> bool {
        let (next, fired) = self.state.step(price, lines);
        if next != self.state {
            debug!(from = self.state.as_str(), to = next.as_str(), "crossover transition");
        }
        self.state = next;
        fired
    }

    /// Reset after an exit so a fresh crossover can fire.
    pub fn rearm(&mut self) {
        self.state = CrossoverState::Rearmed;
    }
}
