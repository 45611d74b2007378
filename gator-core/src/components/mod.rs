//! Decision components: the pieces the engine wires together each bar.
//!
//! Leaf-first: the line triple and volatility stop consume raw readings, the
//! trend gate and crossover machine read the lines, and the entry/exit
//! evaluators combine everything into a single decision.

pub mod crossover;
pub mod entry;
pub mod exit;
pub mod lines;
pub mod peak_filter;
pub mod trend;
pub mod volatility;

pub use crossover::{CrossoverState, CrossoverStateMachine};
pub use entry::{
    CatchUpMode, ConditionCheck, EntryConfig, EntryContext, EntryEvaluator, EntryOutcome,
    GapReference,
};
pub use exit::{ExitContext, ExitEvaluator, ExitRule};
pub use lines::{LineOutputs, LineSnapshot, LineTriple, LinesConfig};
pub use peak_filter::{PeakConfirmationFilter, PeakFilterConfig, PeakState, PeakVerdict};
pub use trend::{TrendDetector, TrendInputs, TrendReading};
pub use volatility::{StopBands, VolatilityConfig, VolatilityStop};
