//! Engine: the per-bar orchestrator and its outputs.

pub mod replay;
pub mod report;
pub mod signal_engine;

pub use replay::{replay, ReplayError, ReplayOutcome, DEFAULT_ATR_PERIOD};
pub use report::{BarReport, Diagnostics, ReportRow};
pub use signal_engine::SignalEngine;
