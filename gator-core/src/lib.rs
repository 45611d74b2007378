//! Gator Core: streaming signal engine for single-instrument trend trading.
//!
//! This crate contains:
//! - Domain types (bars, decisions, position state)
//! - Streaming indicators (lagged smoother, Wilder ATR, EMA, Hurst exponent)
//! - Decision components (crossover state machine, trend gate, peak filter,
//!   volatility stop, entry and exit evaluators)
//! - The per-bar `SignalEngine` orchestrator and batch replay
//! - Configuration, presets and run fingerprinting

pub mod components;
pub mod config;
pub mod domain;
pub mod engine;
pub mod fingerprint;
pub mod indicators;

pub use config::{ConfigError, EngineConfig, StrategyPreset};
pub use domain::{Bar, Decision};
pub use engine::{replay, BarReport, SignalEngine};
