//! Domain types: bars, position bookkeeping, decisions.

pub mod bar;
pub mod decision;
pub mod position;

pub use bar::{validate_sequence, Bar, BarError};
pub use decision::{Decision, EntryReason, ExitReason};
pub use position::PositionState;
