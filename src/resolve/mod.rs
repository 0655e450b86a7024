//! Turn resolution.
//!
//! Applies validated decisions to a `GameState`: captures and entries, defense
//! distribution, coin accrual, and the turn cursor that sequences them.

pub mod capture;
pub mod coins;
pub mod distribution;
pub mod turn;

pub use capture::{capture_cost, resolve_catch, CaptureCost, CaptureEvent, CatchOutcome};
pub use coins::accrue_coins;
pub use distribution::apply_distribution;
pub use turn::{apply, apply_decision, StepReport};
