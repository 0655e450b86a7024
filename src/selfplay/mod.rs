//! Self-play evaluation.
//!
//! Pits tree-search bots against each other over many generated boards and
//! aggregates who won, which races they played and what they captured.

pub mod runner;
pub mod stats;

pub use runner::{
    play_game, run_self_play, GameRecord, Seat, SeatRecord, SelfPlayConfig, SelfPlayReport,
    GAME_AMOUNT,
};
pub use stats::{record_game, PlayerStats, PlayerSummary, SelfPlayStats, StatsSummary};
