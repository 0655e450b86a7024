//! Error kinds raised by the board, the turn engine and the self-play runner.
//!
//! Validation errors never leave a half-applied state behind: every engine
//! step validates its decision completely before touching the board.

use crate::board::position::Position;
use crate::board::race::Race;
use crate::board::unit::UnitId;
use crate::board::PlayerId;

/// Why a decision was rejected by the turn engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecisionFault {
    #[error("no cell at {0}")]
    NoSuchCell(Position),

    #[error("cell {0} is not reachable for capture")]
    Unreachable(Position),

    #[error("cell {0} was already taken this turn")]
    AlreadyCaught(Position),

    #[error("cell {0} is not owned by the deciding player")]
    NotOwned(Position),

    #[error("unit {0} is not available to the deciding player")]
    UnitUnavailable(UnitId),

    #[error("unit {0} is used more than once")]
    DuplicateUnit(UnitId),

    #[error("a catch must send at least one unit")]
    NoUnits,

    #[error("player {0} is not the player to move")]
    NotToMove(PlayerId),

    #[error("expected a {expected} decision, got {got}")]
    WrongStep {
        expected: &'static str,
        got: &'static str,
    },

    #[error("the game is over")]
    GameOver,
}

/// Errors produced by the game engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("board must be at least {min}x{min}, got {width}x{height}")]
    Size { width: i32, height: i32, min: i32 },

    #[error("invalid map: {0}")]
    InvalidMap(String),

    #[error("a game seats 2 to 6 players with distinct ids, got {0}")]
    PlayerCount(usize),

    #[error("race {0} is not in the pool")]
    InvalidRace(Race),

    #[error("invalid decision: {0}")]
    InvalidDecision(#[from] DecisionFault),

    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("game exceeded {0} decisions without finishing")]
    DecisionLimit(usize),

    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),
}
