//! Decision values a faction hands to the turn engine.
//!
//! One variant per kind of question the engine asks during a turn. The
//! engine dispatches on the variant and rejects any that does not match the
//! step it is waiting for.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::position::Position;
use super::race::Race;
use super::unit::UnitId;

/// A single capture (or entry) attempt: the target cell and the units sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Catch {
    /// Target cell.
    pub position: Position,
    /// Units sent, all available to the sender.
    pub units: Vec<UnitId>,
}

impl Catch {
    pub fn new(position: Position, units: Vec<UnitId>) -> Self {
        Catch { position, units }
    }
}

/// Defense garrisons: owned cell -> units stationed there.
pub type Distribution = BTreeMap<Position, Vec<UnitId>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// Abandon every owned cell and pick a new race.
    Decline(bool),
    ChangeRace(Race),
    /// `None` ends the capture loop.
    CatchCell(Option<Catch>),
    Distribution(Distribution),
}

impl Decision {
    /// Short kind name used in error messages and logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Decision::Decline(_) => "decline",
            Decision::ChangeRace(_) => "change-race",
            Decision::CatchCell(_) => "catch-cell",
            Decision::Distribution(_) => "distribution",
        }
    }
}
