//! Board cells.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::player::PlayerId;
use super::race::Race;
use super::terrain::TerrainType;
use super::unit::UnitId;

/// A single cell of the board.
///
/// `owner` is the faction occupying the cell; `feudal` is the faction
/// collecting its coins. The two differ while a conquest is incomplete or
/// after the owner declined. An unowned cell has no units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub terrain: TerrainType,
    /// Defenders stationed here, all owned by `owner`.
    pub units: BTreeSet<UnitId>,
    /// Faction occupying the cell.
    pub owner: Option<PlayerId>,
    /// Faction collecting the cell's coins.
    pub feudal: Option<PlayerId>,
    /// Race of the last capturer; kept after a decline.
    pub race: Option<Race>,
}

impl Cell {
    pub fn new(terrain: TerrainType) -> Self {
        Cell {
            terrain,
            units: BTreeSet::new(),
            owner: None,
            feudal: None,
            race: None,
        }
    }

    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owner == Some(player)
    }

    pub fn defenders(&self) -> usize {
        self.units.len()
    }

    /// Clears ownership and returns the units that were stationed here.
    pub fn release(&mut self) -> BTreeSet<UnitId> {
        self.owner = None;
        std::mem::take(&mut self.units)
    }
}
