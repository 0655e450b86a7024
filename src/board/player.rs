//! Factions: identity, adopted race, coins and the unit pool.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::race::Race;
use super::unit::{UnitId, UnitIds, UnitState};
use crate::error::GameError;

/// Seat identifier of a faction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// One seat in the game.
///
/// Once a race is adopted, `available` and `tired` are disjoint and together
/// hold exactly `race.unit_allotment()` units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// Display name, for logs and statistics.
    pub nickname: String,
    /// None until the first race is adopted.
    pub race: Option<Race>,
    /// Coins accrued so far; the game is won on this.
    pub coins: i64,
    available: BTreeSet<UnitId>,
    tired: BTreeSet<UnitId>,
}

impl Player {
    /// Creates a raceless player with no coins and no units.
    pub fn new(id: PlayerId, nickname: impl Into<String>) -> Self {
        Player {
            id,
            nickname: nickname.into(),
            race: None,
            coins: 0,
            available: BTreeSet::new(),
            tired: BTreeSet::new(),
        }
    }

    pub fn units_by_state(&self, state: UnitState) -> &BTreeSet<UnitId> {
        match state {
            UnitState::Available => &self.available,
            UnitState::Tired => &self.tired,
        }
    }

    /// Readiness of one of this player's units, or None if it is not theirs.
    pub fn unit_state(&self, unit: UnitId) -> Option<UnitState> {
        if self.available.contains(&unit) {
            Some(UnitState::Available)
        } else if self.tired.contains(&unit) {
            Some(UnitState::Tired)
        } else {
            None
        }
    }

    pub fn unit_count(&self) -> usize {
        self.available.len() + self.tired.len()
    }

    /// Adopts `race` from `pool`, minting a fresh set of available units.
    ///
    /// The previous race, if any, goes back to the pool and is returned.
    /// Fails without side effects if `race` is not in the pool.
    pub fn adopt_race(
        &mut self,
        race: Race,
        pool: &mut Vec<Race>,
        ids: &mut UnitIds,
    ) -> Result<Option<Race>, GameError> {
        let idx = pool
            .iter()
            .position(|&r| r == race)
            .ok_or(GameError::InvalidRace(race))?;
        pool.remove(idx);
        let previous = self.race.replace(race);
        if let Some(prev) = previous {
            pool.push(prev);
        }
        self.available.clear();
        self.tired.clear();
        for _ in 0..race.unit_allotment() {
            self.available.insert(ids.mint());
        }
        Ok(previous)
    }

    /// Moves an available unit to the tired set. Returns false if it was not available.
    pub fn tire(&mut self, unit: UnitId) -> bool {
        if self.available.remove(&unit) {
            self.tired.insert(unit);
            true
        } else {
            false
        }
    }

    /// Makes every tired unit available again.
    pub fn refresh(&mut self) {
        self.available.append(&mut self.tired);
    }
}
