//! Catch-cell resolution: entries into owned cells and captures.
//!
//! A catch is validated completely before anything is touched. A failed
//! capture is not an error: it leaves the state unchanged and reports
//! `CatchOutcome::Failed`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::board::{Catch, GameState, PlayerId, Position, Race, TerrainType, UnitId, UnitState};
use crate::error::{DecisionFault, GameError};

/// Arithmetic of one capture attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureCost {
    /// Units needed without bonus.
    pub required: i32,
    /// Support from adjacent owned cells.
    pub bonus: i32,
    /// The race may never take this terrain.
    pub impossible: bool,
}

impl CaptureCost {
    pub fn succeeds_with(&self, sent: usize) -> bool {
        !self.impossible && sent as i32 + self.bonus >= self.required
    }

    /// Sent units spent by a successful capture. Never negative.
    pub fn consumed(&self) -> usize {
        (self.required - self.bonus).max(0) as usize
    }
}

/// A completed capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureEvent {
    pub position: Position,
    pub terrain: TerrainType,
    /// Race the capturer held.
    pub race: Race,
    /// Owner the cell was taken from, if any.
    pub previous_owner: Option<PlayerId>,
    /// Cells the previous owner lost because they were cut off.
    pub released: Vec<Position>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatchOutcome {
    /// Units marched through an owned cell.
    Entered,
    Captured(CaptureEvent),
    /// Not enough strength; nothing changed.
    Failed,
}

/// Cost for player `idx` (holding `race`) to capture the cell at `pos`.
///
/// Returns None for positions off the board.
pub fn capture_cost(state: &GameState, idx: usize, race: Race, pos: Position) -> Option<CaptureCost> {
    let cell = state.board.cell_at(pos)?;
    let features = &state.features;
    let terrain = cell.terrain;

    let mut required = terrain.capture_difficulty() + features.catch_modifier(race, terrain);
    if let Some(owner) = cell.owner {
        if owner != state.players[idx].id {
            required += cell.defenders() as i32;
            if let Some(owner_race) = cell.race {
                required += features.defense_modifier(owner_race, terrain);
            }
        }
    }

    let owned = &state.regions[idx].owned;
    let bonus: i32 = state
        .board
        .neighbors(pos)
        .iter()
        .filter(|q| owned.contains(q))
        .filter_map(|q| state.board.cell_at(*q))
        .map(|c| features.support(race, c.terrain))
        .sum();

    Some(CaptureCost {
        required,
        bonus,
        impossible: features.catch_impossible(race, terrain),
    })
}

/// Checks that `units` is non-empty, duplicate-free and available to player `idx`.
pub(crate) fn validate_units(state: &GameState, idx: usize, units: &[UnitId]) -> Result<(), GameError> {
    if units.is_empty() {
        return Err(DecisionFault::NoUnits.into());
    }
    let player = &state.players[idx];
    let mut seen = BTreeSet::new();
    for &u in units {
        if !seen.insert(u) {
            return Err(DecisionFault::DuplicateUnit(u).into());
        }
        if player.unit_state(u) != Some(UnitState::Available) {
            return Err(DecisionFault::UnitUnavailable(u).into());
        }
    }
    Ok(())
}

/// Removes `units` from whatever owned cell of player `idx` they stand in.
pub(crate) fn unstation(state: &mut GameState, idx: usize, units: &[UnitId]) {
    let owned: Vec<Position> = state.regions[idx].owned.iter().copied().collect();
    for p in owned {
        if let Some(cell) = state.board.cell_at_mut(p) {
            for u in units {
                cell.units.remove(u);
            }
        }
    }
}

/// Resolves one catch-cell decision for player `idx`.
pub fn resolve_catch(state: &mut GameState, idx: usize, catch: &Catch) -> Result<CatchOutcome, GameError> {
    let player_id = state.players[idx].id;
    let race = state.players[idx].race.ok_or(DecisionFault::WrongStep {
        expected: "change-race",
        got: "catch-cell",
    })?;
    let pos = catch.position;
    let cell = state.board.cell_at(pos).ok_or(DecisionFault::NoSuchCell(pos))?;
    if state.caught.contains(&pos) {
        return Err(DecisionFault::AlreadyCaught(pos).into());
    }
    let is_entry = cell.is_owned_by(player_id);
    if !is_entry && !state.regions[idx].achievable.contains(&pos) {
        return Err(DecisionFault::Unreachable(pos).into());
    }
    let terrain = cell.terrain;
    validate_units(state, idx, &catch.units)?;

    if is_entry {
        if (catch.units.len() as i32) < terrain.capture_difficulty() {
            return Ok(CatchOutcome::Failed);
        }
        unstation(state, idx, &catch.units);
        for &u in &catch.units {
            state.players[idx].tire(u);
        }
        state.caught.insert(pos);
        return Ok(CatchOutcome::Entered);
    }

    let cost = capture_cost(state, idx, race, pos).ok_or(DecisionFault::NoSuchCell(pos))?;
    if !cost.succeeds_with(catch.units.len()) {
        return Ok(CatchOutcome::Failed);
    }

    let mut sent = catch.units.clone();
    sent.sort_unstable();
    let consumed = cost.consumed().min(sent.len());
    let (spent, garrison) = sent.split_at(consumed);

    unstation(state, idx, &sent);
    for &u in spent {
        state.players[idx].tire(u);
    }

    let previous_owner = state.board.cell_at(pos).and_then(|c| c.owner);
    if let Some(cell) = state.board.cell_at_mut(pos) {
        // Defenders of the previous owner leave the cell in their current state.
        cell.release();
        cell.owner = Some(player_id);
        cell.units = garrison.iter().copied().collect();
        cell.race = Some(race);
    }

    let regions = &mut state.regions[idx];
    regions.owned.insert(pos);
    regions.transit.push(pos);
    regions.achievable.remove(&pos);
    for &q in state.board.neighbors(pos) {
        if !regions.owned.contains(&q) {
            regions.achievable.insert(q);
        }
    }
    state.caught.insert(pos);

    let mut released = Vec::new();
    if let Some(prev) = previous_owner {
        let prev_idx = state.player_index(prev)?;
        state.regions[prev_idx].owned.remove(&pos);
        released = state.release_unsupplied(prev_idx);
        state.recompute_achievable(prev_idx);
    }

    Ok(CatchOutcome::Captured(CaptureEvent {
        position: pos,
        terrain,
        race,
        previous_owner,
        released,
    }))
}
