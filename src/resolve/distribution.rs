//! Distribution-phase resolution: placing defense garrisons.
//!
//! Every owned cell loses its garrison and receives exactly the units the
//! decision names. Cells captured this turn revert to unowned unless they
//! are garrisoned again, as do older bare cells cut off from every garrison.
//! The rest become feudal to the mover, completing any pending conquest.

use std::collections::BTreeSet;

use crate::board::{Distribution, GameState, Position, UnitState};
use crate::error::{DecisionFault, GameError};

fn validate(state: &GameState, idx: usize, distribution: &Distribution) -> Result<(), GameError> {
    let player = &state.players[idx];
    let mut seen = BTreeSet::new();
    for (&pos, units) in distribution {
        let cell = state.board.cell_at(pos).ok_or(DecisionFault::NoSuchCell(pos))?;
        if !cell.is_owned_by(player.id) {
            return Err(DecisionFault::NotOwned(pos).into());
        }
        for &u in units {
            if !seen.insert(u) {
                return Err(DecisionFault::DuplicateUnit(u).into());
            }
            if player.unit_state(u) != Some(UnitState::Available) {
                return Err(DecisionFault::UnitUnavailable(u).into());
            }
        }
    }
    Ok(())
}

/// Releases cells of player `idx` captured this turn that hold no defenders.
fn release_bare_transit(state: &mut GameState, idx: usize) -> Vec<Position> {
    let bare: Vec<Position> = state.regions[idx]
        .transit
        .iter()
        .copied()
        .filter(|p| state.regions[idx].owned.contains(p))
        .filter(|&p| state.board.cell_at(p).is_some_and(|c| c.units.is_empty()))
        .collect();
    for p in &bare {
        if let Some(cell) = state.board.cell_at_mut(*p) {
            cell.release();
        }
        state.regions[idx].owned.remove(p);
    }
    bare
}

/// Applies a distribution for player `idx`. Returns the released cells, sorted.
pub fn apply_distribution(
    state: &mut GameState,
    idx: usize,
    distribution: &Distribution,
) -> Result<Vec<Position>, GameError> {
    validate(state, idx, distribution)?;

    let player_id = state.players[idx].id;
    let owned: Vec<Position> = state.regions[idx].owned.iter().copied().collect();
    for &p in &owned {
        if let Some(cell) = state.board.cell_at_mut(p) {
            cell.units.clear();
        }
    }
    for (&p, units) in distribution {
        if let Some(cell) = state.board.cell_at_mut(p) {
            cell.units.extend(units.iter().copied());
        }
    }

    let mut released = release_bare_transit(state, idx);
    released.extend(state.release_unsupplied(idx));
    released.sort_unstable();

    let kept: Vec<Position> = state.regions[idx].owned.iter().copied().collect();
    for p in kept {
        let previous = state.board.cell_at(p).and_then(|c| c.feudal);
        if previous == Some(player_id) {
            continue;
        }
        if let Some(prev) = previous {
            let prev_idx = state.player_index(prev)?;
            state.regions[prev_idx].feudal.remove(&p);
        }
        if let Some(cell) = state.board.cell_at_mut(p) {
            cell.feudal = Some(player_id);
        }
        state.regions[idx].feudal.insert(p);
    }

    state.recompute_achievable(idx);
    Ok(released)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::board::{Board, Catch, Player, PlayerId, Race, UnitId};
    use crate::resolve::capture::resolve_catch;
    use crate::rules::GameFeatures;

    /// P1 (Orc, units 0..7) has taken (0,0), (1,0) and (2,0) bare, leaving
    /// unit 6 as its only available unit.
    fn setup() -> GameState {
        let board = Board::from_rows(&["LLLL", "LLLL", "LLLL"]).unwrap();
        let players = vec![Player::new(PlayerId(1), "a"), Player::new(PlayerId(2), "b")];
        let mut state = GameState::new(board, players, Arc::new(GameFeatures::empty()), 5).unwrap();
        state.players[0]
            .adopt_race(Race::Orc, &mut state.race_pool, &mut state.unit_ids)
            .unwrap();
        state.players[1]
            .adopt_race(Race::Elf, &mut state.race_pool, &mut state.unit_ids)
            .unwrap();
        for (x, ids) in [(0, [0, 1]), (1, [2, 3]), (2, [4, 5])] {
            let units = ids.iter().map(|&i| UnitId(i)).collect();
            resolve_catch(&mut state, 0, &Catch::new(Position::new(x, 0), units)).unwrap();
        }
        state
    }

    /// Marks the captured row as held since an earlier turn.
    fn settle(state: &mut GameState) {
        state.regions[0].transit.clear();
    }

    #[test]
    fn garrisons_are_replaced_and_feudal_assigned() {
        let mut state = setup();
        settle(&mut state);
        let mut dist = Distribution::new();
        dist.insert(Position::new(0, 0), vec![UnitId(6)]);
        let released = apply_distribution(&mut state, 0, &dist).unwrap();

        // (1,0) and (2,0) hang off the garrisoned (0,0).
        assert!(released.is_empty());
        assert_eq!(state.regions[0].owned.len(), 3);
        assert_eq!(state.regions[0].feudal.len(), 3);
        let cell = state.board.cell_at(Position::new(0, 0)).unwrap();
        assert_eq!(cell.units.iter().copied().collect::<Vec<_>>(), vec![UnitId(6)]);
        assert_eq!(cell.feudal, Some(PlayerId(1)));
        assert!(state.invariant_violations().is_empty());
    }

    #[test]
    fn fresh_captures_must_be_garrisoned_to_hold() {
        let mut state = setup();
        assert_eq!(state.regions[0].transit.len(), 3);
        let mut dist = Distribution::new();
        dist.insert(Position::new(0, 0), vec![UnitId(6)]);
        let released = apply_distribution(&mut state, 0, &dist).unwrap();

        // Touching the garrison does not save a cell taken this turn.
        assert_eq!(released, vec![Position::new(1, 0), Position::new(2, 0)]);
        assert_eq!(state.regions[0].owned, BTreeSet::from([Position::new(0, 0)]));
        assert_eq!(state.regions[0].feudal, BTreeSet::from([Position::new(0, 0)]));
        assert_eq!(state.board.cell_at(Position::new(1, 0)).unwrap().owner, None);
        assert!(state.invariant_violations().is_empty());
    }

    #[test]
    fn empty_distribution_releases_everything() {
        let mut state = setup();
        let released = apply_distribution(&mut state, 0, &Distribution::new()).unwrap();
        assert_eq!(released, vec![Position::new(0, 0), Position::new(1, 0), Position::new(2, 0)]);
        assert!(state.regions[0].owned.is_empty());
        assert!(state.regions[0].feudal.is_empty());
        assert!(state.invariant_violations().is_empty());
    }

    #[test]
    fn disconnected_bare_cell_is_released() {
        let mut state = setup();
        settle(&mut state);
        // Own a far corner by hand, bare and not adjacent to any garrison.
        state.regions[0].owned.insert(Position::new(3, 2));
        state.board.cell_at_mut(Position::new(3, 2)).unwrap().owner = Some(PlayerId(1));

        let mut dist = Distribution::new();
        dist.insert(Position::new(0, 0), vec![UnitId(6)]);
        let released = apply_distribution(&mut state, 0, &dist).unwrap();
        assert_eq!(released, vec![Position::new(3, 2)]);
        assert!(!state.regions[0].feudal.contains(&Position::new(3, 2)));
    }

    #[test]
    fn feudal_moves_from_the_previous_collector() {
        let mut state = setup();
        settle(&mut state);
        let p = Position::new(1, 0);
        state.board.cell_at_mut(p).unwrap().feudal = Some(PlayerId(2));
        state.regions[1].feudal.insert(p);

        let mut dist = Distribution::new();
        dist.insert(p, vec![UnitId(6)]);
        apply_distribution(&mut state, 0, &dist).unwrap();
        assert!(state.regions[1].feudal.is_empty());
        assert!(state.regions[0].feudal.contains(&p));
        assert!(state.invariant_violations().is_empty());
    }

    #[test]
    fn invalid_distributions_leave_state_untouched() {
        let mut state = setup();
        let before = state.clone();

        let mut not_owned = Distribution::new();
        not_owned.insert(Position::new(3, 2), vec![UnitId(6)]);
        assert_eq!(
            apply_distribution(&mut state, 0, &not_owned).unwrap_err(),
            GameError::InvalidDecision(DecisionFault::NotOwned(Position::new(3, 2)))
        );

        let mut tired = Distribution::new();
        tired.insert(Position::new(0, 0), vec![UnitId(0)]);
        assert_eq!(
            apply_distribution(&mut state, 0, &tired).unwrap_err(),
            GameError::InvalidDecision(DecisionFault::UnitUnavailable(UnitId(0)))
        );

        let mut dup = Distribution::new();
        dup.insert(Position::new(0, 0), vec![UnitId(6)]);
        dup.insert(Position::new(1, 0), vec![UnitId(6)]);
        assert_eq!(
            apply_distribution(&mut state, 0, &dup).unwrap_err(),
            GameError::InvalidDecision(DecisionFault::DuplicateUnit(UnitId(6)))
        );

        assert_eq!(state, before);
    }
}
