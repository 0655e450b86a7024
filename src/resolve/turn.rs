//! The per-turn decision sequence.
//!
//! Each player's turn runs: decline (only while races remain in the pool),
//! change race, a capture loop, distribution, then automatic coin accrual and
//! garrison deactivation. After the last player the round counter advances;
//! past `max_rounds` the game is over.
//!
//! Every decision is checked against the turn cursor before anything else, so
//! a rejected decision leaves the state exactly as it was.

use tracing::trace;

use super::capture::{resolve_catch, CatchOutcome};
use super::coins::accrue_coins;
use super::distribution::apply_distribution;
use crate::board::{Decision, GameState, PlayerId, Position, Step, UnitState};
use crate::error::{DecisionFault, GameError};

/// What one applied decision did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Result of a catch-cell attempt.
    pub outcome: Option<CatchOutcome>,
    /// Cells released by a decline or a distribution.
    pub released: Vec<Position>,
    /// Coins accrued when the decision ended the turn.
    pub coins: Option<i64>,
}

/// Applies `decision` by `player` to `state` in place.
pub fn apply(state: &mut GameState, player: PlayerId, decision: &Decision) -> Result<StepReport, GameError> {
    if state.is_over() {
        return Err(DecisionFault::GameOver.into());
    }
    let idx = state.player_index(player)?;
    if idx != state.turn.player {
        return Err(DecisionFault::NotToMove(player).into());
    }

    let mut report = StepReport::default();
    match (state.turn.step, decision) {
        (Step::Decline, Decision::Decline(true)) => {
            report.released = decline(state, idx);
            state.turn.step = Step::ChangeRace;
        }
        (Step::Decline, Decision::Decline(false)) => {
            state.turn.step = Step::CatchCell;
        }
        (Step::ChangeRace, Decision::ChangeRace(race)) => {
            let GameState { players, race_pool, unit_ids, .. } = state;
            let previous = players[idx].adopt_race(*race, race_pool, unit_ids)?;
            trace!(player = %player, race = %race, ?previous, "race adopted");
            state.recompute_achievable(idx);
            state.turn.step = Step::CatchCell;
        }
        (Step::CatchCell, Decision::CatchCell(Some(catch))) => {
            let outcome = resolve_catch(state, idx, catch)?;
            if let CatchOutcome::Captured(event) = &outcome {
                trace!(player = %player, position = %event.position, "cell captured");
            }
            report.outcome = Some(outcome);
        }
        (Step::CatchCell, Decision::CatchCell(None)) => {
            state.turn.step = Step::Distribution;
        }
        (Step::Distribution, Decision::Distribution(distribution)) => {
            report.released = apply_distribution(state, idx, distribution)?;
            report.coins = Some(end_turn(state, idx));
        }
        (step, decision) => {
            return Err(DecisionFault::WrongStep {
                expected: step.name(),
                got: decision.kind(),
            }
            .into());
        }
    }
    Ok(report)
}

/// Pure form of [`apply`]: returns the successor state, leaving `state` as is.
pub fn apply_decision(state: &GameState, player: PlayerId, decision: &Decision) -> Result<GameState, GameError> {
    let mut next = state.clone();
    apply(&mut next, player, decision)?;
    Ok(next)
}

/// Abandons every owned cell of player `idx`. Feudal claims stay.
fn decline(state: &mut GameState, idx: usize) -> Vec<Position> {
    let owned = std::mem::take(&mut state.regions[idx].owned);
    for &p in &owned {
        if let Some(cell) = state.board.cell_at_mut(p) {
            cell.release();
        }
    }
    state.recompute_achievable(idx);
    owned.into_iter().collect()
}

/// Accrues coins, tires stationed units and hands the turn on. Returns the
/// coins earned.
fn end_turn(state: &mut GameState, idx: usize) -> i64 {
    let coins = accrue_coins(state, idx);
    state.players[idx].coins += coins;

    let stationed: Vec<_> = state.regions[idx]
        .owned
        .iter()
        .filter_map(|&p| state.board.cell_at(p))
        .flat_map(|c| c.units.iter().copied())
        .collect();
    let player = &mut state.players[idx];
    for u in stationed {
        if player.unit_state(u) == Some(UnitState::Available) {
            player.tire(u);
        }
    }

    let next = idx + 1;
    if next < state.players.len() {
        state.begin_turn(next);
    } else {
        state.round += 1;
        if state.round > state.max_rounds {
            state.caught.clear();
            state.turn.step = Step::GameOver;
        } else {
            state.begin_turn(0);
        }
    }
    coins
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use crate::board::{Board, Catch, Player, Race, UnitId};
    use crate::rules::GameFeatures;

    fn new_game(max_rounds: u32) -> GameState {
        let board = Board::from_rows(&["LLL", "LLL", "LLL"]).unwrap();
        let players = vec![Player::new(PlayerId(1), "a"), Player::new(PlayerId(2), "b")];
        GameState::new(board, players, Arc::new(GameFeatures::empty()), max_rounds).unwrap()
    }

    fn play(state: &mut GameState, id: u32, decision: Decision) -> StepReport {
        apply(state, PlayerId(id), &decision).unwrap()
    }

    fn units(ids: &[u64]) -> Vec<UnitId> {
        ids.iter().map(|&i| UnitId(i)).collect()
    }

    /// Round 1: P1 takes the land corner (0,0) as Elf and garrisons it,
    /// P2 picks Gnome and passes.
    fn after_first_round(max_rounds: u32) -> GameState {
        let mut state = new_game(max_rounds);
        play(&mut state, 1, Decision::ChangeRace(Race::Elf));
        let corner = Position::new(0, 0);
        play(&mut state, 1, Decision::CatchCell(Some(Catch::new(corner, units(&[0, 1, 2])))));
        play(&mut state, 1, Decision::CatchCell(None));
        let report = play(
            &mut state,
            1,
            Decision::Distribution(BTreeMap::from([(corner, units(&[2, 3]))])),
        );
        assert_eq!(report.coins, Some(1));

        play(&mut state, 2, Decision::ChangeRace(Race::Gnome));
        play(&mut state, 2, Decision::CatchCell(None));
        play(&mut state, 2, Decision::Distribution(BTreeMap::new()));
        state
    }

    #[test]
    fn raceless_player_must_pick_a_race_first() {
        let mut state = new_game(3);
        assert_eq!(state.step(), Step::ChangeRace);
        play(&mut state, 1, Decision::ChangeRace(Race::Orc));
        assert_eq!(state.step(), Step::CatchCell);
        assert!(!state.race_pool.contains(&Race::Orc));
        assert_eq!(state.players[0].unit_count(), 7);
    }

    #[test]
    fn out_of_turn_and_wrong_step_are_rejected() {
        let mut state = new_game(3);
        let before = state.clone();
        assert_eq!(
            apply(&mut state, PlayerId(2), &Decision::ChangeRace(Race::Elf)).unwrap_err(),
            GameError::InvalidDecision(DecisionFault::NotToMove(PlayerId(2)))
        );
        assert_eq!(
            apply(&mut state, PlayerId(1), &Decision::CatchCell(None)).unwrap_err(),
            GameError::InvalidDecision(DecisionFault::WrongStep {
                expected: "change-race",
                got: "catch-cell",
            })
        );
        assert_eq!(
            apply(&mut state, PlayerId(9), &Decision::CatchCell(None)).unwrap_err(),
            GameError::PlayerNotFound(PlayerId(9))
        );
        assert_eq!(state, before);
    }

    #[test]
    fn full_round_hands_the_turn_on() {
        let state = after_first_round(3);
        assert_eq!(state.round, 2);
        assert_eq!(state.turn.player, 0);
        // Races remain in the pool, so a seated player is offered a decline.
        assert_eq!(state.step(), Step::Decline);
        assert_eq!(state.players[0].coins, 1);
        assert_eq!(state.players[1].coins, 0);
        assert!(state.invariant_violations().is_empty());
    }

    #[test]
    fn garrison_is_tired_at_turn_end_and_refreshed_next_turn() {
        let mut state = new_game(3);
        play(&mut state, 1, Decision::ChangeRace(Race::Elf));
        let corner = Position::new(0, 0);
        play(&mut state, 1, Decision::CatchCell(Some(Catch::new(corner, units(&[0, 1, 2])))));
        play(&mut state, 1, Decision::CatchCell(None));
        play(&mut state, 1, Decision::Distribution(BTreeMap::from([(corner, units(&[3]))])));

        let p1 = &state.players[0];
        assert_eq!(p1.unit_state(UnitId(3)), Some(UnitState::Tired));
        // Unit 2 was not redeployed and stays available.
        assert_eq!(p1.unit_state(UnitId(2)), Some(UnitState::Available));

        play(&mut state, 2, Decision::ChangeRace(Race::Gnome));
        play(&mut state, 2, Decision::CatchCell(None));
        play(&mut state, 2, Decision::Distribution(BTreeMap::new()));
        assert!(state.players[0].units_by_state(UnitState::Tired).is_empty());
    }

    #[test]
    fn game_ends_after_max_rounds() {
        let mut state = after_first_round(2);
        let corner = Position::new(0, 0);
        play(&mut state, 1, Decision::Decline(false));
        play(&mut state, 1, Decision::CatchCell(None));
        play(&mut state, 1, Decision::Distribution(BTreeMap::from([(corner, units(&[2]))])));
        play(&mut state, 2, Decision::Decline(false));
        play(&mut state, 2, Decision::CatchCell(None));
        play(&mut state, 2, Decision::Distribution(BTreeMap::new()));

        assert!(state.is_over());
        assert_eq!(state.player_to_move(), None);
        assert_eq!(state.winners(), vec![PlayerId(1)]);
        assert_eq!(state.players[0].coins, 2);
        assert_eq!(
            apply(&mut state, PlayerId(1), &Decision::Decline(false)).unwrap_err(),
            GameError::InvalidDecision(DecisionFault::GameOver)
        );
    }

    #[test]
    fn decline_abandons_cells_but_keeps_feudal() {
        let mut state = after_first_round(3);
        let corner = Position::new(0, 0);
        let report = play(&mut state, 1, Decision::Decline(true));
        assert_eq!(report.released, vec![corner]);
        assert_eq!(state.step(), Step::ChangeRace);

        let cell = state.board.cell_at(corner).unwrap();
        assert_eq!(cell.owner, None);
        assert!(cell.units.is_empty());
        assert_eq!(cell.feudal, Some(PlayerId(1)));
        assert_eq!(cell.race, Some(Race::Elf));
        assert!(state.regions[0].owned.is_empty());

        // Elf goes back to the pool once a new race is adopted.
        play(&mut state, 1, Decision::ChangeRace(Race::Amphibian));
        assert_eq!(state.race_pool.last(), Some(&Race::Elf));
        play(&mut state, 1, Decision::CatchCell(None));
        let report = play(&mut state, 1, Decision::Distribution(BTreeMap::new()));
        // The abandoned corner still pays.
        assert_eq!(report.coins, Some(1));
        assert!(state.invariant_violations().is_empty());
    }

    #[test]
    fn apply_decision_leaves_the_input_untouched() {
        let state = new_game(3);
        let before = state.clone();
        let next = apply_decision(&state, PlayerId(1), &Decision::ChangeRace(Race::Mage)).unwrap();
        assert_eq!(state, before);
        assert_eq!(next.players[0].race, Some(Race::Mage));
        assert!(apply_decision(&state, PlayerId(1), &Decision::ChangeRace(Race::Mage)).is_ok());
    }

    #[test]
    fn failed_capture_is_reported_not_raised() {
        let mut state = new_game(3);
        play(&mut state, 1, Decision::ChangeRace(Race::Elf));
        let before = state.clone();
        let report = play(
            &mut state,
            1,
            Decision::CatchCell(Some(Catch::new(Position::new(1, 0), units(&[0])))),
        );
        assert_eq!(report.outcome, Some(CatchOutcome::Failed));
        assert_eq!(state, before);
    }
}
