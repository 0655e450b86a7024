//! Decision-provider facade.
//!
//! The engine asks a `DecisionProvider` one question per pending step and
//! wraps the answer in a `Decision`. Bots and any external transport
//! implement the trait; the game loop never needs to know which it talks to.

use std::collections::BTreeMap;

use crate::board::{Catch, Decision, GameState, PlayerId, Position, Race, Step, UnitId};
use crate::error::{DecisionFault, GameError};

/// Something that answers the engine's questions for one seat.
pub trait DecisionProvider {
    fn decide_decline(&mut self, player: PlayerId, state: &GameState) -> bool;

    fn decide_race(&mut self, player: PlayerId, state: &GameState) -> Race;

    /// `None` ends the capture loop.
    fn decide_catch_cell(&mut self, player: PlayerId, state: &GameState) -> Option<Catch>;

    fn decide_distribution(
        &mut self,
        player: PlayerId,
        state: &GameState,
    ) -> BTreeMap<Position, Vec<UnitId>>;
}

/// Asks `provider` for the decision the pending step of `state` needs.
pub fn request_decision<P: DecisionProvider + ?Sized>(
    provider: &mut P,
    player: PlayerId,
    state: &GameState,
) -> Result<Decision, GameError> {
    Ok(match state.step() {
        Step::Decline => Decision::Decline(provider.decide_decline(player, state)),
        Step::ChangeRace => Decision::ChangeRace(provider.decide_race(player, state)),
        Step::CatchCell => Decision::CatchCell(provider.decide_catch_cell(player, state)),
        Step::Distribution => Decision::Distribution(provider.decide_distribution(player, state)),
        Step::GameOver => return Err(DecisionFault::GameOver.into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::board::{Board, Player};
    use crate::resolve::apply;
    use crate::rules::GameFeatures;

    /// Always declines, picks the last pooled race and never captures.
    struct Passive;

    impl DecisionProvider for Passive {
        fn decide_decline(&mut self, _: PlayerId, _: &GameState) -> bool {
            true
        }

        fn decide_race(&mut self, _: PlayerId, state: &GameState) -> Race {
            *state.race_pool.last().unwrap()
        }

        fn decide_catch_cell(&mut self, _: PlayerId, _: &GameState) -> Option<Catch> {
            None
        }

        fn decide_distribution(&mut self, _: PlayerId, _: &GameState) -> BTreeMap<Position, Vec<UnitId>> {
            BTreeMap::new()
        }
    }

    #[test]
    fn dispatches_on_the_pending_step() {
        let board = Board::from_rows(&["LL", "LL"]).unwrap();
        let players = vec![Player::new(PlayerId(1), "a"), Player::new(PlayerId(2), "b")];
        let mut state = GameState::new(board, players, Arc::new(GameFeatures::empty()), 1).unwrap();
        let mut bot = Passive;

        let mut kinds = Vec::new();
        while let Some(player) = state.player_to_move() {
            let decision = request_decision(&mut bot, player, &state).unwrap();
            kinds.push(decision.kind());
            apply(&mut state, player, &decision).unwrap();
        }
        assert_eq!(
            kinds,
            ["change-race", "catch-cell", "distribution"].repeat(2)
        );
        assert_eq!(
            request_decision(&mut bot, PlayerId(1), &state).unwrap_err(),
            GameError::InvalidDecision(DecisionFault::GameOver)
        );
    }

    #[test]
    fn works_through_a_trait_object() {
        let board = Board::from_rows(&["LL", "LL"]).unwrap();
        let players = vec![Player::new(PlayerId(1), "a"), Player::new(PlayerId(2), "b")];
        let state = GameState::new(board, players, Arc::new(GameFeatures::empty()), 1).unwrap();
        let mut boxed: Box<dyn DecisionProvider> = Box::new(Passive);
        let decision = request_decision(boxed.as_mut(), PlayerId(1), &state).unwrap();
        assert_eq!(decision, Decision::ChangeRace(Race::Mage));
    }
}
