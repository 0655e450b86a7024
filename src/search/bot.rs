//! A `DecisionProvider` backed by the decision-tree search.
//!
//! A capture plan spans several catch-cell questions, so the bot keeps the
//! rest of its plan and replays it until the loop closes.

use std::collections::{BTreeMap, VecDeque};

use super::minimax::{search, SearchConfig};
use crate::board::{Catch, Decision, GameState, PlayerId, Position, Race, UnitId};
use crate::engine::DecisionProvider;

#[derive(Debug, Clone, Default)]
pub struct TreeSearchBot {
    /// Search run for each new plan.
    pub config: SearchConfig,
    pending: VecDeque<Decision>,
    /// Seat and round the pending plan was made for.
    pending_for: Option<(PlayerId, u32)>,
    /// Nodes expanded over the bot's lifetime.
    pub nodes: u64,
}

impl TreeSearchBot {
    pub fn new(config: SearchConfig) -> Self {
        TreeSearchBot {
            config,
            ..TreeSearchBot::default()
        }
    }

    /// Next decision of a fresh or cached plan.
    fn next_decision(&mut self, player: PlayerId, state: &GameState) -> Option<Decision> {
        if self.pending_for != Some((player, state.round)) {
            self.pending.clear();
        }
        if self.pending.is_empty() {
            let result = search(state, player, &self.config);
            self.nodes += result.nodes;
            self.pending = result.decisions.into();
            self.pending_for = Some((player, state.round));
        }
        self.pending.pop_front()
    }
}

impl DecisionProvider for TreeSearchBot {
    fn decide_decline(&mut self, player: PlayerId, state: &GameState) -> bool {
        self.pending.clear();
        matches!(self.next_decision(player, state), Some(Decision::Decline(true)))
    }

    fn decide_race(&mut self, player: PlayerId, state: &GameState) -> Race {
        self.pending.clear();
        match self.next_decision(player, state) {
            Some(Decision::ChangeRace(race)) => race,
            _ => state.race_pool.first().copied().unwrap_or(Race::Amphibian),
        }
    }

    fn decide_catch_cell(&mut self, player: PlayerId, state: &GameState) -> Option<Catch> {
        match self.next_decision(player, state) {
            Some(Decision::CatchCell(catch)) => catch,
            _ => {
                self.pending.clear();
                None
            }
        }
    }

    fn decide_distribution(
        &mut self,
        player: PlayerId,
        state: &GameState,
    ) -> BTreeMap<Position, Vec<UnitId>> {
        self.pending.clear();
        match self.next_decision(player, state) {
            Some(Decision::Distribution(d)) => d,
            _ => BTreeMap::new(),
        }
    }
}
