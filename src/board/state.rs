//! Game state representation.
//!
//! `GameState` is the aggregate root: the board, the race pool, every player
//! with their region bookkeeping, and the turn cursor saying who must decide
//! what next. Everything is owned data, so `clone()` yields a fully
//! independent snapshot; only the immutable feature table is shared.

use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::grid::Board;
use super::player::{Player, PlayerId};
use super::position::Position;
use super::race::{Race, ALL_RACES};
use super::unit::{UnitIds, UnitState};
use crate::error::GameError;
use crate::rules::GameFeatures;

/// The decision the engine is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    Decline,
    ChangeRace,
    CatchCell,
    Distribution,
    GameOver,
}

impl Step {
    pub const fn name(self) -> &'static str {
        match self {
            Step::Decline => "decline",
            Step::ChangeRace => "change-race",
            Step::CatchCell => "catch-cell",
            Step::Distribution => "distribution",
            Step::GameOver => "game-over",
        }
    }
}

/// Turn cursor: index of the player to move and the pending step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Index into `GameState::players`.
    pub player: usize,
    /// What the player must decide next.
    pub step: Step,
}

/// Per-player cell bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Regions {
    /// Cells the player occupies.
    pub owned: BTreeSet<Position>,
    /// Cells paying coins to the player.
    pub feudal: BTreeSet<Position>,
    /// Cells the player may attempt to capture next.
    pub achievable: BTreeSet<Position>,
    /// Cells captured this turn, in order. They are lost at distribution
    /// unless garrisoned.
    pub transit: Vec<Position>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub board: Board,
    /// Current round, starting at 1.
    pub round: u32,
    /// Last round played; the game ends once `round` passes it.
    pub max_rounds: u32,
    /// Races nobody holds, in the order they became free.
    pub race_pool: Vec<Race>,
    /// In seating order.
    pub players: Vec<Player>,
    /// Parallel to `players`.
    pub regions: Vec<Regions>,
    /// Race and terrain modifiers, shared by every clone.
    pub features: Arc<GameFeatures>,
    /// Source of fresh unit ids.
    pub unit_ids: UnitIds,
    pub turn: Turn,
    /// Cells the player to move captured or entered this turn.
    pub caught: BTreeSet<Position>,
}

impl GameState {
    /// Seats `players` on `board` with every race in the pool.
    ///
    /// Players start raceless, so the first decision of each is a race pick.
    /// At most one player per race can be seated.
    pub fn new(
        board: Board,
        players: Vec<Player>,
        features: Arc<GameFeatures>,
        max_rounds: u32,
    ) -> Result<Self, GameError> {
        let ids: BTreeSet<PlayerId> = players.iter().map(|p| p.id).collect();
        if players.len() < 2 || players.len() > ALL_RACES.len() || ids.len() != players.len() {
            return Err(GameError::PlayerCount(players.len()));
        }
        let regions = vec![Regions::default(); players.len()];
        let mut state = GameState {
            board,
            round: 1,
            max_rounds,
            race_pool: ALL_RACES.to_vec(),
            players,
            regions,
            features,
            unit_ids: UnitIds::new(),
            turn: Turn { player: 0, step: Step::GameOver },
            caught: BTreeSet::new(),
        };
        if max_rounds > 0 {
            state.begin_turn(0);
        }
        Ok(state)
    }

    pub fn player_index(&self, id: PlayerId) -> Result<usize, GameError> {
        self.players
            .iter()
            .position(|p| p.id == id)
            .ok_or(GameError::PlayerNotFound(id))
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player, GameError> {
        self.player_index(id).map(|i| &self.players[i])
    }

    pub fn regions_of(&self, id: PlayerId) -> Result<&Regions, GameError> {
        self.player_index(id).map(|i| &self.regions[i])
    }

    pub fn step(&self) -> Step {
        self.turn.step
    }

    pub fn is_over(&self) -> bool {
        self.turn.step == Step::GameOver
    }

    /// The player who must decide next, or None once the game is over.
    pub fn player_to_move(&self) -> Option<PlayerId> {
        (!self.is_over()).then(|| self.players[self.turn.player].id)
    }

    /// Players holding the strictly maximal coin total.
    pub fn winners(&self) -> Vec<PlayerId> {
        let best = self.players.iter().map(|p| p.coins).max();
        self.players
            .iter()
            .filter(|p| Some(p.coins) == best)
            .map(|p| p.id)
            .collect()
    }

    /// Starts the turn of player `idx`: tired units wake up, per-turn
    /// bookkeeping resets, and the first step is chosen.
    pub(crate) fn begin_turn(&mut self, idx: usize) {
        self.players[idx].refresh();
        self.regions[idx].transit.clear();
        self.caught.clear();
        self.recompute_achievable(idx);
        let step = if self.players[idx].race.is_none() {
            Step::ChangeRace
        } else if !self.race_pool.is_empty() {
            Step::Decline
        } else {
            Step::CatchCell
        };
        self.turn = Turn { player: idx, step };
    }

    /// Rebuilds the capture frontier of player `idx`: edge cells plus the
    /// neighbors of owned cells, minus owned cells.
    pub(crate) fn recompute_achievable(&mut self, idx: usize) {
        let owned = &self.regions[idx].owned;
        let mut achievable: BTreeSet<Position> = self
            .board
            .edge_cells()
            .iter()
            .copied()
            .filter(|p| !owned.contains(p))
            .collect();
        for &p in owned {
            for &q in self.board.neighbors(p) {
                if !owned.contains(&q) {
                    achievable.insert(q);
                }
            }
        }
        self.regions[idx].achievable = achievable;
    }

    /// Owned cells of player `idx` connected (8-neighborhood, through owned
    /// cells) to at least one garrisoned owned cell.
    pub(crate) fn supplied_cells(&self, idx: usize) -> BTreeSet<Position> {
        let owned = &self.regions[idx].owned;
        let mut seen: BTreeSet<Position> = owned
            .iter()
            .copied()
            .filter(|p| self.board.cell_at(*p).is_some_and(|c| !c.units.is_empty()))
            .collect();
        let mut queue: VecDeque<Position> = seen.iter().copied().collect();
        while let Some(p) = queue.pop_front() {
            for &q in self.board.neighbors(p) {
                if owned.contains(&q) && seen.insert(q) {
                    queue.push_back(q);
                }
            }
        }
        seen
    }

    /// Releases every owned cell of player `idx` that is neither garrisoned
    /// nor connected to a garrison. Returns the released positions.
    pub(crate) fn release_unsupplied(&mut self, idx: usize) -> Vec<Position> {
        let supplied = self.supplied_cells(idx);
        let lost: Vec<Position> = self.regions[idx]
            .owned
            .iter()
            .copied()
            .filter(|p| !supplied.contains(p))
            .collect();
        for p in &lost {
            if let Some(cell) = self.board.cell_at_mut(*p) {
                cell.release();
            }
            self.regions[idx].owned.remove(p);
        }
        lost
    }

    /// Lists every broken structural invariant. Empty for a consistent state.
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut out = Vec::new();
        for (i, player) in self.players.iter().enumerate() {
            let avail = player.units_by_state(UnitState::Available);
            let tired = player.units_by_state(UnitState::Tired);
            if let Some(race) = player.race {
                if avail.len() + tired.len() != race.unit_allotment() {
                    out.push(format!(
                        "{} holds {} units, {} allots {}",
                        player.id,
                        avail.len() + tired.len(),
                        race,
                        race.unit_allotment()
                    ));
                }
                if self.race_pool.contains(&race) {
                    out.push(format!("{} is held by {} and in the pool", race, player.id));
                }
            }
            if !avail.is_disjoint(tired) {
                out.push(format!("{} has units both available and tired", player.id));
            }
            for &p in &self.regions[i].owned {
                if !self.board.cell_at(p).is_some_and(|c| c.is_owned_by(player.id)) {
                    out.push(format!("{} lists {} as owned but the cell disagrees", player.id, p));
                }
            }
            for &p in &self.regions[i].feudal {
                if !self.board.cell_at(p).is_some_and(|c| c.feudal == Some(player.id)) {
                    out.push(format!("{} lists {} as feudal but the cell disagrees", player.id, p));
                }
            }
        }
        for (p, cell) in self.board.cells() {
            match cell.owner {
                None if !cell.units.is_empty() => {
                    out.push(format!("unowned cell {} has units", p));
                }
                Some(owner) => match self.player_index(owner) {
                    Ok(i) => {
                        if !self.regions[i].owned.contains(&p) {
                            out.push(format!("cell {} names {} but is not in its owned set", p, owner));
                        }
                        let player = &self.players[i];
                        if let Some(u) = cell.units.iter().find(|u| player.unit_state(**u).is_none()) {
                            out.push(format!("cell {} holds unit {} not belonging to {}", p, u, owner));
                        }
                    }
                    Err(_) => out.push(format!("cell {} owned by unknown {}", p, owner)),
                },
                None => {}
            }
        }
        out
    }
}
