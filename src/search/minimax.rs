//! Depth-limited decision-tree search.
//!
//! Expands every candidate plan from a cloned snapshot up to `depth` plies,
//! scores the leaves, then folds scores from the bottom of the arena up to
//! the root. The root picks the best-scoring child.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::tree::{DecisionTree, NodeId};
use crate::board::{Decision, GameState, PlayerId};
use crate::eval::{score_state, Scoring};
use crate::movegen::enumerate_decisions;
use crate::resolve::apply;

/// Search parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Plies to look ahead. One ply completes one pending step.
    pub depth: u32,
    /// Leaf metric and how child scores fold.
    pub scoring: Scoring,
    /// Capture or garrison targets considered per ply.
    pub max_candidate_cells: usize,
    /// Plans kept per node.
    pub max_branching: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            depth: 2,
            scoring: Scoring::MaxValue,
            max_candidate_cells: 3,
            max_branching: 64,
        }
    }
}

/// Outcome of a search from the root player's perspective.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Plan of the best child; empty when the root has no legal child.
    pub decisions: Vec<Decision>,
    pub score: f64,
    /// Nodes in the tree, root included.
    pub nodes: u64,
}

/// Applies a plan to a copy of `state` by the player to move.
fn play_plan(state: &GameState, plan: &[Decision]) -> Option<GameState> {
    let mover = state.player_to_move()?;
    let mut next = state.clone();
    for decision in plan {
        apply(&mut next, mover, decision).ok()?;
    }
    Some(next)
}

fn expand(tree: &mut DecisionTree, id: NodeId, player: PlayerId, depth_left: u32, config: &SearchConfig) {
    let state = Arc::clone(&tree.get(id).state);
    if depth_left > 0 && !state.is_over() {
        for plan in enumerate_decisions(&state, config) {
            // Plans that fail validation are dropped.
            let Some(child_state) = play_plan(&state, &plan) else {
                continue;
            };
            let child = tree.alloc(id, plan, Arc::new(child_state));
            expand(tree, child, player, depth_left - 1, config);
        }
    }
    if tree.get(id).is_leaf() {
        tree.get_mut(id).score = score_state(&state, player, config.scoring);
    }
}

/// Builds and scores the full tree below `state` for `player`.
pub fn build_tree(state: &GameState, player: PlayerId, config: &SearchConfig) -> DecisionTree {
    let mut tree = DecisionTree::new(Arc::new(state.clone()));
    let root = tree.root();
    expand(&mut tree, root, player, config.depth, config);

    for id in tree.ids().rev() {
        let node = tree.get(id);
        if node.is_leaf() {
            continue;
        }
        let root_moves = node.to_move == Some(player);
        let scores: Vec<f64> = node.children.iter().map(|&c| tree.get(c).score).collect();
        if let Some(score) = config.scoring.combine(root_moves, &scores) {
            tree.get_mut(id).score = score;
        }
    }
    tree
}

/// Searches for the best plan for the player to move, scored for `player`.
///
/// Never mutates `state`.
pub fn search(state: &GameState, player: PlayerId, config: &SearchConfig) -> SearchResult {
    let tree = build_tree(state, player, config);
    let root = tree.root();
    let (decisions, score) = match tree.best_child(root) {
        Some(best) => (tree.get(best).plan.clone(), tree.get(best).score),
        None => (Vec::new(), tree.get(root).score),
    };
    debug!(
        player = %player,
        step = state.step().name(),
        nodes = tree.len(),
        score,
        "search finished"
    );
    SearchResult {
        decisions,
        score,
        nodes: tree.len() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::board::{Board, Catch, Player, Position, Race, Step, UnitId};
    use crate::rules::GameFeatures;

    fn game() -> GameState {
        let board = Board::from_rows(&["FLW", "LLL", "WLW"]).unwrap();
        let players = vec![Player::new(PlayerId(1), "a"), Player::new(PlayerId(2), "b")];
        GameState::new(board, players, Arc::new(GameFeatures::empty()), 2).unwrap()
    }

    fn at_distribution() -> GameState {
        let mut state = game();
        apply(&mut state, PlayerId(1), &Decision::ChangeRace(Race::Elf)).unwrap();
        state
    }

    #[test]
    fn search_does_not_mutate_input() {
        let state = game();
        let before = state.clone();
        let result = search(&state, PlayerId(1), &SearchConfig::default());
        assert_eq!(state, before);
        assert!(result.nodes > 1);
        assert!(matches!(result.decisions[..], [Decision::ChangeRace(_)]));
    }

    #[test]
    fn depth_zero_scores_the_root() {
        let state = game();
        let config = SearchConfig { depth: 0, ..SearchConfig::default() };
        let result = search(&state, PlayerId(1), &config);
        assert!(result.decisions.is_empty());
        assert_eq!(result.nodes, 1);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn two_plies_find_the_wheat_cell() {
        // Capturing and garrisoning the wheat cell pays 2, any land cell 1.
        let state = at_distribution();
        assert_eq!(state.step(), Step::CatchCell);
        let config = SearchConfig {
            depth: 2,
            scoring: Scoring::MaxValue,
            max_candidate_cells: 2,
            max_branching: 512,
        };
        let result = search(&state, PlayerId(1), &config);
        assert!(result.score >= 2.0);
        let caught: Vec<Position> = result
            .decisions
            .iter()
            .filter_map(|d| match d {
                Decision::CatchCell(Some(c)) => Some(c.position),
                _ => None,
            })
            .collect();
        assert!(caught.contains(&Position::new(0, 0)));
    }

    #[test]
    fn scores_fold_bottom_up() {
        let state = at_distribution();
        let config = SearchConfig { depth: 2, ..SearchConfig::default() };
        let tree = build_tree(&state, PlayerId(1), &config);
        for id in tree.ids() {
            let node = tree.get(id);
            if node.is_leaf() {
                continue;
            }
            // MaxValue takes the best child everywhere.
            let best = node
                .children
                .iter()
                .map(|&c| tree.get(c).score)
                .fold(f64::NEG_INFINITY, f64::max);
            assert_eq!(node.score, best);
        }
    }

    /// P1 has caught the wheat corner and is about to garrison it; P2 has
    /// not picked a race yet.
    fn before_handover() -> GameState {
        let mut state = at_distribution();
        let catch = Catch::new(Position::new(0, 0), vec![UnitId(0), UnitId(1), UnitId(2)]);
        apply(&mut state, PlayerId(1), &Decision::CatchCell(Some(catch))).unwrap();
        apply(&mut state, PlayerId(1), &Decision::CatchCell(None)).unwrap();
        assert_eq!(state.step(), Step::Distribution);
        state
    }

    #[test]
    fn min_max_minimizes_on_opponent_plies() {
        let state = before_handover();
        let config = SearchConfig {
            depth: 4,
            scoring: Scoring::MinMaxValueDifference,
            max_candidate_cells: 2,
            max_branching: 8,
        };
        let tree = build_tree(&state, PlayerId(1), &config);

        let mut opponent_nodes = 0;
        let mut opponent_choice_matters = false;
        for id in tree.ids() {
            let node = tree.get(id);
            if node.is_leaf() {
                continue;
            }
            let scores: Vec<f64> = node.children.iter().map(|&c| tree.get(c).score).collect();
            let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
            if node.to_move == Some(PlayerId(1)) {
                assert_eq!(node.score, max, "{id}");
            } else {
                assert_eq!(node.to_move, Some(PlayerId(2)));
                assert_eq!(node.score, min, "{id}");
                opponent_nodes += 1;
                opponent_choice_matters |= min < max;
            }
        }
        assert!(opponent_nodes > 0);
        // P2 garrisoning its own capture lowers P1's lead.
        assert!(opponent_choice_matters);

        // The root belongs to P1 and keeps its best child.
        let root = tree.get(tree.root());
        assert_eq!(root.to_move, Some(PlayerId(1)));
        let best = tree.best_child(tree.root()).unwrap();
        assert_eq!(root.score, tree.get(best).score);
    }

    #[test]
    fn game_over_has_no_children() {
        let mut state = game();
        state.turn.step = Step::GameOver;
        let result = search(&state, PlayerId(1), &SearchConfig::default());
        assert!(result.decisions.is_empty());
        assert_eq!(result.nodes, 1);
    }
}
