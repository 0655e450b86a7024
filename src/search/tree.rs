//! Arena-backed decision tree.
//!
//! Nodes live in a flat `Vec` and refer to each other by `NodeId`. Children
//! are always allocated after their parent, so walking the arena backwards
//! visits every child before its parent.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::board::{Decision, GameState, PlayerId};

/// Index into the `DecisionTree` arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DecisionNode {
    /// None at the root.
    pub parent: Option<NodeId>,
    /// Decisions leading from the parent to this node. Empty at the root.
    pub plan: Vec<Decision>,
    /// Player to move in `state`; None once the game is over.
    pub to_move: Option<PlayerId>,
    /// Snapshot reached after `plan`. Shared so the fold can read it
    /// without cloning.
    pub state: Arc<GameState>,
    /// Plies below the root.
    pub depth: u32,
    pub children: Vec<NodeId>,
    /// Leaf score, or the folded score of the children.
    pub score: f64,
}

impl DecisionNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<DecisionNode>,
}

impl DecisionTree {
    pub fn new(state: Arc<GameState>) -> Self {
        DecisionTree {
            nodes: vec![DecisionNode {
                parent: None,
                plan: Vec::new(),
                to_move: state.player_to_move(),
                state,
                depth: 0,
                children: Vec::new(),
                score: 0.0,
            }],
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &DecisionNode {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut DecisionNode {
        &mut self.nodes[id.index()]
    }

    /// Adds a child under `parent` and returns its id.
    pub fn alloc(&mut self, parent: NodeId, plan: Vec<Decision>, state: Arc<GameState>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let depth = self.get(parent).depth + 1;
        self.nodes.push(DecisionNode {
            parent: Some(parent),
            plan,
            to_move: state.player_to_move(),
            state,
            depth,
            children: Vec::new(),
            score: 0.0,
        });
        self.get_mut(parent).children.push(id);
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids in allocation order (parents before children).
    pub fn ids(&self) -> impl DoubleEndedIterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// First child with the highest score; ties go to the earliest.
    pub fn best_child(&self, id: NodeId) -> Option<NodeId> {
        let mut best: Option<NodeId> = None;
        for &c in &self.get(id).children {
            match best {
                Some(b) if self.get(b).score >= self.get(c).score => {}
                _ => best = Some(c),
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::board::{Board, Player, Race, Step};
    use crate::rules::GameFeatures;

    fn snapshot() -> Arc<GameState> {
        let board = Board::from_rows(&["LL", "LL"]).unwrap();
        let players = vec![Player::new(PlayerId(1), "a"), Player::new(PlayerId(2), "b")];
        Arc::new(GameState::new(board, players, Arc::new(GameFeatures::empty()), 1).unwrap())
    }

    #[test]
    fn alloc_links_parent_and_child() {
        let start = snapshot();
        let mut tree = DecisionTree::new(Arc::clone(&start));
        let root = tree.root();
        let a = tree.alloc(root, vec![Decision::ChangeRace(Race::Elf)], Arc::clone(&start));
        let mut over = (*start).clone();
        over.turn.step = Step::GameOver;
        let b = tree.alloc(a, vec![Decision::CatchCell(None)], Arc::new(over));
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.get(root).children, vec![a]);
        assert_eq!(tree.get(b).parent, Some(a));
        assert_eq!(tree.get(b).depth, 2);
        assert!(tree.get(b).is_leaf());
        assert_eq!(tree.ids().rev().next(), Some(b));
        assert_eq!(tree.get(a).to_move, Some(PlayerId(1)));
        assert_eq!(tree.get(b).to_move, None);
        assert!(tree.get(b).state.is_over());
    }

    #[test]
    fn best_child_prefers_the_first_of_equals() {
        let start = snapshot();
        let mut tree = DecisionTree::new(Arc::clone(&start));
        let root = tree.root();
        let ids: Vec<_> = (0..3)
            .map(|_| tree.alloc(root, Vec::new(), Arc::clone(&start)))
            .collect();
        tree.get_mut(ids[0]).score = 1.0;
        tree.get_mut(ids[1]).score = 3.0;
        tree.get_mut(ids[2]).score = 3.0;
        assert_eq!(tree.best_child(root), Some(ids[1]));
        assert_eq!(tree.best_child(ids[0]), None);
    }
}
