//! Search and planning.
//!
//! Expands candidate plans from cloned snapshots into an arena tree, scores
//! the leaves and folds the scores back up to pick a plan.

pub mod bot;
pub mod minimax;
pub mod tree;

pub use bot::TreeSearchBot;
pub use minimax::{build_tree, search, SearchConfig, SearchResult};
pub use tree::{DecisionNode, DecisionTree, NodeId};
