//! Position evaluation.
//!
//! Scores a snapshot from one faction's perspective and folds child scores
//! up the decision tree.

pub mod scoring;

pub use scoring::{score_state, Scoring, ALL_SCORINGS};
