//! Hegemony engine library.
//!
//! A territory-capture board game for two to six factions. Exposes the board
//! representation, the turn resolver, candidate generation, decision-tree
//! search and the self-play collector for use by integration tests and the
//! `selfplay` binary.

pub mod board;
pub mod engine;
pub mod error;
pub mod eval;
pub mod movegen;
pub mod resolve;
pub mod rules;
pub mod search;
pub mod selfplay;

pub use engine::{request_decision, DecisionProvider};
pub use error::{DecisionFault, GameError};
pub use eval::{score_state, Scoring};
pub use resolve::apply_decision;
