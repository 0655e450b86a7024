//! Candidate generation.
//!
//! Lists the plans the player to move can choose from, splitting units over
//! target cells with a lazy partition iterator.

pub mod candidates;
pub mod partition;

pub use candidates::{catch_targets, enumerate_decisions, CatchTarget};
pub use partition::{partition_count, partitions, Partitions};
