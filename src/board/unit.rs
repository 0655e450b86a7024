//! Unit identities, readiness states and the id allocator.
//!
//! A unit carries nothing but its id. Its readiness lives in the owning
//! player's partition and its location in a cell's unit set.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Globally unique (per game) unit identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UnitId(pub u64);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The two mutually exclusive readiness states of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitState {
    Available,
    Tired,
}

/// Monotonic unit id sequence carried by the game state.
///
/// Cloning a state clones the allocator, so speculative branches mint the
/// same ids a live game would.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitIds {
    next: u64,
}

impl UnitIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next unused id.
    pub fn mint(&mut self) -> UnitId {
        let id = UnitId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.next
    }
}
