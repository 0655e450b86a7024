//! Board representation and game-state types.
//!
//! Contains the grid and its cells, races, players and their units, the
//! decision values players submit, and the overall game state.

pub mod cell;
pub mod decision;
pub mod grid;
pub mod player;
pub mod position;
pub mod race;
pub mod state;
pub mod terrain;
pub mod unit;

pub use cell::Cell;
pub use decision::{Catch, Decision, Distribution};
pub use grid::{Board, MIN_SIZE};
pub use player::{Player, PlayerId};
pub use position::Position;
pub use race::{Race, ALL_RACES};
pub use state::{GameState, Regions, Step, Turn};
pub use terrain::{TerrainType, ALL_TERRAINS};
pub use unit::{UnitId, UnitIds, UnitState};
