//! Terrain kinds and their fixed capture and yield constants.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The terrain of a cell.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum TerrainType {
    Land,
    Mountain,
    Wheat,
    Water,
}

pub const ALL_TERRAINS: [TerrainType; 4] = [
    TerrainType::Land,
    TerrainType::Mountain,
    TerrainType::Wheat,
    TerrainType::Water,
];

impl TerrainType {
    /// Units needed to take an empty cell of this terrain with no modifiers.
    pub const fn capture_difficulty(self) -> i32 {
        match self {
            TerrainType::Land => 2,
            TerrainType::Mountain => 3,
            TerrainType::Wheat => 2,
            TerrainType::Water => 4,
        }
    }

    /// Coins paid each round to the feudal of a cell of this terrain.
    pub const fn coin_yield(self) -> i32 {
        match self {
            TerrainType::Land => 1,
            TerrainType::Mountain => 1,
            TerrainType::Wheat => 2,
            TerrainType::Water => 0,
        }
    }

    /// Single-character map notation.
    pub const fn map_char(self) -> char {
        match self {
            TerrainType::Land => 'L',
            TerrainType::Mountain => 'M',
            TerrainType::Wheat => 'F',
            TerrainType::Water => 'W',
        }
    }

    /// Parses a terrain from its map character.
    pub fn from_map_char(c: char) -> Option<TerrainType> {
        match c {
            'L' => Some(TerrainType::Land),
            'M' => Some(TerrainType::Mountain),
            'F' => Some(TerrainType::Wheat),
            'W' => Some(TerrainType::Water),
            _ => None,
        }
    }
}

impl fmt::Display for TerrainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TerrainType::Land => "land",
            TerrainType::Mountain => "mountain",
            TerrainType::Wheat => "wheat",
            TerrainType::Water => "water",
        };
        f.write_str(name)
    }
}
