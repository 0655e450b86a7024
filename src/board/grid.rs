//! The board: a row-major arena of cells keyed by position.
//!
//! Adjacency lists and the outer ring are computed once at construction, so
//! neighbor lookups during search are plain slice reads.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::cell::Cell;
use super::position::Position;
use super::terrain::{TerrainType, ALL_TERRAINS};
use crate::error::GameError;

/// Smallest allowed width and height.
pub const MIN_SIZE: i32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
    neighbors: Vec<Vec<Position>>,
    edge: Vec<Position>,
}

/// Cell count of a `width` x `height` board, checking the size limits.
fn cell_count(width: i32, height: i32) -> Result<usize, GameError> {
    if width < MIN_SIZE || height < MIN_SIZE {
        return Err(GameError::Size { width, height, min: MIN_SIZE });
    }
    width
        .checked_mul(height)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| GameError::InvalidMap(format!("{width}x{height} board is too large")))
}

impl Board {
    /// Builds a board from row-major terrains. `terrains.len()` must equal
    /// `width * height`.
    pub fn new(width: i32, height: i32, terrains: Vec<TerrainType>) -> Result<Self, GameError> {
        let expected = cell_count(width, height)?;
        if terrains.len() != expected {
            return Err(GameError::InvalidMap(format!(
                "expected {} terrains, got {}",
                expected,
                terrains.len()
            )));
        }

        let cells: Vec<Cell> = terrains.into_iter().map(Cell::new).collect();
        let mut neighbors = Vec::with_capacity(cells.len());
        let mut edge = Vec::new();
        for y in 0..height {
            for x in 0..width {
                let p = Position::new(x, y);
                let adj: Vec<Position> = p
                    .neighbors()
                    .filter(|q| q.x >= 0 && q.y >= 0 && q.x < width && q.y < height)
                    .collect();
                neighbors.push(adj);
                if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                    edge.push(p);
                }
            }
        }

        Ok(Board { width, height, cells, neighbors, edge })
    }

    /// Builds a board whose terrain counts differ by at most one.
    ///
    /// Terrains are dealt round-robin and the layout is then shuffled, which
    /// keeps the counts balanced.
    pub fn balanced(width: i32, height: i32, rng: &mut impl Rng) -> Result<Self, GameError> {
        let n = cell_count(width, height)?;
        let mut terrains: Vec<TerrainType> = (0..n)
            .map(|i| ALL_TERRAINS[i % ALL_TERRAINS.len()])
            .collect();
        terrains.shuffle(rng);
        Board::new(width, height, terrains)
    }

    /// Parses a board from map rows, one character per cell (`L`, `M`, `F`, `W`).
    pub fn from_rows(rows: &[&str]) -> Result<Self, GameError> {
        let height = rows.len() as i32;
        let width = rows.first().map_or(0, |r| r.chars().count()) as i32;
        let mut terrains = Vec::with_capacity((width.max(0) * height) as usize);
        for row in rows {
            if row.chars().count() as i32 != width {
                return Err(GameError::InvalidMap(format!("ragged row '{}'", row)));
            }
            for c in row.chars() {
                let t = TerrainType::from_map_char(c)
                    .ok_or_else(|| GameError::InvalidMap(format!("unknown terrain '{}'", c)))?;
                terrains.push(t);
            }
        }
        Board::new(width, height, terrains)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn contains(&self, p: Position) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    fn index(&self, p: Position) -> Option<usize> {
        self.contains(p).then(|| (p.y * self.width + p.x) as usize)
    }

    /// Inverse of the arena index.
    pub fn position_of(&self, index: usize) -> Position {
        let i = index as i32;
        Position::new(i % self.width, i / self.width)
    }

    pub fn cell_at(&self, p: Position) -> Option<&Cell> {
        self.index(p).map(|i| &self.cells[i])
    }

    pub fn cell_at_mut(&mut self, p: Position) -> Option<&mut Cell> {
        self.index(p).map(move |i| &mut self.cells[i])
    }

    /// On-board neighbors of `p`. Empty for off-board positions.
    pub fn neighbors(&self, p: Position) -> &[Position] {
        match self.index(p) {
            Some(i) => &self.neighbors[i],
            None => &[],
        }
    }

    /// Cells of the outer ring, row-major.
    pub fn edge_cells(&self) -> &[Position] {
        &self.edge
    }

    pub fn is_edge(&self, p: Position) -> bool {
        self.contains(p)
            && (p.x == 0 || p.y == 0 || p.x == self.width - 1 || p.y == self.height - 1)
    }

    /// All cells with their positions, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (Position, &Cell)> {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, c)| (self.position_of(i), c))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
