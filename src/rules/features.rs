//! Per-(race, terrain) modifiers.
//!
//! The table is a fixed array indexed by `race * TERRAIN_COUNT + terrain`,
//! built once and shared behind an `Arc`; it never changes during a game.

use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};

use crate::board::race::{Race, ALL_RACES};
use crate::board::terrain::{TerrainType, ALL_TERRAINS};

const RACE_COUNT: usize = ALL_RACES.len();
const TERRAIN_COUNT: usize = ALL_TERRAINS.len();

/// A single modifier attached to a (race, terrain) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    /// Added to the cost of capturing a cell of this terrain.
    Catch(i32),
    /// Added to the cost of capturing a cell of this terrain from this race.
    Defense(i32),
    /// Added to the coin yield of each feudal cell of this terrain.
    Coins(i32),
    /// Capture bonus for each owned cell of this terrain adjacent to the target.
    Support(i32),
    /// Paid once per round if any feudal cell has this terrain.
    GroupCoins(i32),
    /// Cells of this terrain cannot be captured by this race.
    CatchImpossible,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FeatureTable")]
pub struct GameFeatures {
    table: Vec<Vec<Feature>>,
}

/// Unchecked wire form of [`GameFeatures`].
#[derive(Deserialize)]
struct FeatureTable {
    table: Vec<Vec<Feature>>,
}

impl TryFrom<FeatureTable> for GameFeatures {
    type Error = String;

    fn try_from(raw: FeatureTable) -> Result<Self, Self::Error> {
        let expected = RACE_COUNT * TERRAIN_COUNT;
        if raw.table.len() != expected {
            return Err(format!(
                "feature table has {} entries, expected {}",
                raw.table.len(),
                expected
            ));
        }
        Ok(GameFeatures { table: raw.table })
    }
}

static STANDARD: LazyLock<Arc<GameFeatures>> = LazyLock::new(|| Arc::new(build_standard()));

fn build_standard() -> GameFeatures {
    use Feature::*;
    use TerrainType::*;

    let mut f = GameFeatures::empty();
    f.add(Race::Amphibian, Water, &[Catch(-3), Coins(1)]);
    f.add(Race::Elf, Land, &[Catch(-1), Defense(1)]);
    f.add(Race::Gnome, Mountain, &[Catch(-1), Defense(1), Coins(1), Support(1)]);
    f.add(Race::Orc, Land, &[Support(1)]);
    f.add(Race::Orc, Wheat, &[Support(1)]);
    f.add(Race::Undead, Water, &[CatchImpossible]);
    for t in [Land, Mountain, Wheat] {
        f.add(Race::Undead, t, &[Coins(-1)]);
    }
    for t in ALL_TERRAINS {
        f.add(Race::Mage, t, &[GroupCoins(1)]);
    }
    f
}

impl GameFeatures {
    /// A table with no modifiers at all.
    pub fn empty() -> Self {
        GameFeatures {
            table: vec![Vec::new(); RACE_COUNT * TERRAIN_COUNT],
        }
    }

    /// The stock modifier table.
    pub fn standard() -> Arc<Self> {
        Arc::clone(&STANDARD)
    }

    fn slot(race: Race, terrain: TerrainType) -> usize {
        race as usize * TERRAIN_COUNT + terrain as usize
    }

    /// Appends modifiers to a (race, terrain) entry.
    pub fn add(&mut self, race: Race, terrain: TerrainType, features: &[Feature]) {
        self.table[Self::slot(race, terrain)].extend_from_slice(features);
    }

    /// Builder form of [`GameFeatures::add`].
    pub fn with(mut self, race: Race, terrain: TerrainType, features: &[Feature]) -> Self {
        self.add(race, terrain, features);
        self
    }

    /// Modifiers for a pair, in insertion order. Empty when absent.
    pub fn get(&self, race: Race, terrain: TerrainType) -> &[Feature] {
        &self.table[Self::slot(race, terrain)]
    }

    fn sum(&self, race: Race, terrain: TerrainType, pick: impl Fn(&Feature) -> Option<i32>) -> i32 {
        self.get(race, terrain).iter().filter_map(pick).sum()
    }

    pub fn catch_modifier(&self, race: Race, terrain: TerrainType) -> i32 {
        self.sum(race, terrain, |f| match f {
            Feature::Catch(k) => Some(*k),
            _ => None,
        })
    }

    pub fn defense_modifier(&self, race: Race, terrain: TerrainType) -> i32 {
        self.sum(race, terrain, |f| match f {
            Feature::Defense(k) => Some(*k),
            _ => None,
        })
    }

    pub fn coin_modifier(&self, race: Race, terrain: TerrainType) -> i32 {
        self.sum(race, terrain, |f| match f {
            Feature::Coins(k) => Some(*k),
            _ => None,
        })
    }

    pub fn support(&self, race: Race, terrain: TerrainType) -> i32 {
        self.sum(race, terrain, |f| match f {
            Feature::Support(k) => Some(*k),
            _ => None,
        })
    }

    pub fn group_coins(&self, race: Race, terrain: TerrainType) -> i32 {
        self.sum(race, terrain, |f| match f {
            Feature::GroupCoins(k) => Some(*k),
            _ => None,
        })
    }

    pub fn catch_impossible(&self, race: Race, terrain: TerrainType) -> bool {
        self.get(race, terrain)
            .iter()
            .any(|f| matches!(f, Feature::CatchImpossible))
    }
}

impl Default for GameFeatures {
    fn default() -> Self {
        GameFeatures::empty()
    }
}
