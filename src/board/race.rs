//! Race archetypes a faction can adopt.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A faction archetype. Fixes the number of units minted on adoption.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Race {
    Amphibian,
    Elf,
    Gnome,
    Orc,
    Undead,
    Mage,
}

pub const ALL_RACES: [Race; 6] = [
    Race::Amphibian,
    Race::Elf,
    Race::Gnome,
    Race::Orc,
    Race::Undead,
    Race::Mage,
];

impl Race {
    /// Total units a faction receives when it adopts this race.
    pub const fn unit_allotment(self) -> usize {
        match self {
            Race::Amphibian => 6,
            Race::Elf => 6,
            Race::Gnome => 5,
            Race::Orc => 7,
            Race::Undead => 11,
            Race::Mage => 5,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Race::Amphibian => "amphibian",
            Race::Elf => "elf",
            Race::Gnome => "gnome",
            Race::Orc => "orc",
            Race::Undead => "undead",
            Race::Mage => "mage",
        }
    }
}

impl fmt::Display for Race {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
