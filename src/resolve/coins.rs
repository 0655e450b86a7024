//! Coin accrual at the end of a player's turn.

use std::collections::BTreeSet;

use crate::board::{GameState, TerrainType};

/// Coins player `idx` earns this turn from its feudal cells.
///
/// Each cell pays its terrain yield plus the race's coin modifier, floored at
/// zero. Group modifiers pay once per terrain present among the feudal cells.
/// Pure: the same state always yields the same amount.
pub fn accrue_coins(state: &GameState, idx: usize) -> i64 {
    let race = state.players[idx].race;
    let features = &state.features;
    let mut total: i64 = 0;
    let mut terrains = BTreeSet::new();

    for &p in &state.regions[idx].feudal {
        let Some(cell) = state.board.cell_at(p) else {
            continue;
        };
        let terrain = cell.terrain;
        terrains.insert(terrain);
        let modifier = race.map_or(0, |r| features.coin_modifier(r, terrain));
        total += i64::from((terrain.coin_yield() + modifier).max(0));
    }

    if let Some(r) = race {
        total += terrains
            .iter()
            .map(|&t: &TerrainType| i64::from(features.group_coins(r, t)))
            .sum::<i64>();
    }
    total
}
