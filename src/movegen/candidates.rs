//! Candidate decision plans for the player to move.
//!
//! A plan is the list of decisions that completes the pending step: a single
//! decline or race pick, a whole capture loop ending in `CatchCell(None)`, or
//! one distribution. Unit splits come from [`partitions`] with one extra
//! bucket for units held back. When there are more splits than
//! `max_branching`, an even sample across the whole enumeration is kept.

use crate::board::{Catch, Decision, Distribution, GameState, Position, Step, UnitId, UnitState};
use crate::movegen::partition::{partition_count, partitions};
use crate::resolve::capture_cost;
use crate::search::SearchConfig;

/// A capture target and the units it takes to succeed right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatchTarget {
    pub position: Position,
    pub cost: usize,
    /// The cell is already owned; sending units only marches through it.
    pub entry: bool,
}

/// Reachable targets for player `idx`, captures before entries, cheapest first.
pub fn catch_targets(state: &GameState, idx: usize) -> Vec<CatchTarget> {
    let Some(race) = state.players[idx].race else {
        return Vec::new();
    };
    let regions = &state.regions[idx];
    let mut targets: Vec<CatchTarget> = regions
        .achievable
        .iter()
        .chain(regions.owned.iter())
        .filter(|p| !state.caught.contains(p))
        .filter_map(|&p| {
            let entry = regions.owned.contains(&p);
            if entry {
                let terrain = state.board.cell_at(p)?.terrain;
                let cost = terrain.capture_difficulty().max(0) as usize;
                return Some(CatchTarget { position: p, cost, entry });
            }
            let cost = capture_cost(state, idx, race, p)?;
            (!cost.impossible).then(|| CatchTarget {
                position: p,
                cost: cost.consumed(),
                entry,
            })
        })
        .collect();
    targets.sort_by_key(|t| (t.entry, t.cost, t.position));
    targets.dedup_by_key(|t| t.position);
    targets
}

/// Every plan the player to move may choose, capped at `config.max_branching`.
pub fn enumerate_decisions(state: &GameState, config: &SearchConfig) -> Vec<Vec<Decision>> {
    if state.is_over() {
        return Vec::new();
    }
    let idx = state.turn.player;
    let mut plans = match state.step() {
        Step::Decline => vec![vec![Decision::Decline(false)], vec![Decision::Decline(true)]],
        Step::ChangeRace => state
            .race_pool
            .iter()
            .map(|&r| vec![Decision::ChangeRace(r)])
            .collect(),
        Step::CatchCell => catch_plans(state, idx, config),
        Step::Distribution => distribution_plans(state, idx, config),
        Step::GameOver => Vec::new(),
    };
    plans.truncate(config.max_branching.max(1));
    plans
}

fn available_units(state: &GameState, idx: usize) -> Vec<UnitId> {
    state.players[idx]
        .units_by_state(UnitState::Available)
        .iter()
        .copied()
        .collect()
}

/// Indices of at most `cap` picks spread evenly over `0..len`, both ends kept.
fn spread_indices(len: usize, cap: usize) -> Vec<usize> {
    if len <= cap {
        return (0..len).collect();
    }
    match cap {
        0 => Vec::new(),
        1 => vec![0],
        _ => (0..cap).map(|k| k * (len - 1) / (cap - 1)).collect(),
    }
}

/// Keeps the items of `items` (of length `len`) at evenly spread positions.
fn sample<T>(items: impl Iterator<Item = T>, len: usize, cap: usize) -> Vec<T> {
    let picks = spread_indices(len, cap);
    let mut next = picks.into_iter().peekable();
    let mut out = Vec::new();
    for (i, item) in items.enumerate() {
        if next.peek().is_none() {
            break;
        }
        if next.peek() == Some(&i) {
            next.next();
            out.push(item);
        }
    }
    out
}

fn catch_plans(state: &GameState, idx: usize, config: &SearchConfig) -> Vec<Vec<Decision>> {
    let mut targets = catch_targets(state, idx);
    targets.truncate(config.max_candidate_cells);
    let units = available_units(state, idx);
    let reserve = targets.len();

    // Splits that catch something, with no catch short of its cost.
    let (costs, unit_count) = (&targets, units.len());
    let splits = move || {
        partitions(reserve + 1, unit_count).filter(move |counts| {
            counts[..reserve].iter().any(|&n| n > 0)
                && !costs.iter().zip(counts).any(|(t, &n)| n > 0 && n < t.cost.max(1))
        })
    };
    let len = splits().count();

    let mut plans = vec![vec![Decision::CatchCell(None)]];
    let cap = config.max_branching.max(1) - 1;
    for counts in sample(splits(), len, cap) {
        let mut plan = Vec::new();
        let mut next = 0;
        for (target, &n) in targets.iter().zip(&counts) {
            if n == 0 {
                continue;
            }
            let sent = units[next..next + n].to_vec();
            next += n;
            plan.push(Decision::CatchCell(Some(Catch::new(target.position, sent))));
        }
        plan.push(Decision::CatchCell(None));
        plans.push(plan);
    }
    plans
}

fn distribution_plans(state: &GameState, idx: usize, config: &SearchConfig) -> Vec<Vec<Decision>> {
    let mut cells: Vec<(i32, Position)> = state.regions[idx]
        .owned
        .iter()
        .filter_map(|&p| Some((state.board.cell_at(p)?.terrain.coin_yield(), p)))
        .collect();
    cells.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    cells.truncate(config.max_candidate_cells);
    let units = available_units(state, idx);

    let len = usize::try_from(partition_count(cells.len() + 1, units.len())).unwrap_or(usize::MAX);
    sample(partitions(cells.len() + 1, units.len()), len, config.max_branching.max(1))
        .into_iter()
        .map(|counts| {
            let mut distribution = Distribution::new();
            let mut next = 0;
            for (&(_, p), &n) in cells.iter().zip(&counts) {
                if n > 0 {
                    distribution.insert(p, units[next..next + n].to_vec());
                    next += n;
                }
            }
            vec![Decision::Distribution(distribution)]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::board::{Board, Player, PlayerId, Race};
    use crate::resolve::apply;
    use crate::rules::GameFeatures;

    fn game() -> GameState {
        let board = Board::from_rows(&["LMW", "FLL", "LLL"]).unwrap();
        let players = vec![Player::new(PlayerId(1), "a"), Player::new(PlayerId(2), "b")];
        GameState::new(board, players, Arc::new(GameFeatures::empty()), 3).unwrap()
    }

    fn config(cells: usize) -> SearchConfig {
        SearchConfig {
            max_candidate_cells: cells,
            ..SearchConfig::default()
        }
    }

    #[test]
    fn race_pick_offers_the_whole_pool() {
        let state = game();
        let plans = enumerate_decisions(&state, &config(2));
        assert_eq!(plans.len(), 6);
        assert!(plans.iter().all(|p| matches!(p[..], [Decision::ChangeRace(_)])));
    }

    #[test]
    fn catch_plans_end_the_loop_and_respect_costs() {
        let mut state = game();
        apply(&mut state, PlayerId(1), &Decision::ChangeRace(Race::Gnome)).unwrap();
        let targets = catch_targets(&state, 0);
        // Land and wheat cost 2, before mountain (3) and water (4).
        assert_eq!(targets[0].cost, 2);
        assert_eq!(targets.last().map(|t| t.cost), Some(4));

        let plans = enumerate_decisions(&state, &config(2));
        assert!(!plans.is_empty());
        for plan in &plans {
            assert_eq!(plan.last(), Some(&Decision::CatchCell(None)));
            for d in &plan[..plan.len() - 1] {
                let Decision::CatchCell(Some(catch)) = d else {
                    panic!("unexpected {d:?}");
                };
                assert!(catch.units.len() >= 2);
            }
        }
        // Holding everything back is always a choice.
        assert!(plans.contains(&vec![Decision::CatchCell(None)]));
    }

    #[test]
    fn every_catch_plan_applies_cleanly() {
        let mut state = game();
        apply(&mut state, PlayerId(1), &Decision::ChangeRace(Race::Orc)).unwrap();
        for plan in enumerate_decisions(&state, &config(3)) {
            let mut child = state.clone();
            for d in &plan {
                apply(&mut child, PlayerId(1), d).unwrap();
            }
            assert_eq!(child.step(), Step::Distribution);
            assert!(child.invariant_violations().is_empty());
        }
    }

    #[test]
    fn distribution_prefers_high_yield_cells() {
        let mut state = game();
        apply(&mut state, PlayerId(1), &Decision::ChangeRace(Race::Orc)).unwrap();
        let wheat = Position::new(0, 1);
        let land = Position::new(0, 0);
        for (p, ids) in [(land, [0, 1, 2]), (wheat, [3, 4, 5])] {
            let catch = Catch::new(p, ids.iter().map(|&i| UnitId(i)).collect());
            apply(&mut state, PlayerId(1), &Decision::CatchCell(Some(catch))).unwrap();
        }
        apply(&mut state, PlayerId(1), &Decision::CatchCell(None)).unwrap();

        let plans = enumerate_decisions(&state, &config(1));
        // Three available units (2, 5, 6) over the wheat cell plus reserve.
        assert_eq!(plans.len(), 4);
        for plan in &plans {
            let [Decision::Distribution(d)] = &plan[..] else {
                panic!("unexpected {plan:?}");
            };
            assert!(d.keys().all(|&p| p == wheat));
        }
    }

    #[test]
    fn capped_plans_still_cover_passing_and_wide_splits() {
        let board = Board::from_rows(&["LLLL", "LLLL", "LLLL"]).unwrap();
        let players = vec![Player::new(PlayerId(1), "a"), Player::new(PlayerId(2), "b")];
        let mut state = GameState::new(board, players, Arc::new(GameFeatures::empty()), 3).unwrap();
        apply(&mut state, PlayerId(1), &Decision::ChangeRace(Race::Undead)).unwrap();

        let config = SearchConfig::default();
        let plans = enumerate_decisions(&state, &config);
        assert_eq!(plans.len(), config.max_branching);
        assert_eq!(plans[0], vec![Decision::CatchCell(None)]);

        let catches = |plan: &Vec<Decision>| plan.len() - 1;
        let sent: Vec<Vec<usize>> = plans
            .iter()
            .map(|plan| {
                plan.iter()
                    .filter_map(|d| match d {
                        Decision::CatchCell(Some(c)) => Some(c.units.len()),
                        _ => None,
                    })
                    .collect()
            })
            .collect();
        // Eleven units over three targets: some plans use all three.
        assert!(plans.iter().any(|p| catches(p) == 3));
        // Some plans catch yet hold units back.
        assert!(sent.iter().any(|s| !s.is_empty() && s.iter().sum::<usize>() < 11));
        // Not every plan piles most units on one target.
        assert!(sent.iter().filter(|s| !s.is_empty()).any(|s| s[0] <= 3));
    }

    #[test]
    fn spread_keeps_both_ends() {
        assert_eq!(spread_indices(3, 5), vec![0, 1, 2]);
        assert_eq!(spread_indices(10, 4), vec![0, 3, 6, 9]);
        assert_eq!(spread_indices(10, 1), vec![0]);
        assert!(spread_indices(10, 0).is_empty());
        assert_eq!(sample("abcdefghij".chars(), 10, 4), vec!['a', 'd', 'g', 'j']);
    }

    #[test]
    fn branching_cap_applies() {
        let mut state = game();
        apply(&mut state, PlayerId(1), &Decision::ChangeRace(Race::Undead)).unwrap();
        let capped = SearchConfig {
            max_branching: 3,
            max_candidate_cells: 4,
            ..SearchConfig::default()
        };
        assert_eq!(enumerate_decisions(&state, &capped).len(), 3);
    }
}
