//! Statistics aggregated over many self-play games.
//!
//! Every field folds commutatively, so the aggregate does not depend on the
//! order in which worker threads finish their games.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;

use super::runner::GameRecord;
use crate::board::{Race, TerrainType};

/// Per-seat aggregate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerStats {
    pub nickname: String,
    /// Games where the seat shared the top coin total.
    pub wins: u64,
    /// Coins summed over all games.
    pub coins: i64,
    /// Successful captures by the capturing race and the cell's terrain.
    pub captures: BTreeMap<(Race, TerrainType), u64>,
    /// Every race adoption.
    pub races: BTreeMap<Race, u64>,
    /// Race each game was opened with.
    pub first_race: BTreeMap<Race, u64>,
    /// Race held when each game ended.
    pub last_race: BTreeMap<Race, u64>,
    /// Slowest single decision seen.
    pub max_decision_latency: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelfPlayStats {
    /// Games absorbed so far.
    pub games: u64,
    /// Games won by more than one seat.
    pub shared_wins: u64,
    /// Rounds summed over all games.
    pub rounds: u64,
    /// Indexed by seat.
    pub players: Vec<PlayerStats>,
}

impl SelfPlayStats {
    pub fn new(nicknames: impl IntoIterator<Item = String>) -> Self {
        SelfPlayStats {
            players: nicknames
                .into_iter()
                .map(|nickname| PlayerStats { nickname, ..PlayerStats::default() })
                .collect(),
            ..SelfPlayStats::default()
        }
    }

    /// Folds one finished game into the aggregate.
    pub fn absorb(&mut self, record: &GameRecord) {
        self.games += 1;
        self.rounds += u64::from(record.rounds);
        if record.winners.len() > 1 {
            self.shared_wins += 1;
        }
        for (i, seat) in record.seats.iter().enumerate() {
            if self.players.len() <= i {
                self.players.push(PlayerStats {
                    nickname: seat.nickname.clone(),
                    ..PlayerStats::default()
                });
            }
            let stats = &mut self.players[i];
            if record.winners.contains(&seat.player) {
                stats.wins += 1;
            }
            stats.coins += seat.coins;
            for event in &seat.captures {
                *stats.captures.entry((event.race, event.terrain)).or_default() += 1;
            }
            for &race in &seat.races {
                *stats.races.entry(race).or_default() += 1;
            }
            if let Some(&race) = seat.races.first() {
                *stats.first_race.entry(race).or_default() += 1;
            }
            if let Some(&race) = seat.races.last() {
                *stats.last_race.entry(race).or_default() += 1;
            }
            stats.max_decision_latency = stats.max_decision_latency.max(seat.max_decision_latency);
        }
    }

    /// Flattened, serializable view for reports.
    pub fn summary(&self) -> StatsSummary {
        let games = self.games.max(1) as f64;
        StatsSummary {
            games: self.games,
            shared_wins: self.shared_wins,
            average_rounds: self.rounds as f64 / games,
            players: self
                .players
                .iter()
                .map(|p| PlayerSummary {
                    nickname: p.nickname.clone(),
                    wins: p.wins,
                    win_rate: p.wins as f64 / games,
                    average_coins: p.coins as f64 / games,
                    races: by_name(&p.races),
                    first_race: by_name(&p.first_race),
                    last_race: by_name(&p.last_race),
                    captures: p
                        .captures
                        .iter()
                        .map(|(&(race, terrain), &n)| (format!("{race}/{terrain}"), n))
                        .collect(),
                    max_decision_latency_ms: p.max_decision_latency.as_secs_f64() * 1000.0,
                })
                .collect(),
        }
    }
}

fn by_name(counts: &BTreeMap<Race, u64>) -> BTreeMap<String, u64> {
    counts.iter().map(|(r, &n)| (r.to_string(), n)).collect()
}

/// Applies a finished game to the shared aggregate under a single lock.
pub fn record_game(stats: &Mutex<SelfPlayStats>, record: &GameRecord) {
    let mut guard = stats.lock().unwrap_or_else(PoisonError::into_inner);
    guard.absorb(record);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub games: u64,
    pub shared_wins: u64,
    /// Mean rounds per game.
    pub average_rounds: f64,
    pub players: Vec<PlayerSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSummary {
    pub nickname: String,
    pub wins: u64,
    /// Wins over games played, shared wins counted in full.
    pub win_rate: f64,
    /// Mean final coins per game.
    pub average_coins: f64,
    pub races: BTreeMap<String, u64>,
    pub first_race: BTreeMap<String, u64>,
    pub last_race: BTreeMap<String, u64>,
    /// Keyed `race/terrain`.
    pub captures: BTreeMap<String, u64>,
    pub max_decision_latency_ms: f64,
}
