//! Self-play game loop.
//!
//! Seats one `TreeSearchBot` per configured seat on a freshly generated
//! board, plays until the round limit, and records what happened. Many games
//! run sequentially or on a rayon pool, sharing only the stats aggregate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::stats::{record_game, SelfPlayStats};
use crate::board::{Board, Decision, GameState, Player, PlayerId, Race};
use crate::engine::request_decision;
use crate::error::GameError;
use crate::eval::Scoring;
use crate::resolve::{apply, CaptureEvent, CatchOutcome};
use crate::rules::GameFeatures;
use crate::search::{SearchConfig, TreeSearchBot};

/// Default number of games per run.
pub const GAME_AMOUNT: usize = 20;

/// One seat at the table and the bot playing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seat {
    /// Name reported in statistics.
    pub nickname: String,
    /// Search settings of this seat's bot.
    pub bot: SearchConfig,
}

impl Seat {
    pub fn new(nickname: impl Into<String>, bot: SearchConfig) -> Self {
        Seat {
            nickname: nickname.into(),
            bot,
        }
    }
}

/// Configuration for a self-play run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfPlayConfig {
    /// Games to play.
    pub num_games: usize,
    /// Rounds per game.
    pub max_rounds: u32,
    /// Board width in cells.
    pub width: i32,
    /// Board height in cells.
    pub height: i32,
    /// Worker threads; 1 or less plays sequentially.
    pub threads: usize,
    /// Board seed; game `i` uses `seed + i`. 0 draws from entropy.
    pub seed: u64,
    /// Suppress per-game progress logging.
    pub quiet: bool,
    /// Abort a game after this many decisions.
    pub max_decisions: usize,
    /// Seats in turn order, 2 to 6.
    pub players: Vec<Seat>,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            num_games: GAME_AMOUNT,
            max_rounds: 5,
            width: 5,
            height: 5,
            threads: 4,
            seed: 0,
            quiet: false,
            max_decisions: 10_000,
            players: vec![
                Seat::new("max-value", SearchConfig::default()),
                Seat::new(
                    "min-max-percent",
                    SearchConfig {
                        scoring: Scoring::MinMaxPercent,
                        ..SearchConfig::default()
                    },
                ),
            ],
        }
    }
}

/// What one seat did during a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatRecord {
    pub player: PlayerId,
    pub nickname: String,
    /// Final coin total.
    pub coins: i64,
    /// Races adopted, in order.
    pub races: Vec<Race>,
    /// Captures made, in order.
    pub captures: Vec<CaptureEvent>,
    /// Slowest single decision of the game.
    pub max_decision_latency: Duration,
}

/// A finished self-play game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Position in the run; also offsets the board seed.
    pub game_id: usize,
    /// Seats tied on the top coin total.
    pub winners: Vec<PlayerId>,
    /// Rounds played.
    pub rounds: u32,
    /// Decisions applied, all seats together.
    pub decisions: usize,
    /// Indexed by seat.
    pub seats: Vec<SeatRecord>,
}

/// Result of a whole run.
#[derive(Debug, Clone)]
pub struct SelfPlayReport {
    pub stats: SelfPlayStats,
    /// Sorted by game id.
    pub records: Vec<GameRecord>,
    /// Wall-clock time of the whole run.
    pub elapsed: Duration,
}

fn game_rng(config: &SelfPlayConfig, game_id: usize) -> SmallRng {
    if config.seed != 0 {
        SmallRng::seed_from_u64(config.seed.wrapping_add(game_id as u64))
    } else {
        SmallRng::from_entropy()
    }
}

/// Plays one full game.
pub fn play_game(config: &SelfPlayConfig, game_id: usize, rng: &mut SmallRng) -> Result<GameRecord, GameError> {
    let board = Board::balanced(config.width, config.height, rng)?;
    let players = config
        .players
        .iter()
        .enumerate()
        .map(|(i, seat)| Player::new(PlayerId(i as u32), seat.nickname.clone()))
        .collect();
    let mut state = GameState::new(board, players, GameFeatures::standard(), config.max_rounds)?;
    let mut bots: Vec<TreeSearchBot> = config.players.iter().map(|s| TreeSearchBot::new(s.bot)).collect();
    let mut seats: Vec<SeatRecord> = state
        .players
        .iter()
        .map(|p| SeatRecord {
            player: p.id,
            nickname: p.nickname.clone(),
            coins: 0,
            races: Vec::new(),
            captures: Vec::new(),
            max_decision_latency: Duration::ZERO,
        })
        .collect();

    let mut decisions = 0;
    while let Some(player) = state.player_to_move() {
        decisions += 1;
        if decisions > config.max_decisions {
            return Err(GameError::DecisionLimit(config.max_decisions));
        }
        let idx = state.player_index(player)?;

        let start = Instant::now();
        let decision = request_decision(&mut bots[idx], player, &state)?;
        let latency = start.elapsed();
        seats[idx].max_decision_latency = seats[idx].max_decision_latency.max(latency);

        let report = apply(&mut state, player, &decision)?;
        if let Decision::ChangeRace(race) = decision {
            seats[idx].races.push(race);
        }
        if let Some(CatchOutcome::Captured(event)) = report.outcome {
            seats[idx].captures.push(event);
        }
        if let Some(coins) = report.coins {
            debug!(game_id, player = %player, round = state.round, coins, "turn ended");
        }
    }

    for (seat, p) in seats.iter_mut().zip(&state.players) {
        seat.coins = p.coins;
    }
    Ok(GameRecord {
        game_id,
        winners: state.winners(),
        rounds: state.round.saturating_sub(1),
        decisions,
        seats,
    })
}

fn log_game(config: &SelfPlayConfig, done: usize, record: &GameRecord, elapsed: Duration) {
    if config.quiet {
        return;
    }
    let winners: Vec<String> = record
        .winners
        .iter()
        .filter_map(|w| record.seats.iter().find(|s| s.player == *w))
        .map(|s| s.nickname.clone())
        .collect();
    info!(
        game = done,
        total = config.num_games,
        game_id = record.game_id,
        winners = %winners.join(", "),
        decisions = record.decisions,
        elapsed_s = elapsed.as_secs_f64(),
        "game finished"
    );
}

/// Plays `config.num_games` games and aggregates their statistics.
///
/// When `config.threads > 1`, games are played concurrently using rayon.
/// Boards depend only on the seed and the game id, so both modes produce
/// the same records for a fixed non-zero seed.
pub fn run_self_play(config: &SelfPlayConfig) -> Result<SelfPlayReport, GameError> {
    let start = Instant::now();
    let stats = Mutex::new(SelfPlayStats::new(
        config.players.iter().map(|s| s.nickname.clone()),
    ));

    let mut records = if config.threads > 1 {
        run_parallel(config, &stats)?
    } else {
        run_sequential(config, &stats)?
    };
    records.sort_by_key(|r| r.game_id);

    Ok(SelfPlayReport {
        stats: stats.into_inner().unwrap_or_else(PoisonError::into_inner),
        records,
        elapsed: start.elapsed(),
    })
}

fn run_sequential(config: &SelfPlayConfig, stats: &Mutex<SelfPlayStats>) -> Result<Vec<GameRecord>, GameError> {
    let mut records = Vec::with_capacity(config.num_games);
    for i in 0..config.num_games {
        let game_start = Instant::now();
        let record = play_game(config, i, &mut game_rng(config, i))?;
        record_game(stats, &record);
        log_game(config, i + 1, &record, game_start.elapsed());
        records.push(record);
    }
    Ok(records)
}

fn run_parallel(config: &SelfPlayConfig, stats: &Mutex<SelfPlayStats>) -> Result<Vec<GameRecord>, GameError> {
    use rayon::prelude::*;

    let completed = AtomicUsize::new(0);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
        .map_err(|e| GameError::WorkerPool(e.to_string()))?;

    pool.install(|| {
        (0..config.num_games)
            .into_par_iter()
            .map(|i| -> Result<GameRecord, GameError> {
                let game_start = Instant::now();
                let record = play_game(config, i, &mut game_rng(config, i))?;
                record_game(stats, &record);
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                log_game(config, done, &record, game_start.elapsed());
                Ok(record)
            })
            .collect()
    })
}
