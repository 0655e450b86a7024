//! Self-play statistics CLI.
//!
//! Pits tree-search bots against each other on generated boards and prints a
//! JSON summary of wins, races and captures per seat.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- --seat max-value --seat min-max-percent
//!
//! Progress goes through `tracing`; set `RUST_LOG=debug` for per-turn lines.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use hegemony::eval::Scoring;
use hegemony::search::SearchConfig;
use hegemony::selfplay::{self, Seat, SelfPlayConfig, StatsSummary, GAME_AMOUNT};

/// Play tree-search bots against each other and report statistics.
#[derive(Parser, Debug)]
#[command(name = "selfplay")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scoring of each seat, in seating order (2 to 6 seats)
    #[arg(long = "seat", num_args = 1, default_values_t = [Scoring::MaxValue, Scoring::MinMaxPercent])]
    seats: Vec<Scoring>,

    /// Number of games to play
    #[arg(short, long, default_value_t = GAME_AMOUNT)]
    games: usize,

    /// Rounds per game
    #[arg(short, long, default_value_t = 5)]
    rounds: u32,

    /// Board width
    #[arg(long, default_value_t = 5)]
    width: i32,

    /// Board height
    #[arg(long, default_value_t = 5)]
    height: i32,

    /// Search depth in plies
    #[arg(short, long, default_value_t = 2)]
    depth: u32,

    /// Target cells considered per ply
    #[arg(long, default_value_t = 3)]
    cells: usize,

    /// Plans kept per search node
    #[arg(long, default_value_t = 64)]
    branching: usize,

    /// Worker threads (1 plays sequentially)
    #[arg(short, long, default_value_t = 4)]
    threads: usize,

    /// Board seed, 0 for entropy
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Abort a game after this many decisions
    #[arg(long, default_value_t = 10_000)]
    max_decisions: usize,

    /// Write the summary here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write one JSON game record per line to this file
    #[arg(long)]
    records: Option<PathBuf>,

    /// Suppress per-game progress
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    config: &'a SelfPlayConfig,
    elapsed_s: f64,
    stats: StatsSummary,
}

fn config_from(args: &Args) -> SelfPlayConfig {
    let players = args
        .seats
        .iter()
        .map(|&scoring| {
            Seat::new(
                scoring.name(),
                SearchConfig {
                    depth: args.depth,
                    scoring,
                    max_candidate_cells: args.cells,
                    max_branching: args.branching,
                },
            )
        })
        .collect();
    SelfPlayConfig {
        num_games: args.games,
        max_rounds: args.rounds,
        width: args.width,
        height: args.height,
        threads: args.threads,
        seed: args.seed,
        quiet: args.quiet,
        max_decisions: args.max_decisions,
        players,
    }
}

fn write_json<T: Serialize>(value: &T, path: Option<&PathBuf>) -> io::Result<()> {
    match path {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, value)?;
            writeln!(writer)?;
            writer.flush()
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            serde_json::to_writer_pretty(&mut writer, value)?;
            writeln!(writer)?;
            writer.flush()
        }
    }
}

fn write_records(records: &[selfplay::GameRecord], path: &PathBuf) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writeln!(writer)?;
    }
    writer.flush()
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = config_from(&args);
    info!(
        games = config.num_games,
        seats = config.players.len(),
        rounds = config.max_rounds,
        width = config.width,
        height = config.height,
        threads = config.threads,
        "self-play starting"
    );

    let report = match selfplay::run_self_play(&config) {
        Ok(report) => report,
        Err(e) => {
            error!("self-play failed: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        games = report.records.len(),
        elapsed_s = report.elapsed.as_secs_f64(),
        "self-play complete"
    );

    if let Some(path) = &args.records {
        if let Err(e) = write_records(&report.records, path) {
            error!("failed to write {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
    }

    let summary = Report {
        config: &config,
        elapsed_s: report.elapsed.as_secs_f64(),
        stats: report.stats.summary(),
    };
    if let Err(e) = write_json(&summary, args.output.as_ref()) {
        error!("failed to write summary: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
