//! rf-outcome-sim CLI
//!
//! Usage:
//!   rf-outcome-sim run <GAME> --spins 1000000 --seed 7   - Batch simulation
//!   rf-outcome-sim spin <GAME> --seed 7                  - Trace a single spin
//!   rf-outcome-sim check <GAME>                          - Validate a game file

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use rf_outcome::{ChaChaSource, ConfigLoader, Game, NoopAwards, Stake};
use rf_outcome_sim::{SimConfig, Simulator};

#[derive(Parser)]
#[command(name = "rf-outcome-sim", about = "Slot outcome simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate many spins and print aggregate statistics
    Run {
        /// Game file (.yaml / .yml / .json)
        game: PathBuf,
        #[arg(short, long, default_value_t = 100_000)]
        spins: u64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Worker threads (0 = all cores)
        #[arg(short, long, default_value_t = 0)]
        threads: usize,
        #[arg(long, default_value_t = 1)]
        coin_bet: i64,
        #[arg(long, default_value_t = 10)]
        total_bet: i64,
        #[arg(long, default_value_t = 4096)]
        chunk_size: u64,
        /// Pretty-print JSON
        #[arg(short, long)]
        pretty: bool,
    },
    /// Play one spin and print its full result
    Spin {
        game: PathBuf,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 1)]
        coin_bet: i64,
        #[arg(long, default_value_t = 10)]
        total_bet: i64,
    },
    /// Load and validate a game file
    Check { game: PathBuf },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            game,
            spins,
            seed,
            threads,
            coin_bet,
            total_bet,
            chunk_size,
            pretty,
        } => {
            let config = SimConfig {
                spins,
                seed,
                stake: stake(coin_bet, total_bet)?,
                threads,
                chunk_size,
            };
            run_simulation(&game, config, pretty)
        }
        Commands::Spin {
            game,
            seed,
            coin_bet,
            total_bet,
        } => trace_spin(&game, seed, stake(coin_bet, total_bet)?),
        Commands::Check { game } => check_game(&game),
    }
}

fn stake(coin_bet: i64, total_bet: i64) -> Result<Stake> {
    if coin_bet <= 0 || total_bet <= 0 {
        bail!("bets must be positive (coin {coin_bet}, total {total_bet})");
    }
    Ok(Stake::new(coin_bet, total_bet))
}

fn load_game(path: &Path) -> Result<Game> {
    ConfigLoader::new()
        .load_file(path)
        .with_context(|| format!("failed to load game {}", path.display()))
}

fn run_simulation(path: &Path, config: SimConfig, pretty: bool) -> Result<()> {
    let game = Arc::new(load_game(path)?);
    let report = Simulator::new(game, config)
        .run()
        .context("simulation failed")?;

    let json = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");
    Ok(())
}

fn trace_spin(path: &Path, seed: u64, stake: Stake) -> Result<()> {
    let game = load_game(path)?;
    let result = game
        .play(stake, None, &mut ChaChaSource::seeded(seed), &mut NoopAwards)
        .with_context(|| format!("spin with seed {seed} failed"))?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn check_game(path: &Path) -> Result<()> {
    let game = load_game(path)?;
    println!(
        "{}: {} symbols, {} lines, {} components, entry {}",
        game.name,
        game.symbols.len(),
        game.lines.as_ref().map_or(0, |l| l.len()),
        game.components().len(),
        game.component(game.entry())?.name
    );
    Ok(())
}
