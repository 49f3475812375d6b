//! # rf-outcome-sim — Batch Spin Simulator
//!
//! Plays a game many times across rayon workers and aggregates the math
//! statistics: RTP, hit rate, feature frequency and per-component triggers.
//!
//! Spin `i` always uses `ChaChaSource::seeded(seed + i)`, so a run is
//! reproducible for any thread count and any single spin can be replayed on
//! its own.
//!
//! ```text
//! Arc<Game> ──┬── worker ── spins [0, n)   ── SimStats ─┐
//!             ├── worker ── spins [n, 2n)  ── SimStats ─┼── merge ── SimReport
//!             └── worker ── …                          ─┘
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rf_outcome::{ChaChaSource, EngineError, Game, GameState, NoopAwards, PlayResult, Stake};

// ═══════════════════════════════════════════════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Error, Debug)]
pub enum SimError {
    #[error("spin {spin} (seed {seed}) failed: {source}")]
    Spin {
        spin: u64,
        seed: u64,
        #[source]
        source: EngineError,
    },

    #[error("thread pool error: {0}")]
    ThreadPool(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Simulation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub spins: u64,
    pub seed: u64,
    pub stake: Stake,
    /// Worker threads; 0 uses every core
    pub threads: usize,
    /// Spins per work unit
    pub chunk_size: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            spins: 100_000,
            seed: 0,
            stake: Stake::default(),
            threads: 0,
            chunk_size: 4096,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATISTICS
// ═══════════════════════════════════════════════════════════════════════════════

/// Aggregated counters; merging is order independent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimStats {
    pub spins: u64,
    pub total_bet: i64,
    pub total_win: i64,
    pub winning_spins: u64,
    /// Spins that entered at least one respin cycle
    pub feature_spins: u64,
    pub respin_cycles: u64,
    pub max_win: i64,
    /// Component name → steps that triggered
    pub component_triggers: BTreeMap<String, u64>,
}

impl SimStats {
    /// Add one finished spin
    pub fn record(&mut self, state: &GameState<'_>) {
        let play: &PlayResult = state.play();
        self.spins += 1;
        self.total_bet += play.stake.cash_bet;
        self.total_win += play.cash_win;
        if play.is_win() {
            self.winning_spins += 1;
        }
        if play.respin_cycles > 0 {
            self.feature_spins += 1;
        }
        self.respin_cycles += play.respin_cycles as u64;
        self.max_win = self.max_win.max(play.cash_win);

        for component in state.game().components() {
            if let Ok(data) = state.data(component.handle) {
                if data.trigger_times > 0 {
                    *self.component_triggers.entry(component.name.clone()).or_default() += data.trigger_times as u64;
                }
            }
        }
    }

    pub fn merge(mut self, other: SimStats) -> SimStats {
        self.spins += other.spins;
        self.total_bet += other.total_bet;
        self.total_win += other.total_win;
        self.winning_spins += other.winning_spins;
        self.feature_spins += other.feature_spins;
        self.respin_cycles += other.respin_cycles;
        self.max_win = self.max_win.max(other.max_win);
        for (name, n) in other.component_triggers {
            *self.component_triggers.entry(name).or_default() += n;
        }
        self
    }

    /// Return to player, as a fraction of total bet
    pub fn rtp(&self) -> f64 {
        if self.total_bet == 0 {
            return 0.0;
        }
        self.total_win as f64 / self.total_bet as f64
    }

    pub fn hit_rate(&self) -> f64 {
        ratio(self.winning_spins, self.spins)
    }

    pub fn feature_rate(&self) -> f64 {
        ratio(self.feature_spins, self.spins)
    }

    /// Average respin cycles per feature entry
    pub fn avg_feature_length(&self) -> f64 {
        ratio(self.respin_cycles, self.feature_spins)
    }
}

fn ratio(n: u64, d: u64) -> f64 {
    if d == 0 { 0.0 } else { n as f64 / d as f64 }
}

/// Final report printed by the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimReport {
    pub game: String,
    pub seed: u64,
    pub threads: usize,
    pub elapsed_ms: u128,
    pub rtp: f64,
    pub hit_rate: f64,
    pub feature_rate: f64,
    pub avg_feature_length: f64,
    pub stats: SimStats,
}

// ═══════════════════════════════════════════════════════════════════════════════
// SIMULATOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Runs batches of spins against a shared game
pub struct Simulator {
    game: Arc<Game>,
    config: SimConfig,
}

impl Simulator {
    pub fn new(game: Arc<Game>, config: SimConfig) -> Self {
        Self { game, config }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    fn threads(&self) -> usize {
        if self.config.threads == 0 {
            num_cpus::get()
        } else {
            self.config.threads
        }
    }

    /// Play spin `index` on its own seed
    pub fn play_spin(&self, index: u64) -> Result<PlayResult, SimError> {
        let seed = self.config.seed.wrapping_add(index);
        self.game
            .play(self.config.stake, None, &mut ChaChaSource::seeded(seed), &mut NoopAwards)
            .map_err(|source| SimError::Spin {
                spin: index,
                seed,
                source,
            })
    }

    fn run_range(&self, start: u64, end: u64) -> Result<SimStats, SimError> {
        let mut stats = SimStats::default();
        for index in start..end {
            let seed = self.config.seed.wrapping_add(index);
            let mut src = ChaChaSource::seeded(seed);
            let mut state = GameState::new(&self.game, self.config.stake);
            self.game
                .run(&mut state, &mut src, &mut NoopAwards)
                .map_err(|source| SimError::Spin {
                    spin: index,
                    seed,
                    source,
                })?;
            stats.record(&state);
        }
        Ok(stats)
    }

    /// Play every configured spin and aggregate
    pub fn run(&self) -> Result<SimReport, SimError> {
        if self.config.chunk_size == 0 {
            return Err(SimError::InvalidConfig("chunk_size must be positive".to_string()));
        }
        if self.config.stake.cash_bet <= 0 {
            return Err(SimError::InvalidConfig("total bet must be positive".to_string()));
        }

        let threads = self.threads();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| SimError::ThreadPool(e.to_string()))?;

        let spins = self.config.spins;
        let chunk = self.config.chunk_size;
        let chunks = spins.div_ceil(chunk);
        log::info!(
            "{}: simulating {} spins on {} threads (seed {})",
            self.game.name,
            spins,
            threads,
            self.config.seed
        );

        let started = Instant::now();
        let stats = pool.install(|| {
            (0..chunks)
                .into_par_iter()
                .map(|c| self.run_range(c * chunk, ((c + 1) * chunk).min(spins)))
                .try_reduce(SimStats::default, |a, b| Ok(a.merge(b)))
        })?;
        let elapsed = started.elapsed();

        log::info!(
            "{}: done in {:.2?}, rtp {:.4}, hit rate {:.4}",
            self.game.name,
            elapsed,
            stats.rtp(),
            stats.hit_rate()
        );

        Ok(SimReport {
            game: self.game.name.clone(),
            seed: self.config.seed,
            threads,
            elapsed_ms: elapsed.as_millis(),
            rtp: stats.rtp(),
            hit_rate: stats.hit_rate(),
            feature_rate: stats.feature_rate(),
            avg_feature_length: stats.avg_feature_length(),
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rf_outcome::ConfigLoader;

    const MOONLIGHT: &str = include_str!("../../../games/moonlight.yaml");

    fn simulator(spins: u64, threads: usize) -> Simulator {
        let game = ConfigLoader::new().parse_yaml(MOONLIGHT).unwrap();
        Simulator::new(
            Arc::new(game),
            SimConfig {
                spins,
                seed: 42,
                stake: Stake::new(1, 10),
                threads,
                chunk_size: 64,
            },
        )
    }

    #[test]
    fn test_counts_add_up() {
        let report = simulator(500, 2).run().unwrap();
        let stats = &report.stats;
        assert_eq!(stats.spins, 500);
        assert_eq!(stats.total_bet, 5000);
        assert!(stats.winning_spins <= stats.spins);
        assert!(stats.feature_spins <= stats.spins);
        assert_relative_eq!(report.rtp, stats.total_win as f64 / 5000.0);
        assert_relative_eq!(report.hit_rate, stats.winning_spins as f64 / 500.0);
    }

    #[test]
    fn test_thread_count_does_not_change_results() {
        let one = simulator(300, 1).run().unwrap();
        let four = simulator(300, 4).run().unwrap();
        assert_eq!(one.stats, four.stats);
    }

    #[test]
    fn test_feature_triggers_match_respin_entries() {
        let report = simulator(2000, 0).run().unwrap();
        let stats = &report.stats;
        let entries = stats.component_triggers.get("bg-scatter").copied().unwrap_or(0);
        assert_eq!(entries, stats.feature_spins);
        if stats.feature_spins > 0 {
            assert!(stats.avg_feature_length() >= 8.0);
        }
    }

    #[test]
    fn test_single_spin_matches_batch() {
        let sim = simulator(1, 1);
        let pr = sim.play_spin(0).unwrap();
        let report = sim.run().unwrap();
        assert_eq!(report.stats.total_win, pr.cash_win);
    }

    #[test]
    fn test_merge() {
        let a = SimStats {
            spins: 2,
            total_bet: 20,
            total_win: 5,
            max_win: 5,
            component_triggers: BTreeMap::from([("x".to_string(), 1)]),
            ..SimStats::default()
        };
        let b = SimStats {
            spins: 3,
            total_bet: 30,
            total_win: 40,
            max_win: 30,
            component_triggers: BTreeMap::from([("x".to_string(), 2), ("y".to_string(), 1)]),
            ..SimStats::default()
        };
        let m = a.merge(b);
        assert_eq!(m.spins, 5);
        assert_eq!(m.max_win, 30);
        assert_eq!(m.component_triggers["x"], 3);
        assert_relative_eq!(m.rtp(), 0.9);
    }

    #[test]
    fn test_rejects_zero_chunk() {
        let mut sim = simulator(10, 1);
        sim.config.chunk_size = 0;
        assert!(matches!(sim.run(), Err(SimError::InvalidConfig(_))));
    }
}
