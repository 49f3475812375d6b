//! # rf-outcome — Slot Outcome Execution Core
//!
//! Decides what one bet pays: evaluates trigger rules against symbol grids,
//! prices wins, applies multipliers, dispatches awards and chains respins
//! through a configurable component graph.
//!
//! ## Features
//!
//! - **Trigger Evaluator**: lines, ways, scatters, scatter counts, areas, clusters
//! - **Weighted Tables**: replay-stable proportional selection
//! - **Respin Orchestration**: count maps, carry-over retriggers, nested respins
//! - **Deterministic Randomness**: seeded, recording and replay sources
//! - **Configuration**: YAML / JSON game documents resolved into a typed graph
//!
//! ## Architecture
//!
//! ```text
//! GameDocument ──ConfigLoader──▶ Game (shared, read-only)
//!                                  │
//!     RandomSource ──────┐         │
//!     AwardEffects ──────┤         v
//!                        └──▶ Game::play ──▶ GameState (per spin)
//!                                  │            ├── PlayResult (scenes, results)
//!                                  │            ├── ComponentData arena
//!                                  │            └── respin stack
//!                                  v
//!                            Component::step → StepOutcome
//!                                  │
//!                                  └── trigger::evaluate(TriggerConfig, EvalContext)
//! ```

pub mod award;
pub mod component;
pub mod config;
pub mod error;
pub mod game;
pub mod grid;
pub mod paytable;
pub mod random;
pub mod reels;
pub mod respin;
pub mod result;
pub mod trigger;
pub mod weights;

pub use award::*;
pub use component::*;
pub use config::{ConfigLimits, ConfigLoader, GameDocument};
pub use error::*;
pub use game::*;
pub use grid::*;
pub use paytable::*;
pub use random::*;
pub use reels::*;
pub use respin::*;
pub use result::*;
pub use trigger::*;
pub use weights::*;
