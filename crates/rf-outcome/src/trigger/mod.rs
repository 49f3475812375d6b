//! Trigger Evaluator
//!
//! One evaluator over a closed set of trigger kinds. Every kind shares the
//! same matching vocabulary (target / wild / exclude symbol sets), the same
//! pricing rule and the same bet-type gating:
//!
//! ```text
//! coin_win = pay × mul × other_mul
//! cash_win = coin_win × stake.bet_for(bet_type)
//! ```
//!
//! `BetType::NoPay` zeroes both after the results are built, so a trigger can
//! gate a feature on a paying pattern without paying it.
//!
//! ## Kinds
//!
//! | kind | matching | priced |
//! |------|----------|--------|
//! | `Lines` / `CheckLines` | consecutive run along each payline | paytable / signal only |
//! | `Ways` / `CheckWays` | per-column cross product from reel 0 | paytable × ways / signal only |
//! | `Scatters` | per-symbol count anywhere | own row or `pay_as` row |
//! | `CountScatter` | combined count anywhere | only with `pay_as` |
//! | `CountScatterInArea` | combined count inside a rectangle | only with `pay_as` |
//! | `Cluster` | connected region | paytable by region size |

mod cluster;
mod lines;
mod scatter;
mod ways;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::grid::{OtherScene, Scene, SymbolCode};
use crate::paytable::{LineSet, Paytable};
use crate::result::{Stake, WinResult};

// ═══════════════════════════════════════════════════════════════════════════════
// ENUMS
// ═══════════════════════════════════════════════════════════════════════════════

/// Trigger kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TriggerKind {
    Lines,
    Ways,
    Scatters,
    CountScatter,
    CountScatterInArea,
    CheckLines,
    CheckWays,
    Cluster,
}

impl TriggerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lines => "lines",
            Self::Ways => "ways",
            Self::Scatters => "scatters",
            Self::CountScatter => "countscatter",
            Self::CountScatterInArea => "countscatterInArea",
            Self::CheckLines => "checkLines",
            Self::CheckWays => "checkWays",
            Self::Cluster => "cluster",
        }
    }

    /// Kinds that scan paylines
    pub fn needs_lines(&self) -> bool {
        matches!(self, Self::Lines | Self::CheckLines)
    }

    /// Kinds that only signal, never pay from the paytable directly
    pub fn is_check(&self) -> bool {
        matches!(self, Self::CheckLines | Self::CheckWays)
    }
}

impl FromStr for TriggerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lines" => Ok(Self::Lines),
            "ways" => Ok(Self::Ways),
            "scatters" => Ok(Self::Scatters),
            "countscatter" => Ok(Self::CountScatter),
            "countscatterinarea" => Ok(Self::CountScatterInArea),
            "checklines" => Ok(Self::CheckLines),
            "checkways" => Ok(Self::CheckWays),
            "cluster" => Ok(Self::Cluster),
            _ => Err(ConfigError::InvalidTriggerType(s.to_string())),
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stake multiplier selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BetType {
    /// Evaluate, but never pay
    NoPay,
    /// Per-line bet
    #[default]
    Bet,
    /// Total bet
    TotalBet,
}

impl FromStr for BetType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nopay" => Ok(Self::NoPay),
            "bet" => Ok(Self::Bet),
            "totalbet" => Ok(Self::TotalBet),
            _ => Err(ConfigError::InvalidBetType(s.to_string())),
        }
    }
}

/// Payline scan direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WinDirection {
    #[default]
    LeftToRight,
    RightToLeft,
    All,
}

impl FromStr for WinDirection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "l2r" | "left2right" | "lefttoright" => Ok(Self::LeftToRight),
            "r2l" | "right2left" | "righttoleft" => Ok(Self::RightToLeft),
            "all" => Ok(Self::All),
            _ => Err(ConfigError::InvalidDirection(s.to_string())),
        }
    }
}

/// How other-scene values on the winning cells compose into `other_mul`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellMultiplier {
    /// Sum of the values, at least 1
    Add,
    /// Product of the positive values
    Multiply,
}

impl CellMultiplier {
    pub fn compose(&self, values: impl Iterator<Item = i32>) -> i64 {
        match self {
            Self::Add => values.map(|v| v.max(0) as i64).sum::<i64>().max(1),
            Self::Multiply => values.map(|v| if v > 0 { v as i64 } else { 1 }).product(),
        }
    }
}

/// Inclusive rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl Area {
    pub fn contains(&self, x: usize, y: usize) -> bool {
        (self.x0..=self.x1).contains(&x) && (self.y0..=self.y1).contains(&y)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Matching rule of a trigger
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerConfig {
    pub kind: TriggerKind,
    /// Target symbols; empty means every paytable symbol that is neither wild
    /// nor excluded
    pub symbols: Vec<SymbolCode>,
    pub wild_symbols: Vec<SymbolCode>,
    pub exclude_symbols: Vec<SymbolCode>,
    /// Line wins on these symbols are tagged [`LineTag::FreeGame`](crate::result::LineTag)
    pub free_game_symbols: Vec<SymbolCode>,
    pub bet_type: BetType,
    pub min_num: usize,
    pub direction: WinDirection,
    pub pay_as: Option<SymbolCode>,
    pub area: Option<Area>,
    pub allow_diagonal: bool,
    /// Enables the other-scene and picks how it composes
    pub other_mul: Option<CellMultiplier>,
    pub is_reverse: bool,
}

impl TriggerConfig {
    pub fn new(kind: TriggerKind) -> Self {
        Self {
            kind,
            symbols: Vec::new(),
            wild_symbols: Vec::new(),
            exclude_symbols: Vec::new(),
            free_game_symbols: Vec::new(),
            bet_type: BetType::default(),
            min_num: 0,
            direction: WinDirection::default(),
            pay_as: None,
            area: None,
            allow_diagonal: false,
            other_mul: None,
            is_reverse: false,
        }
    }

    pub fn is_wild(&self, symbol: SymbolCode) -> bool {
        self.wild_symbols.contains(&symbol)
    }

    pub fn is_excluded(&self, symbol: SymbolCode) -> bool {
        self.exclude_symbols.contains(&symbol)
    }

    /// `cell` counts as `target`
    pub fn matches(&self, cell: SymbolCode, target: SymbolCode) -> bool {
        !self.is_excluded(cell) && (cell == target || self.is_wild(cell))
    }

    /// Resolved target symbols
    pub fn targets(&self, paytable: &Paytable) -> Vec<SymbolCode> {
        if !self.symbols.is_empty() {
            return self.symbols.clone();
        }
        paytable
            .symbols()
            .filter(|&s| !self.is_wild(s) && !self.is_excluded(s))
            .collect()
    }

    /// Minimum count, never below one
    pub(crate) fn min_count(&self) -> usize {
        self.min_num.max(1)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVALUATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Everything a trigger reads, passed explicitly per call
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub scene: &'a Scene,
    pub other_scene: Option<&'a OtherScene>,
    pub paytable: &'a Paytable,
    pub lines: Option<&'a LineSet>,
    pub stake: Stake,
}

impl<'a> EvalContext<'a> {
    pub fn new(scene: &'a Scene, paytable: &'a Paytable, stake: Stake) -> Self {
        Self {
            scene,
            other_scene: None,
            paytable,
            lines: None,
            stake,
        }
    }

    pub fn with_lines(mut self, lines: &'a LineSet) -> Self {
        self.lines = Some(lines);
        self
    }

    pub fn with_other_scene(mut self, other: &'a OtherScene) -> Self {
        self.other_scene = Some(other);
        self
    }

    /// Other-scene, when the trigger enables it and it lines up with the scene
    pub(crate) fn other_for(&self, cfg: &TriggerConfig) -> Option<(&'a OtherScene, CellMultiplier)> {
        let mode = cfg.other_mul?;
        let other = self.other_scene?;
        other.same_shape(self.scene).then_some((other, mode))
    }
}

/// Outcome of one evaluation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Evaluation {
    pub triggered: bool,
    pub results: Vec<WinResult>,
}

impl Evaluation {
    /// Sum of coin wins
    pub fn coin_win(&self) -> i64 {
        self.results.iter().map(|r| r.coin_win).sum()
    }

    /// Largest symbol count among results
    pub fn symbol_num(&self) -> usize {
        self.results.iter().map(|r| r.symbol_count).max().unwrap_or(0)
    }

    /// Wild count of the result with the largest symbol count
    pub fn wild_num(&self) -> usize {
        self.results
            .iter()
            .max_by_key(|r| r.symbol_count)
            .map_or(0, |r| r.wild_count)
    }
}

/// Evaluate a trigger against a scene
///
/// `is_reverse` flips `triggered` only; the results are always the matches
/// actually found.
pub fn evaluate(cfg: &TriggerConfig, ctx: &EvalContext<'_>) -> Evaluation {
    let mut results = match cfg.kind {
        TriggerKind::Lines => lines::evaluate(cfg, ctx, false),
        TriggerKind::CheckLines => lines::evaluate(cfg, ctx, true),
        TriggerKind::Ways => ways::evaluate(cfg, ctx, false),
        TriggerKind::CheckWays => ways::evaluate(cfg, ctx, true),
        TriggerKind::Scatters => scatter::evaluate_per_symbol(cfg, ctx),
        TriggerKind::CountScatter => scatter::evaluate_count(cfg, ctx, None),
        TriggerKind::CountScatterInArea => scatter::evaluate_count(cfg, ctx, cfg.area),
        TriggerKind::Cluster => cluster::evaluate(cfg, ctx),
    };

    if cfg.bet_type == BetType::NoPay {
        for r in &mut results {
            r.coin_win = 0;
            r.cash_win = 0;
        }
    }

    let found = !results.is_empty();
    Evaluation {
        triggered: found != cfg.is_reverse,
        results,
    }
}
