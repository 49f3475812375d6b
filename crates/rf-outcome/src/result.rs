//! Win results and the per-bet play log

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::component::ComponentData;
use crate::grid::{OtherScene, Scene, SymbolCode};
use crate::trigger::{BetType, TriggerKind};

/// Placed bet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stake {
    /// Bet per line (coin value)
    pub coin_bet: i64,
    /// Total bet
    pub cash_bet: i64,
}

impl Stake {
    pub fn new(coin_bet: i64, cash_bet: i64) -> Self {
        Self { coin_bet, cash_bet }
    }

    /// Stake multiplier selected by a bet type
    pub fn bet_for(&self, bet_type: BetType) -> i64 {
        match bet_type {
            BetType::NoPay => 0,
            BetType::Bet => self.coin_bet,
            BetType::TotalBet => self.cash_bet,
        }
    }
}

impl Default for Stake {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// Distinguishes ordinary line wins from free-game triggers on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineTag {
    #[default]
    Normal,
    FreeGame,
}

/// One win (or signal) produced by a trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinResult {
    pub symbol: SymbolCode,
    pub kind: TriggerKind,
    /// Line index, or -1 for non-line kinds
    pub line_index: i32,
    /// Flattened `x, y` pairs
    pub positions: Vec<usize>,
    pub symbol_count: usize,
    pub wild_count: usize,
    /// Paytable multiplier (ways count for way wins, 1 otherwise)
    pub mul: i64,
    pub coin_win: i64,
    pub cash_win: i64,
    /// Factor contributed by the other-scene, then by win multipliers
    pub other_mul: i64,
    pub tag: LineTag,
}

impl WinResult {
    /// Empty result of the given kind
    pub fn new(kind: TriggerKind, symbol: SymbolCode) -> Self {
        Self {
            symbol,
            kind,
            line_index: -1,
            positions: Vec::new(),
            symbol_count: 0,
            wild_count: 0,
            mul: 1,
            coin_win: 0,
            cash_win: 0,
            other_mul: 1,
            tag: LineTag::Normal,
        }
    }

    /// Record a matched cell
    pub fn push_position(&mut self, x: usize, y: usize, is_wild: bool) {
        self.positions.push(x);
        self.positions.push(y);
        self.symbol_count += 1;
        if is_wild {
            self.wild_count += 1;
        }
    }

    /// Iterate matched cells as `(x, y)`
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.positions.chunks_exact(2).map(|p| (p[0], p[1]))
    }

    /// Price the result: `coin = pay × mul × other_mul`, `cash = coin × bet`
    pub fn price(&mut self, pay: i64, bet: i64) {
        self.coin_win = pay * self.mul * self.other_mul;
        self.cash_win = self.coin_win * bet;
    }

    pub fn is_win(&self) -> bool {
        self.coin_win > 0 || self.cash_win > 0
    }
}

/// Append-only log of one bet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayResult {
    pub stake: Stake,
    pub scenes: Vec<Arc<Scene>>,
    pub other_scenes: Vec<Arc<OtherScene>>,
    pub results: Vec<WinResult>,
    pub coin_win: i64,
    pub cash_win: i64,
    /// Names of the components that ran, in order
    pub history: Vec<String>,
    /// Respin cycles started during the bet
    pub respin_cycles: usize,
}

impl PlayResult {
    pub fn new(stake: Stake) -> Self {
        Self {
            stake,
            ..Self::default()
        }
    }

    /// Attach a scene, returning its index
    pub fn add_scene(&mut self, scene: Scene) -> usize {
        self.scenes.push(Arc::new(scene));
        self.scenes.len() - 1
    }

    pub fn add_other_scene(&mut self, scene: OtherScene) -> usize {
        self.other_scenes.push(Arc::new(scene));
        self.other_scenes.len() - 1
    }

    /// Attach a result and add its wins to the running totals
    pub fn add_result(&mut self, result: WinResult) -> usize {
        self.coin_win += result.coin_win;
        self.cash_win += result.cash_win;
        self.results.push(result);
        self.results.len() - 1
    }

    pub fn last_scene(&self) -> Option<(usize, Arc<Scene>)> {
        self.scenes
            .last()
            .map(|s| (self.scenes.len() - 1, Arc::clone(s)))
    }

    pub fn last_other_scene(&self) -> Option<(usize, Arc<OtherScene>)> {
        self.other_scenes
            .last()
            .map(|s| (self.other_scenes.len() - 1, Arc::clone(s)))
    }

    /// Copy of an attached scene for modification
    pub fn clone_scene(&self, index: usize) -> Option<Scene> {
        self.scenes.get(index).map(|s| Scene::clone(s))
    }

    /// Results recorded by a component during its last step
    pub fn results_of<'a>(&'a self, data: &'a ComponentData) -> impl Iterator<Item = &'a WinResult> + 'a {
        data.used_results.iter().filter_map(|&i| self.results.get(i))
    }

    /// Scenes recorded by a component during its last step
    pub fn scenes_of<'a>(&'a self, data: &'a ComponentData) -> impl Iterator<Item = &'a Scene> + 'a {
        data.used_scenes
            .iter()
            .filter_map(|&i| self.scenes.get(i).map(|s| s.as_ref()))
    }

    pub fn is_win(&self) -> bool {
        self.cash_win > 0
    }
}
