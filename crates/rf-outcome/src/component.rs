//! Component graph nodes
//!
//! A game is a graph of components addressed by [`ComponentHandle`]. Each
//! component owns one [`ComponentData`] slot in the per-spin arena; a step
//! resets the per-step part of it, runs, and names the next component.
//!
//! ```text
//! Reels ──▶ Trigger ──(jump)──▶ Respin ──main──▶ Reels ──▶ Trigger ──▶ …
//!              │                   │
//!              └──default next     └──default next when spent
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::award::{self, Award, AwardEffects, SymbolAwards, WIN_MULTI_KEY};
use crate::error::{EngineError, EngineResult};
use crate::game::{Game, GameState};
use crate::random::RandomSource;
use crate::reels::ReelsNode;
use crate::respin::{self, RespinNode, RespinRule, RespinState};
use crate::trigger::{self, EvalContext, TriggerConfig};

// ═══════════════════════════════════════════════════════════════════════════════
// HANDLES & OUTCOMES
// ═══════════════════════════════════════════════════════════════════════════════

/// Index of a component in its game, assigned at graph build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentHandle(pub usize);

impl ComponentHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ComponentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether a step changed anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Applied,
    /// Successful no-op
    NothingToDo,
}

/// Result of one component step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub next: Option<ComponentHandle>,
    pub status: StepStatus,
}

impl StepOutcome {
    pub fn applied(next: Option<ComponentHandle>) -> Self {
        Self {
            next,
            status: StepStatus::Applied,
        }
    }

    pub fn nothing_to_do(next: Option<ComponentHandle>) -> Self {
        Self {
            next,
            status: StepStatus::NothingToDo,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPONENT DATA
// ═══════════════════════════════════════════════════════════════════════════════

/// Per-spin mutable state of one component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentData {
    /// Indices into [`PlayResult::scenes`](crate::result::PlayResult)
    pub used_scenes: Vec<usize>,
    pub used_other_scenes: Vec<usize>,
    /// Indices into [`PlayResult::results`](crate::result::PlayResult)
    pub used_results: Vec<usize>,
    pub triggered: bool,
    pub symbol_num: usize,
    pub wild_num: usize,
    pub respin_num: i64,
    pub wins: i64,
    pub win_multi: i64,
    /// Per-step override of the next component
    pub next_component: Option<ComponentHandle>,
    /// Last weighted-table index drawn, -1 when none
    pub selected_index: i32,

    /// Overrides set by award effects; live for the whole spin
    pub config_overrides: HashMap<String, i64>,
    pub respin: RespinState,
    /// Steps that ran during the spin
    pub run_times: usize,
    /// Steps that triggered during the spin
    pub trigger_times: usize,
}

impl Default for ComponentData {
    fn default() -> Self {
        Self {
            used_scenes: Vec::new(),
            used_other_scenes: Vec::new(),
            used_results: Vec::new(),
            triggered: false,
            symbol_num: 0,
            wild_num: 0,
            respin_num: 0,
            wins: 0,
            win_multi: 1,
            next_component: None,
            selected_index: -1,
            config_overrides: HashMap::new(),
            respin: RespinState::default(),
            run_times: 0,
            trigger_times: 0,
        }
    }
}

impl ComponentData {
    /// Clear everything that describes a single step
    pub fn reset_step(&mut self) {
        self.used_scenes.clear();
        self.used_other_scenes.clear();
        self.used_results.clear();
        self.triggered = false;
        self.symbol_num = 0;
        self.wild_num = 0;
        self.respin_num = 0;
        self.wins = 0;
        self.win_multi = 1;
        self.next_component = None;
        self.selected_index = -1;
    }

    pub fn config_int(&self, key: &str) -> Option<i64> {
        self.config_overrides.get(key).copied()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPONENTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Trigger component configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerNode {
    pub rule: TriggerConfig,
    pub win_multi: i64,
    pub respin: RespinRule,
    pub jump_to: Option<ComponentHandle>,
    pub force_to_next: bool,
    pub awards: Vec<Award>,
    pub symbol_awards: Option<SymbolAwards>,
}

impl TriggerNode {
    pub fn new(rule: TriggerConfig) -> Self {
        Self {
            rule,
            win_multi: 1,
            respin: RespinRule::default(),
            jump_to: None,
            force_to_next: false,
            awards: Vec::new(),
            symbol_awards: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ComponentKind {
    Trigger(TriggerNode),
    Respin(RespinNode),
    Reels(ReelsNode),
}

impl ComponentKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Trigger(_) => "trigger",
            Self::Respin(_) => "respin",
            Self::Reels(_) => "reels",
        }
    }
}

/// A node of the game graph
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub name: String,
    pub handle: ComponentHandle,
    pub default_next: Option<ComponentHandle>,
    pub kind: ComponentKind,
}

/// Mutable inputs of a step
pub struct StepContext<'s, 'g> {
    pub state: &'s mut GameState<'g>,
    pub src: &'s mut dyn RandomSource,
    pub effects: &'s mut dyn AwardEffects,
}

impl Component {
    pub fn is_respin(&self) -> bool {
        matches!(self.kind, ComponentKind::Respin(_))
    }

    /// Run one step
    pub fn step(&self, ctx: &mut StepContext<'_, '_>) -> EngineResult<StepOutcome> {
        let data = ctx.state.data_mut(self.handle)?;
        data.reset_step();
        data.run_times += 1;

        match &self.kind {
            ComponentKind::Trigger(node) => self.step_trigger(node, ctx),
            ComponentKind::Respin(node) => self.step_respin(node, ctx),
            ComponentKind::Reels(node) => {
                node.step(self, ctx)?;
                Ok(StepOutcome::applied(self.resolve_next(ctx.state)?))
            }
        }
    }

    fn resolve_next(&self, state: &GameState<'_>) -> EngineResult<Option<ComponentHandle>> {
        Ok(state.data(self.handle)?.next_component.or(self.default_next))
    }

    fn step_trigger(&self, node: &TriggerNode, ctx: &mut StepContext<'_, '_>) -> EngineResult<StepOutcome> {
        let game: &Game = ctx.state.game();
        let play = ctx.state.play();
        let (scene_index, scene) = play
            .last_scene()
            .ok_or_else(|| EngineError::NoScene(self.name.clone()))?;
        let other = node
            .rule
            .other_mul
            .and_then(|_| play.last_other_scene());

        let mut eval_ctx = EvalContext::new(&scene, &game.paytable, play.stake);
        if let Some(lines) = &game.lines {
            eval_ctx = eval_ctx.with_lines(lines);
        }
        if let Some((_, other)) = &other {
            eval_ctx = eval_ctx.with_other_scene(other);
        }

        let mut eval = trigger::evaluate(&node.rule, &eval_ctx);
        if !eval.triggered {
            return Ok(StepOutcome::nothing_to_do(self.default_next));
        }

        let symbol_num = eval.symbol_num();
        let wild_num = eval.wild_num();
        let multi = ctx
            .state
            .data(self.handle)?
            .config_int(WIN_MULTI_KEY)
            .unwrap_or(node.win_multi);
        let wins = award::apply_multiplier(&mut eval.results, multi);
        log::debug!(
            "{}: {} triggered, {} results, symbol_num {}, wins {}",
            self.name,
            node.rule.kind,
            eval.results.len(),
            symbol_num,
            wins
        );

        let result_indices: Vec<usize> = eval
            .results
            .into_iter()
            .map(|r| ctx.state.play_mut().add_result(r))
            .collect();
        {
            let data = ctx.state.data_mut(self.handle)?;
            data.triggered = true;
            data.trigger_times += 1;
            data.symbol_num = symbol_num;
            data.wild_num = wild_num;
            data.win_multi = multi;
            data.wins = wins;
            data.used_scenes.push(scene_index);
            if let Some((other_index, _)) = other {
                data.used_other_scenes.push(other_index);
            }
            data.used_results = result_indices;
        }

        award::dispatch_awards(&node.awards, ctx.state, ctx.src, ctx.effects)?;
        if let Some(symbol_awards) = &node.symbol_awards {
            if let Some(set) =
                award::dispatch_symbol_awards(symbol_awards, symbol_num, ctx.state, ctx.src, ctx.effects)?
            {
                ctx.state.data_mut(self.handle)?.selected_index = set as i32;
            }
        }

        if let Some(target) = node.jump_to {
            let (count, selected) = respin::respin_count(&node.respin, symbol_num, ctx.src, &self.name)?;
            {
                let data = ctx.state.data_mut(self.handle)?;
                data.respin_num = count;
                if selected >= 0 {
                    data.selected_index = selected;
                }
            }
            respin::chain(ctx.state, target, count, node.force_to_next)?;
            if count > 0 || !node.force_to_next {
                ctx.state.data_mut(self.handle)?.next_component = Some(target);
            }
        }

        Ok(StepOutcome::applied(self.resolve_next(ctx.state)?))
    }

    fn step_respin(&self, node: &RespinNode, ctx: &mut StepContext<'_, '_>) -> EngineResult<StepOutcome> {
        let coin_win = ctx.state.play().coin_win;
        let data = ctx.state.data_mut(self.handle)?;

        if data.respin.cur_respin_num > 0 {
            if !data.respin.is_started() {
                data.respin.start_coin_win = coin_win;
            }
            data.respin.cur_respin_num -= 1;
            data.respin.cur_times += 1;
            data.respin_num = data.respin.cur_respin_num;
            log::debug!(
                "{}: cycle {} ({} left)",
                self.name,
                data.respin.cur_times,
                data.respin.cur_respin_num
            );

            ctx.state.enter_respin(self.handle);
            ctx.state.play_mut().respin_cycles += 1;
            ctx.state.data_mut(self.handle)?.next_component = Some(node.main_component);
            return Ok(StepOutcome::applied(self.resolve_next(ctx.state)?));
        }

        if data.respin.is_started() {
            data.respin.total_coin_win = coin_win - data.respin.start_coin_win;
            log::debug!(
                "{}: ended after {} cycles, won {}",
                self.name,
                data.respin.cur_times,
                data.respin.total_coin_win
            );
            ctx.state.leave_respin(self.handle);
            return Ok(StepOutcome::applied(self.default_next));
        }

        ctx.state.leave_respin(self.handle);
        Ok(StepOutcome::nothing_to_do(self.default_next))
    }
}
