//! Game graph and executor
//!
//! [`Game`] is immutable after build and shared read-only (wrap it in an
//! `Arc` to share across threads). Every spin gets its own [`GameState`]:
//! the play result, the component data arena and the respin stack.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::award::AwardEffects;
use crate::component::{Component, ComponentData, ComponentHandle, ComponentKind, StepContext, StepStatus};
use crate::error::{ConfigError, ConfigResult, EngineError, EngineResult};
use crate::grid::Scene;
use crate::paytable::{LineSet, Paytable, SymbolTable};
use crate::random::RandomSource;
use crate::reels::ReelSet;
use crate::result::{PlayResult, Stake};

/// Default bound on component steps per spin
pub const DEFAULT_MAX_STEPS: usize = 10_000;

// ═══════════════════════════════════════════════════════════════════════════════
// GAME
// ═══════════════════════════════════════════════════════════════════════════════

/// A built game: tables plus the component graph
#[derive(Debug, Clone)]
pub struct Game {
    pub name: String,
    pub symbols: SymbolTable,
    pub paytable: Paytable,
    pub lines: Option<LineSet>,
    pub reel_sets: HashMap<String, ReelSet>,
    pub max_steps: usize,
    components: Vec<Component>,
    names: HashMap<String, ComponentHandle>,
    entry: ComponentHandle,
}

impl Game {
    pub fn component(&self, handle: ComponentHandle) -> EngineResult<&Component> {
        self.components
            .get(handle.index())
            .ok_or(EngineError::InvalidHandle(handle.index()))
    }

    pub fn handle(&self, name: &str) -> Option<ComponentHandle> {
        self.names.get(name).copied()
    }

    pub fn component_by_name(&self, name: &str) -> EngineResult<&Component> {
        let handle = self
            .handle(name)
            .ok_or_else(|| EngineError::UnknownComponent(name.to_string()))?;
        self.component(handle)
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn entry(&self) -> ComponentHandle {
        self.entry
    }

    /// Play one bet
    ///
    /// `scene` seeds the play result; leave it `None` when the entry component
    /// generates grids itself.
    pub fn play(
        &self,
        stake: Stake,
        scene: Option<Scene>,
        src: &mut dyn RandomSource,
        effects: &mut dyn AwardEffects,
    ) -> EngineResult<PlayResult> {
        let mut state = GameState::new(self, stake);
        if let Some(scene) = scene {
            state.play_mut().add_scene(scene);
        }
        self.run(&mut state, src, effects)?;
        Ok(state.into_play_result())
    }

    /// Walk the graph from the entry component on a prepared state
    pub fn run(
        &self,
        state: &mut GameState<'_>,
        src: &mut dyn RandomSource,
        effects: &mut dyn AwardEffects,
    ) -> EngineResult<()> {
        let mut current = Some(self.entry);
        let mut steps = 0usize;

        while let Some(handle) = current {
            steps += 1;
            if steps > self.max_steps {
                return Err(EngineError::StepLimitExceeded(self.max_steps));
            }

            let component = self.component(handle)?;
            state.play_mut().history.push(component.name.clone());

            let outcome = component.step(&mut StepContext {
                state: &mut *state,
                src: &mut *src,
                effects: &mut *effects,
            })?;
            if outcome.status == StepStatus::NothingToDo {
                log::trace!("{}: nothing to do", component.name);
            }

            current = outcome.next.or_else(|| state.active_respin());
        }

        log::debug!(
            "{}: spin done in {} steps, coin win {}",
            self.name,
            steps,
            state.play().coin_win
        );
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BUILDER
// ═══════════════════════════════════════════════════════════════════════════════

struct Slot {
    name: String,
    kind: Option<ComponentKind>,
    default_next: Option<ComponentHandle>,
}

/// Assembles a [`Game`]
///
/// Components are declared first so that forward references (a trigger
/// jumping to a respin defined later) resolve to handles.
pub struct GameBuilder {
    name: String,
    symbols: SymbolTable,
    paytable: Paytable,
    lines: Option<LineSet>,
    reel_sets: HashMap<String, ReelSet>,
    max_steps: usize,
    slots: Vec<Slot>,
    names: HashMap<String, ComponentHandle>,
    entry: Option<ComponentHandle>,
}

impl GameBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbols: SymbolTable::default(),
            paytable: Paytable::new(),
            lines: None,
            reel_sets: HashMap::new(),
            max_steps: DEFAULT_MAX_STEPS,
            slots: Vec::new(),
            names: HashMap::new(),
            entry: None,
        }
    }

    pub fn symbols(mut self, symbols: SymbolTable) -> Self {
        self.symbols = symbols;
        self
    }

    pub fn paytable(mut self, paytable: Paytable) -> Self {
        self.paytable = paytable;
        self
    }

    pub fn lines(mut self, lines: LineSet) -> Self {
        self.lines = Some(lines);
        self
    }

    pub fn reel_set(mut self, name: impl Into<String>, reels: ReelSet) -> Self {
        self.reel_sets.insert(name.into(), reels);
        self
    }

    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Reserve a handle for `name`
    pub fn declare(&mut self, name: &str) -> ConfigResult<ComponentHandle> {
        if self.names.contains_key(name) {
            return Err(ConfigError::DuplicateComponent(name.to_string()));
        }
        let handle = ComponentHandle(self.slots.len());
        self.slots.push(Slot {
            name: name.to_string(),
            kind: None,
            default_next: None,
        });
        self.names.insert(name.to_string(), handle);
        Ok(handle)
    }

    /// Give a declared component its configuration
    pub fn define(
        &mut self,
        handle: ComponentHandle,
        kind: ComponentKind,
        default_next: Option<ComponentHandle>,
    ) -> ConfigResult<()> {
        let slot = self
            .slots
            .get_mut(handle.index())
            .ok_or_else(|| ConfigError::UnknownComponent(handle.to_string()))?;
        slot.kind = Some(kind);
        slot.default_next = default_next;
        Ok(())
    }

    /// Declare and define in one go
    pub fn add(
        &mut self,
        name: &str,
        kind: ComponentKind,
        default_next: Option<ComponentHandle>,
    ) -> ConfigResult<ComponentHandle> {
        let handle = self.declare(name)?;
        self.define(handle, kind, default_next)?;
        Ok(handle)
    }

    pub fn handle(&self, name: &str) -> ConfigResult<ComponentHandle> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| ConfigError::UnknownComponent(name.to_string()))
    }

    /// Entry component; defaults to the first declared
    pub fn entry(&mut self, handle: ComponentHandle) {
        self.entry = Some(handle);
    }

    pub fn build(self) -> ConfigResult<Game> {
        let count = self.slots.len();
        let check = |h: Option<ComponentHandle>, owner: &str| -> ConfigResult<()> {
            match h {
                Some(h) if h.index() >= count => Err(ConfigError::UnknownComponent(format!("{owner} -> {h}"))),
                _ => Ok(()),
            }
        };

        let mut components = Vec::with_capacity(count);
        for (index, slot) in self.slots.into_iter().enumerate() {
            let kind = slot
                .kind
                .ok_or_else(|| ConfigError::Validation(format!("component {} declared but never defined", slot.name)))?;
            check(slot.default_next, &slot.name)?;

            match &kind {
                ComponentKind::Trigger(node) => {
                    check(node.jump_to, &slot.name)?;
                    if node.rule.kind.needs_lines() && self.lines.as_ref().is_none_or(|l| l.is_empty()) {
                        return Err(ConfigError::MissingLines(slot.name));
                    }
                }
                ComponentKind::Respin(node) => check(Some(node.main_component), &slot.name)?,
                ComponentKind::Reels(node) => {
                    if let Some(missing) = node.reel_sets.values().iter().find(|n| !self.reel_sets.contains_key(*n)) {
                        return Err(ConfigError::UnknownReelSet(missing.clone()));
                    }
                }
            }

            components.push(Component {
                name: slot.name,
                handle: ComponentHandle(index),
                default_next: slot.default_next,
                kind,
            });
        }

        if components.is_empty() {
            return Err(ConfigError::Validation("game has no components".to_string()));
        }
        let entry = self.entry.unwrap_or(ComponentHandle(0));
        check(Some(entry), "entry")?;

        warn_unreachable(&self.name, &components, entry);

        Ok(Game {
            name: self.name,
            symbols: self.symbols,
            paytable: self.paytable,
            lines: self.lines,
            reel_sets: self.reel_sets,
            max_steps: self.max_steps,
            components,
            names: self.names,
            entry,
        })
    }
}

fn warn_unreachable(game: &str, components: &[Component], entry: ComponentHandle) {
    let mut seen = vec![false; components.len()];
    let mut stack = vec![entry];
    while let Some(h) = stack.pop() {
        if std::mem::replace(&mut seen[h.index()], true) {
            continue;
        }
        let c = &components[h.index()];
        stack.extend(c.default_next);
        match &c.kind {
            ComponentKind::Trigger(node) => stack.extend(node.jump_to),
            ComponentKind::Respin(node) => stack.push(node.main_component),
            ComponentKind::Reels(_) => {}
        }
    }
    for c in components.iter().filter(|c| !seen[c.handle.index()]) {
        log::warn!("{}: component {} is unreachable from the entry", game, c.name);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PER-SPIN STATE
// ═══════════════════════════════════════════════════════════════════════════════

/// Everything one spin mutates
#[derive(Debug)]
pub struct GameState<'g> {
    game: &'g Game,
    play: PlayResult,
    data: Vec<ComponentData>,
    respin_stack: Vec<ComponentHandle>,
}

impl<'g> GameState<'g> {
    pub fn new(game: &'g Game, stake: Stake) -> Self {
        Self {
            game,
            play: PlayResult::new(stake),
            data: vec![ComponentData::default(); game.components.len()],
            respin_stack: Vec::new(),
        }
    }

    pub fn game(&self) -> &'g Game {
        self.game
    }

    pub fn play(&self) -> &PlayResult {
        &self.play
    }

    pub fn play_mut(&mut self) -> &mut PlayResult {
        &mut self.play
    }

    pub fn into_play_result(self) -> PlayResult {
        self.play
    }

    pub fn data(&self, handle: ComponentHandle) -> EngineResult<&ComponentData> {
        self.data
            .get(handle.index())
            .ok_or(EngineError::InvalidHandle(handle.index()))
    }

    pub fn data_mut(&mut self, handle: ComponentHandle) -> EngineResult<&mut ComponentData> {
        self.data
            .get_mut(handle.index())
            .ok_or(EngineError::InvalidHandle(handle.index()))
    }

    /// Data of a component looked up by name
    pub fn data_by_name(&self, name: &str) -> EngineResult<&ComponentData> {
        let handle = self
            .game
            .handle(name)
            .ok_or_else(|| EngineError::UnknownComponent(name.to_string()))?;
        self.data(handle)
    }

    /// Override an integer setting of a component for the rest of the spin
    pub fn set_config_override(&mut self, component: &str, key: &str, value: i64) -> EngineResult<()> {
        let handle = self
            .game
            .handle(component)
            .ok_or_else(|| EngineError::UnknownComponent(component.to_string()))?;
        self.data_mut(handle)?
            .config_overrides
            .insert(key.to_string(), value);
        Ok(())
    }

    /// Grant respins to a respin component, as a trigger jump would
    pub fn add_respin(&mut self, component: &str, count: i64) -> EngineResult<()> {
        let handle = self
            .game
            .handle(component)
            .ok_or_else(|| EngineError::UnknownComponent(component.to_string()))?;
        crate::respin::chain(self, handle, count, false)
    }

    /// Innermost respin component still running
    pub fn active_respin(&self) -> Option<ComponentHandle> {
        self.respin_stack.last().copied()
    }

    pub(crate) fn enter_respin(&mut self, handle: ComponentHandle) {
        if !self.respin_stack.contains(&handle) {
            self.respin_stack.push(handle);
        }
    }

    pub(crate) fn leave_respin(&mut self, handle: ComponentHandle) {
        self.respin_stack.retain(|&h| h != handle);
    }

    /// Component data keyed by component name, for replay logs
    pub fn snapshot(&self) -> serde_json::Result<Value> {
        let mut map = Map::new();
        for (component, data) in self.game.components.iter().zip(&self.data) {
            map.insert(component.name.clone(), serde_json::to_value(data)?);
        }
        Ok(Value::Object(map))
    }
}
