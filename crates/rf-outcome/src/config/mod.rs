//! Configuration Loader: game documents into a validated [`Game`]
//!
//! ## Supported Formats
//!
//! - YAML (`.yaml`, `.yml`)
//! - JSON (`.json`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! let loader = ConfigLoader::new();
//! let game = loader.load_file("games/moonlight.yaml")?;
//! ```
//!
//! Every failure is reported here, before the first spin. The only
//! configuration problem that can surface mid-spin is a symbol count missing
//! from a respin count map.

mod document;

pub use document::*;

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::award::SymbolAwards;
use crate::component::{ComponentKind, TriggerNode};
use crate::error::{ConfigError, ConfigResult};
use crate::game::{Game, GameBuilder};
use crate::grid::SymbolCode;
use crate::paytable::{LineSet, Paytable, SymbolTable};
use crate::reels::{ReelSet, ReelsNode};
use crate::respin::{RespinNode, RespinRule};
use crate::trigger::{BetType, TriggerConfig, TriggerKind, WinDirection};
use crate::weights::WeightTable;

/// Document size limits
#[derive(Debug, Clone)]
pub struct ConfigLimits {
    pub max_name_length: usize,
    pub max_symbols: usize,
    pub max_lines: usize,
    pub max_components: usize,
    pub max_reels: usize,
    pub max_rows: usize,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            max_name_length: 256,
            max_symbols: 256,
            max_lines: 1024,
            max_components: 512,
            max_reels: 16,
            max_rows: 16,
        }
    }
}

/// Parses, validates and resolves game documents
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    pub limits: ConfigLimits,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: ConfigLimits) -> Self {
        Self { limits }
    }

    pub fn parse_yaml(&self, yaml: &str) -> ConfigResult<Game> {
        let doc: GameDocument = serde_yml::from_str(yaml)?;
        self.load_document(doc)
    }

    pub fn parse_json(&self, json: &str) -> ConfigResult<Game> {
        let doc: GameDocument = serde_json::from_str(json)?;
        self.load_document(doc)
    }

    /// Load by extension; anything but `.json` is read as YAML
    pub fn load_file(&self, path: impl AsRef<Path>) -> ConfigResult<Game> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        log::info!("loading game from {}", path.display());
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => self.parse_json(&text),
            _ => self.parse_yaml(&text),
        }
    }

    pub fn load_document(&self, doc: GameDocument) -> ConfigResult<Game> {
        self.validate(&doc)?;
        Resolver::new(&doc)?.build(&doc)
    }

    /// Check document sizes
    pub fn validate(&self, doc: &GameDocument) -> ConfigResult<()> {
        let limits = &self.limits;
        let too_many = |what: &str, n: usize, max: usize| {
            ConfigError::Validation(format!("too many {what}: {n} > {max}"))
        };

        if doc.name.len() > limits.max_name_length {
            return Err(ConfigError::Validation(format!(
                "game name too long: {} > {}",
                doc.name.len(),
                limits.max_name_length
            )));
        }
        if doc.symbols.is_empty() {
            return Err(ConfigError::Validation("no symbols".to_string()));
        }
        if doc.symbols.len() > limits.max_symbols {
            return Err(too_many("symbols", doc.symbols.len(), limits.max_symbols));
        }
        if doc.lines.len() > limits.max_lines {
            return Err(too_many("lines", doc.lines.len(), limits.max_lines));
        }
        if doc.components.is_empty() {
            return Err(ConfigError::Validation("no components".to_string()));
        }
        if doc.components.len() > limits.max_components {
            return Err(too_many("components", doc.components.len(), limits.max_components));
        }

        for line in &doc.lines {
            if line.len() > limits.max_reels || line.iter().any(|&row| row >= limits.max_rows) {
                return Err(ConfigError::Validation(format!("line {line:?} exceeds the grid limits")));
            }
        }
        for (name, reels) in &doc.reel_sets {
            if reels.is_empty() || reels.len() > limits.max_reels {
                return Err(ConfigError::Validation(format!("reel set {name}: {} reels", reels.len())));
            }
            if reels.iter().any(Vec::is_empty) {
                return Err(ConfigError::Validation(format!("reel set {name} has an empty strip")));
            }
        }
        for c in &doc.components {
            if let ComponentKindDocument::Reels(reels) = &c.kind {
                if reels.height == 0 || reels.height > limits.max_rows {
                    return Err(ConfigError::Validation(format!("component {}: height {}", c.name, reels.height)));
                }
                if let Some(line) = doc.lines.iter().find(|l| l.iter().any(|&row| row >= reels.height)) {
                    return Err(ConfigError::Validation(format!(
                        "line {line:?} does not fit component {} of height {}",
                        c.name, reels.height
                    )));
                }
            }
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESOLUTION
// ═══════════════════════════════════════════════════════════════════════════════

struct Resolver {
    symbols: SymbolTable,
}

impl Resolver {
    fn new(doc: &GameDocument) -> ConfigResult<Self> {
        let mut seen = HashSet::new();
        if let Some(dup) = doc.symbols.iter().find(|s| !seen.insert(s.as_str())) {
            return Err(ConfigError::Validation(format!("duplicate symbol {dup}")));
        }
        Ok(Self {
            symbols: SymbolTable::new(doc.symbols.iter().cloned()),
        })
    }

    fn symbol(&self, name: &str) -> ConfigResult<SymbolCode> {
        self.symbols
            .code(name)
            .ok_or_else(|| ConfigError::UnknownSymbol(name.to_string()))
    }

    fn symbol_list(&self, names: &[String]) -> ConfigResult<Vec<SymbolCode>> {
        names.iter().map(|n| self.symbol(n)).collect()
    }

    fn build(self, doc: &GameDocument) -> ConfigResult<Game> {
        let mut paytable = Paytable::new();
        for (name, pays) in &doc.paytable {
            paytable.set_row(self.symbol(name)?, pays.clone());
        }

        let mut builder = GameBuilder::new(doc.name.clone()).paytable(paytable);
        if let Some(max_steps) = doc.max_steps {
            builder = builder.max_steps(max_steps);
        }
        if !doc.lines.is_empty() {
            builder = builder.lines(LineSet::new(doc.lines.clone()));
        }
        for (name, strips) in &doc.reel_sets {
            let reels = strips
                .iter()
                .map(|strip| self.symbol_list(strip))
                .collect::<ConfigResult<Vec<_>>>()?;
            builder = builder.reel_set(name.clone(), ReelSet::new(reels));
        }

        for c in &doc.components {
            builder.declare(&c.name)?;
        }
        for c in &doc.components {
            let handle = builder.handle(&c.name)?;
            let next = c.next.as_deref().map(|n| builder.handle(n)).transpose()?;
            let kind = match &c.kind {
                ComponentKindDocument::Trigger(t) => ComponentKind::Trigger(self.trigger(&c.name, t, &builder)?),
                ComponentKindDocument::Respin(r) => ComponentKind::Respin(RespinNode {
                    main_component: builder.handle(&r.main_component)?,
                }),
                ComponentKindDocument::Reels(r) => ComponentKind::Reels(reels_node(&c.name, r)?),
            };
            builder.define(handle, kind, next)?;
        }
        if let Some(entry) = &doc.entry {
            let handle = builder.handle(entry)?;
            builder.entry(handle);
        }

        let game = builder.symbols(self.symbols).build()?;
        log::info!(
            "game {} loaded: {} symbols, {} components",
            game.name,
            game.symbols.len(),
            game.components().len()
        );
        Ok(game)
    }

    fn trigger(&self, component: &str, t: &TriggerDocument, builder: &GameBuilder) -> ConfigResult<TriggerNode> {
        let kind: TriggerKind = t.trigger_type.parse()?;
        let rule = TriggerConfig {
            kind,
            symbols: self.symbol_list(&t.symbols)?,
            wild_symbols: self.symbol_list(&t.wild_symbols)?,
            exclude_symbols: self.symbol_list(&t.exclude_symbols)?,
            free_game_symbols: self.symbol_list(&t.free_game_symbols)?,
            bet_type: t.bet_type.as_deref().map(str::parse::<BetType>).transpose()?.unwrap_or_default(),
            min_num: t.min_num,
            direction: t.direction.as_deref().map(str::parse::<WinDirection>).transpose()?.unwrap_or_default(),
            pay_as: t.pay_as.as_deref().map(|s| self.symbol(s)).transpose()?,
            area: t.area,
            allow_diagonal: t.allow_diagonal,
            other_mul: t.other_mul,
            is_reverse: t.is_reverse,
        };
        if kind == TriggerKind::CountScatterInArea && rule.area.is_none() {
            return Err(ConfigError::Validation(format!("component {component}: countscatterInArea needs an area")));
        }

        let symbol_awards = match &t.symbol_awards {
            Some(sa) => {
                if sa.sets.len() != sa.weights.len() {
                    return Err(ConfigError::Validation(format!(
                        "component {component}: {} award sets but {} weights",
                        sa.sets.len(),
                        sa.weights.len()
                    )));
                }
                let weights = weight_table(sa.weights.iter().copied().enumerate().collect(), || {
                    format!("{component}.symbolAwards")
                })?;
                Some(SymbolAwards {
                    weights,
                    sets: sa.sets.clone(),
                })
            }
            None => None,
        };

        Ok(TriggerNode {
            rule,
            win_multi: t.win_multi.unwrap_or(1),
            respin: respin_rule(component, t)?,
            jump_to: t.jump_to_component.as_deref().map(|n| builder.handle(n)).transpose()?,
            force_to_next: t.force_to_next,
            awards: t.awards.clone(),
            symbol_awards,
        })
    }
}

/// Build a weighted table that can be drawn from
fn weight_table<T: Clone>(pairs: Vec<(T, u64)>, context: impl FnOnce() -> String) -> ConfigResult<WeightTable<T>> {
    match WeightTable::try_from(pairs) {
        Ok(table) if table.total_weight() > 0 => Ok(table),
        Ok(_) => Err(ConfigError::EmptyWeightTable(context())),
        Err(_) => Err(ConfigError::WeightOverflow(context())),
    }
}

fn respin_rule(component: &str, t: &TriggerDocument) -> ConfigResult<RespinRule> {
    let invalid = |entry: String| ConfigError::InvalidRespinEntry {
        component: component.to_string(),
        entry,
    };

    let mut weight_by_count = BTreeMap::new();
    for (&CountKey(count), pairs) in &t.respin_num_weight_with_scatter_num {
        if count == 0 || pairs.iter().any(|&(n, _)| n < 0) {
            return Err(invalid(format!("{count}: {pairs:?}")));
        }
        let table = weight_table(pairs.clone(), || {
            format!("{component}.respinNumWeightWithScatterNum[{count}]")
        })?;
        weight_by_count.insert(count, table);
    }

    let mut fixed_by_count = BTreeMap::new();
    for (&CountKey(count), &n) in &t.respin_num_with_scatter_num {
        if count == 0 || n < 0 {
            return Err(invalid(format!("{count}: {n}")));
        }
        fixed_by_count.insert(count, n);
    }

    let weight = if t.respin_num_weight.is_empty() {
        None
    } else {
        if t.respin_num_weight.iter().any(|&(n, _)| n < 0) {
            return Err(invalid(format!("{:?}", t.respin_num_weight)));
        }
        Some(weight_table(t.respin_num_weight.clone(), || format!("{component}.respinNumWeight"))?)
    };

    if t.respin_num < 0 {
        return Err(invalid(t.respin_num.to_string()));
    }
    if !weight_by_count.is_empty() && !fixed_by_count.is_empty() {
        log::warn!("component {component}: weighted respin map shadows the fixed one");
    }

    Ok(RespinRule {
        weight_by_count,
        fixed_by_count,
        weight,
        fixed: t.respin_num,
    })
}

fn reels_node(component: &str, r: &ReelsDocument) -> ConfigResult<ReelsNode> {
    let reel_sets: WeightTable<String> = if r.reel_set_weights.is_empty() {
        let name = r
            .reel_set
            .clone()
            .ok_or_else(|| ConfigError::Validation(format!("component {component}: no reel set")))?;
        WeightTable::single(name)
    } else {
        weight_table(r.reel_set_weights.clone(), || format!("{component}.reelSetWeights"))?
    };

    let multipliers = if r.multipliers.is_empty() {
        None
    } else {
        Some(weight_table(r.multipliers.clone(), || format!("{component}.multipliers"))?)
    };

    Ok(ReelsNode {
        reel_sets,
        height: r.height,
        multipliers,
    })
}
