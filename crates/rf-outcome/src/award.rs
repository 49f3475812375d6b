//! Win multiplier and award dispatch
//!
//! The core never interprets an award. It guarantees only that awards reach
//! the [`AwardEffects`] engine in configured order, once per dispatch.

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::game::GameState;
use crate::random::RandomSource;
use crate::result::WinResult;
use crate::weights::WeightTable;

/// Override key for a component's win multiplier
pub const WIN_MULTI_KEY: &str = "winMulti";

/// An opaque award node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Award {
    #[serde(rename = "type")]
    pub award_type: String,
    #[serde(default)]
    pub vals: Vec<i64>,
    #[serde(default)]
    pub str_vals: Vec<String>,
}

impl Award {
    pub fn new(award_type: impl Into<String>) -> Self {
        Self {
            award_type: award_type.into(),
            vals: Vec::new(),
            str_vals: Vec::new(),
        }
    }

    pub fn with_vals(mut self, vals: Vec<i64>) -> Self {
        self.vals = vals;
        self
    }

    pub fn with_str_vals<S: Into<String>>(mut self, vals: impl IntoIterator<Item = S>) -> Self {
        self.str_vals = vals.into_iter().map(Into::into).collect();
        self
    }
}

/// Weighted choice between award sets, rolled once per matched symbol
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolAwards {
    /// Values are indices into `sets`
    pub weights: WeightTable<usize>,
    pub sets: Vec<Vec<Award>>,
}

/// Receiver of dispatched awards
pub trait AwardEffects {
    fn apply(
        &mut self,
        award: &Award,
        state: &mut GameState<'_>,
        src: &mut dyn RandomSource,
    ) -> EngineResult<()>;
}

impl<F> AwardEffects for F
where
    F: FnMut(&Award, &mut GameState<'_>, &mut dyn RandomSource) -> EngineResult<()>,
{
    fn apply(
        &mut self,
        award: &Award,
        state: &mut GameState<'_>,
        src: &mut dyn RandomSource,
    ) -> EngineResult<()> {
        self(award, state, src)
    }
}

/// Ignores every award
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAwards;

impl AwardEffects for NoopAwards {
    fn apply(&mut self, award: &Award, _: &mut GameState<'_>, _: &mut dyn RandomSource) -> EngineResult<()> {
        log::trace!("award {} ignored", award.award_type);
        Ok(())
    }
}

/// Multiply every result's wins and other multiplier; returns the coin total
pub fn apply_multiplier(results: &mut [WinResult], multi: i64) -> i64 {
    let mut wins = 0;
    for r in results.iter_mut() {
        if multi != 1 {
            r.coin_win *= multi;
            r.cash_win *= multi;
            r.other_mul *= multi;
        }
        wins += r.coin_win;
    }
    wins
}

/// Hand each award to the effects engine, in order
pub fn dispatch_awards(
    awards: &[Award],
    state: &mut GameState<'_>,
    src: &mut dyn RandomSource,
    effects: &mut dyn AwardEffects,
) -> EngineResult<()> {
    for award in awards {
        effects.apply(award, state, src)?;
    }
    Ok(())
}

/// Roll `rolls` award sets and dispatch each; returns the last selected index
pub fn dispatch_symbol_awards(
    symbol_awards: &SymbolAwards,
    rolls: usize,
    state: &mut GameState<'_>,
    src: &mut dyn RandomSource,
    effects: &mut dyn AwardEffects,
) -> EngineResult<Option<usize>> {
    let mut last = None;
    for _ in 0..rolls {
        let (set, _) = symbol_awards.weights.draw(src)?;
        if let Some(awards) = symbol_awards.sets.get(set) {
            dispatch_awards(awards, state, src, effects)?;
        }
        last = Some(set);
    }
    Ok(last)
}
