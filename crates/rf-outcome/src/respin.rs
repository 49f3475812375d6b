//! Respin Orchestrator
//!
//! A trigger that fires with a jump target decides how many respins to grant
//! and hands them to the target. The target is a respin component that loops
//! its main component until the granted count is spent.
//!
//! Count decision, first configured rule wins:
//!
//! ```text
//! weight_by_count[symbol_num]  → draw
//! fixed_by_count[symbol_num]   → value
//! weight                       → draw
//! fixed                        → value (0 when unset)
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::component::ComponentHandle;
use crate::error::{EngineError, EngineResult};
use crate::game::GameState;
use crate::random::RandomSource;
use crate::weights::WeightTable;

// ═══════════════════════════════════════════════════════════════════════════════
// COUNT RULE
// ═══════════════════════════════════════════════════════════════════════════════

/// How many respins a trigger grants
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RespinRule {
    pub weight_by_count: BTreeMap<usize, WeightTable<i64>>,
    pub fixed_by_count: BTreeMap<usize, i64>,
    pub weight: Option<WeightTable<i64>>,
    pub fixed: i64,
}

impl RespinRule {
    pub fn fixed(count: i64) -> Self {
        Self {
            fixed: count,
            ..Self::default()
        }
    }

    pub fn fixed_by_count(map: impl IntoIterator<Item = (usize, i64)>) -> Self {
        Self {
            fixed_by_count: map.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.weight_by_count.is_empty()
            && self.fixed_by_count.is_empty()
            && self.weight.is_none()
            && self.fixed == 0
    }
}

/// Resolve the respin count for `symbol_num` matched symbols
///
/// Returns the count and the selected weight index (-1 when nothing was drawn).
pub fn respin_count(
    rule: &RespinRule,
    symbol_num: usize,
    src: &mut dyn RandomSource,
    component: &str,
) -> EngineResult<(i64, i32)> {
    let unmapped = || EngineError::UnmappedSymbolCount {
        component: component.to_string(),
        count: symbol_num,
    };

    if !rule.weight_by_count.is_empty() {
        let table = rule.weight_by_count.get(&symbol_num).ok_or_else(unmapped)?;
        let (n, idx) = table.draw(src)?;
        return Ok((n, idx as i32));
    }
    if !rule.fixed_by_count.is_empty() {
        let n = rule.fixed_by_count.get(&symbol_num).ok_or_else(unmapped)?;
        return Ok((*n, -1));
    }
    if let Some(table) = &rule.weight {
        let (n, idx) = table.draw(src)?;
        return Ok((n, idx as i32));
    }
    Ok((rule.fixed, -1))
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESPIN COMPONENT
// ═══════════════════════════════════════════════════════════════════════════════

/// Respin-capable component: loops `main_component` while respins remain
#[derive(Debug, Clone, PartialEq)]
pub struct RespinNode {
    pub main_component: ComponentHandle,
}

/// Per-spin respin bookkeeping of one respin component
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RespinState {
    /// Count granted by the last non-zero trigger
    pub last_respin_num: i64,
    /// Remaining cycles
    pub cur_respin_num: i64,
    /// Cycles already run
    pub cur_times: i64,
    /// Coin win accumulated while the respin ran
    pub total_coin_win: i64,
    pub trigger_times: usize,
    /// Cycles added by retriggers while running
    pub retrigger_add: i64,
    #[serde(skip)]
    pub(crate) start_coin_win: i64,
}

impl RespinState {
    /// Grant `num` cycles; zero grants the carried-over count again
    pub fn trigger(&mut self, num: i64) {
        let add = if num > 0 {
            self.last_respin_num = num;
            num
        } else {
            self.last_respin_num
        };
        if add <= 0 {
            return;
        }

        self.cur_respin_num += add;
        if self.cur_times > 0 {
            self.retrigger_add += add;
        }
        self.trigger_times += 1;
    }

    pub fn is_started(&self) -> bool {
        self.cur_times > 0
    }

    pub fn is_ended(&self) -> bool {
        self.cur_respin_num == 0
    }
}

/// Hand a granted respin count to the jump target
///
/// `force_to_next` only suppresses the carried-over retrigger of a zero
/// count. A target left with pending cycles is queued on the respin stack,
/// so the spin cannot end before they run. Non-respin targets are only
/// jumped to, never triggered.
pub fn chain(
    state: &mut GameState<'_>,
    target: ComponentHandle,
    count: i64,
    force_to_next: bool,
) -> EngineResult<()> {
    let game = state.game();
    if !game.component(target)?.is_respin() {
        return Ok(());
    }

    let respin = &mut state.data_mut(target)?.respin;
    if count > 0 {
        log::debug!("{}: +{} respins", game.component(target)?.name, count);
        respin.trigger(count);
    } else if !force_to_next && respin.last_respin_num > 0 {
        log::debug!(
            "{}: retrigger with carried {}",
            game.component(target)?.name,
            respin.last_respin_num
        );
        respin.trigger(0);
    }

    if respin.cur_respin_num > 0 {
        state.enter_respin(target);
    }
    Ok(())
}
