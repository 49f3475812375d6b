//! Payline evaluation

use crate::grid::SymbolCode;
use crate::result::{LineTag, WinResult};

use super::{EvalContext, TriggerConfig, WinDirection};

/// A matched run along one scan of a line
#[derive(Debug, Clone, PartialEq, Eq)]
struct Run {
    symbol: SymbolCode,
    /// Number of cells, counted from the scan start
    len: usize,
}

/// Cells of a line in scan order, as `(x, y, symbol)`
///
/// The scan ends at the first row outside the grid; later reels are never
/// adjacent to earlier ones.
fn line_cells(ctx: &EvalContext<'_>, line: &[usize], reverse: bool) -> Vec<(usize, usize, SymbolCode)> {
    let mut order: Vec<usize> = (0..line.len()).collect();
    if reverse {
        order.reverse();
    }
    order
        .into_iter()
        .map_while(|x| ctx.scene.get(x, line[x]).map(|&s| (x, line[x], s)))
        .collect()
}

/// Candidate runs for one scan: the symbol run and, when the scan opens on
/// wilds, the pure-wild run
fn scan(cfg: &TriggerConfig, cells: &[(usize, usize, SymbolCode)]) -> (Option<Run>, Option<Run>) {
    let Some(&(_, _, first)) = cells.first() else {
        return (None, None);
    };
    if cfg.is_excluded(first) {
        return (None, None);
    }

    let wild_prefix = cells.iter().take_while(|c| cfg.is_wild(c.2)).count();
    let wild_run = (wild_prefix > 0).then(|| Run {
        symbol: first,
        len: wild_prefix,
    });

    let start = match cells.get(wild_prefix) {
        Some(&(_, _, s)) if !cfg.is_excluded(s) => s,
        _ => return (None, wild_run),
    };

    let len = cells.iter().take_while(|c| cfg.matches(c.2, start)).count();
    (Some(Run { symbol: start, len }), wild_run)
}

/// Pick the run to report for this scan
fn choose(cfg: &TriggerConfig, ctx: &EvalContext<'_>, targets: &[SymbolCode], cells: &[(usize, usize, SymbolCode)], check_only: bool) -> Option<Run> {
    let (symbol_run, wild_run) = scan(cfg, cells);
    let min = cfg.min_count();

    if check_only {
        return match symbol_run {
            Some(run) if targets.contains(&run.symbol) && run.len >= min => Some(run),
            // a line made only of wilds still signals
            None => wild_run.filter(|w| w.len == ctx.scene.width() && w.len >= min),
            _ => None,
        };
    }

    let priced = |run: &Run| {
        let pay = ctx.paytable.pay(run.symbol, run.len);
        (run.len >= min && pay > 0).then_some(pay)
    };

    let symbol_pay = symbol_run
        .as_ref()
        .filter(|r| targets.contains(&r.symbol))
        .and_then(|r| priced(r));
    let wild_pay = wild_run.as_ref().and_then(|r| priced(r));

    match (symbol_pay, wild_pay) {
        (Some(sp), Some(wp)) if wp > sp => wild_run,
        (Some(_), _) => symbol_run,
        (None, Some(_)) => wild_run,
        (None, None) => None,
    }
}

fn build_result(cfg: &TriggerConfig, ctx: &EvalContext<'_>, line_index: usize, cells: &[(usize, usize, SymbolCode)], run: &Run, check_only: bool) -> WinResult {
    let mut result = WinResult::new(cfg.kind, run.symbol);
    result.line_index = line_index as i32;
    for &(x, y, s) in &cells[..run.len] {
        result.push_position(x, y, cfg.is_wild(s));
    }
    if cfg.free_game_symbols.contains(&run.symbol) {
        result.tag = LineTag::FreeGame;
    }

    if let Some((other, mode)) = ctx.other_for(cfg) {
        result.other_mul = mode.compose(
            cells[..run.len]
                .iter()
                .map(|&(x, y, _)| other.get(x, y).copied().unwrap_or(0)),
        );
    }

    if !check_only {
        let pay = ctx.paytable.pay(run.symbol, run.len);
        result.price(pay, ctx.stake.bet_for(cfg.bet_type));
    }
    result
}

pub(super) fn evaluate(cfg: &TriggerConfig, ctx: &EvalContext<'_>, check_only: bool) -> Vec<WinResult> {
    let Some(lines) = ctx.lines else {
        log::warn!("{} trigger evaluated without a line set", cfg.kind);
        return Vec::new();
    };
    let width = ctx.scene.width();
    let targets = cfg.targets(ctx.paytable);
    let mut results = Vec::new();

    for (index, line) in lines.lines().iter().enumerate() {
        if line.len() != width {
            continue;
        }

        let (l2r, r2l) = match cfg.direction {
            WinDirection::LeftToRight => (true, false),
            WinDirection::RightToLeft => (false, true),
            WinDirection::All => (true, true),
        };

        if l2r {
            let cells = line_cells(ctx, line, false);
            if let Some(run) = choose(cfg, ctx, &targets, &cells, check_only) {
                results.push(build_result(cfg, ctx, index, &cells, &run, check_only));
            }
        }

        if r2l {
            let cells = line_cells(ctx, line, true);
            if let Some(run) = choose(cfg, ctx, &targets, &cells, check_only) {
                // full-width runs were already reported by the left scan
                if !(l2r && run.len == width) {
                    results.push(build_result(cfg, ctx, index, &cells, &run, check_only));
                }
            }
        }
    }

    results
}
