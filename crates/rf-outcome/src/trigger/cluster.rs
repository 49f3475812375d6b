//! Cluster evaluation
//!
//! Flood fill from every unvisited target cell. Wilds join any cluster they
//! touch and may be shared between clusters of different symbols; a non-wild
//! cell belongs to exactly one cluster.

use std::collections::VecDeque;

use crate::grid::SymbolCode;
use crate::result::WinResult;

use super::{EvalContext, TriggerConfig};

const ORTHOGONAL: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const DIAGONAL: [(isize, isize); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

fn neighbours(cfg: &TriggerConfig) -> impl Iterator<Item = &'static (isize, isize)> {
    let diagonal: &'static [(isize, isize)] = if cfg.allow_diagonal { &DIAGONAL } else { &[] };
    ORTHOGONAL.iter().chain(diagonal.iter())
}

/// Cells of the region containing `(x, y)`, sorted by `(x, y)`
fn flood(cfg: &TriggerConfig, ctx: &EvalContext<'_>, symbol: SymbolCode, x: usize, y: usize, owned: &mut [Vec<bool>]) -> Vec<(usize, usize)> {
    let (w, h) = (ctx.scene.width(), ctx.scene.height());
    let mut in_region = vec![vec![false; h]; w];
    let mut region = Vec::new();
    let mut queue = VecDeque::from([(x, y)]);
    in_region[x][y] = true;

    while let Some((cx, cy)) = queue.pop_front() {
        region.push((cx, cy));
        if ctx.scene.get(cx, cy).is_some_and(|&c| !cfg.is_wild(c)) {
            owned[cx][cy] = true;
        }

        for &(dx, dy) in neighbours(cfg) {
            let (Some(nx), Some(ny)) = (cx.checked_add_signed(dx), cy.checked_add_signed(dy)) else {
                continue;
            };
            if nx >= w || ny >= h || in_region[nx][ny] {
                continue;
            }
            let Some(&cell) = ctx.scene.get(nx, ny) else {
                continue;
            };
            if cfg.matches(cell, symbol) && (cfg.is_wild(cell) || !owned[nx][ny]) {
                in_region[nx][ny] = true;
                queue.push_back((nx, ny));
            }
        }
    }

    region.sort_unstable();
    region
}

pub(super) fn evaluate(cfg: &TriggerConfig, ctx: &EvalContext<'_>) -> Vec<WinResult> {
    let targets = cfg.targets(ctx.paytable);
    let bet = ctx.stake.bet_for(cfg.bet_type);
    let mut owned = vec![vec![false; ctx.scene.height()]; ctx.scene.width()];
    let mut results = Vec::new();

    for x in 0..ctx.scene.width() {
        for y in 0..ctx.scene.height() {
            let Some(&symbol) = ctx.scene.get(x, y) else {
                continue;
            };
            if owned[x][y] || cfg.is_wild(symbol) || cfg.is_excluded(symbol) || !targets.contains(&symbol) {
                continue;
            }

            let region = flood(cfg, ctx, symbol, x, y, &mut owned);
            if region.len() < cfg.min_count() {
                continue;
            }
            let pay = ctx.paytable.pay(symbol, region.len());
            if pay <= 0 {
                continue;
            }

            let mut result = WinResult::new(cfg.kind, symbol);
            for &(rx, ry) in &region {
                let is_wild = ctx.scene.get(rx, ry).is_some_and(|&c| cfg.is_wild(c));
                result.push_position(rx, ry, is_wild);
            }
            if let Some((other, mode)) = ctx.other_for(cfg) {
                result.other_mul = mode.compose(
                    region.iter().map(|&(rx, ry)| other.get(rx, ry).copied().unwrap_or(0)),
                );
            }
            result.price(pay, bet);
            results.push(result);
        }
    }

    results
}
