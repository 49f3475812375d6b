//! Ways evaluation
//!
//! For each candidate symbol on reel 0, count matching cells reel by reel
//! until a reel has none. The number of ways is the product of per-reel counts;
//! with an other-scene enabled, each matching cell counts `max(1, value)`.

use crate::grid::SymbolCode;
use crate::result::WinResult;

use super::{EvalContext, TriggerConfig};

/// Candidate symbols in reel-0 order; a wild on reel 0 opens every target
fn candidates(cfg: &TriggerConfig, ctx: &EvalContext<'_>, targets: &[SymbolCode]) -> Vec<SymbolCode> {
    let mut out: Vec<SymbolCode> = Vec::new();
    let mut opened_by_wild = false;

    for &cell in ctx.scene.column(0) {
        if cfg.is_excluded(cell) {
            continue;
        }
        if cfg.is_wild(cell) {
            opened_by_wild = true;
        } else if targets.contains(&cell) && !out.contains(&cell) {
            out.push(cell);
        }
    }

    if opened_by_wild {
        for &t in targets {
            if !out.contains(&t) {
                out.push(t);
            }
        }
    }
    out
}

pub(super) fn evaluate(cfg: &TriggerConfig, ctx: &EvalContext<'_>, check_only: bool) -> Vec<WinResult> {
    let targets = cfg.targets(ctx.paytable);
    let other = ctx.other_for(cfg).map(|(o, _)| o);
    let bet = ctx.stake.bet_for(cfg.bet_type);
    let mut results = Vec::new();

    for symbol in candidates(cfg, ctx, &targets) {
        let mut result = WinResult::new(cfg.kind, symbol);
        let mut run = 0usize;
        let mut ways = 1i64;
        let mut has_symbol = false;

        for x in 0..ctx.scene.width() {
            let mut column_ways = 0i64;
            for (y, &cell) in ctx.scene.column(x).iter().enumerate() {
                if !cfg.matches(cell, symbol) {
                    continue;
                }
                let is_wild = cfg.is_wild(cell);
                has_symbol |= !is_wild;
                result.push_position(x, y, is_wild);
                column_ways += other
                    .and_then(|o| o.get(x, y))
                    .map_or(1, |&v| v.max(1) as i64);
            }
            if column_ways == 0 {
                break;
            }
            ways *= column_ways;
            run += 1;
        }

        if !has_symbol || run < cfg.min_count() {
            continue;
        }

        if check_only {
            results.push(result);
            continue;
        }

        let pay = ctx.paytable.pay(symbol, run);
        if pay <= 0 {
            continue;
        }
        result.mul = ways;
        result.price(pay, bet);
        results.push(result);
    }

    results
}

#[cfg(test)]
mod tests {
    use crate::grid::{OtherScene, Scene};
    use crate::paytable::Paytable;
    use crate::result::Stake;
    use crate::trigger::{evaluate, CellMultiplier, EvalContext, TriggerConfig, TriggerKind};

    const WL: i32 = 0;
    const A: i32 = 1;
    const B: i32 = 2;
    const C: i32 = 3;
    const D: i32 = 4;

    fn paytable() -> Paytable {
        Paytable::new()
            .with_row(A, vec![0, 0, 5, 10, 20])
            .with_row(B, vec![0, 0, 2, 4, 8])
            .with_row(C, vec![0, 0, 1, 2, 3])
    }

    fn ways_cfg() -> TriggerConfig {
        TriggerConfig {
            wild_symbols: vec![WL],
            ..TriggerConfig::new(TriggerKind::Ways)
        }
    }

    #[test]
    fn test_ways_cross_product() {
        let scene = Scene::from_rows(vec![
            vec![A, A, A, D, C],
            vec![A, D, A, D, D],
            vec![D, D, D, C, D],
        ])
        .unwrap();
        let pt = paytable();
        let ctx = EvalContext::new(&scene, &pt, Stake::default());

        let eval = evaluate(&ways_cfg(), &ctx);
        assert_eq!(eval.results.len(), 1);
        let r = &eval.results[0];
        assert_eq!(r.symbol, A);
        // 2 × 1 × 2 ways of three A
        assert_eq!(r.mul, 4);
        assert_eq!(r.symbol_count, 5);
        assert_eq!(r.coin_win, 20);
        assert_eq!(r.positions.len(), 10);
    }

    #[test]
    fn test_wild_on_first_reel_opens_targets() {
        let scene = Scene::from_rows(vec![
            vec![WL, B, B, D, D],
            vec![D, D, WL, D, D],
            vec![D, D, D, D, D],
        ])
        .unwrap();
        let pt = paytable();
        let ctx = EvalContext::new(&scene, &pt, Stake::default());

        let eval = evaluate(&ways_cfg(), &ctx);
        assert_eq!(eval.results.len(), 1);
        let r = &eval.results[0];
        assert_eq!(r.symbol, B);
        assert_eq!(r.mul, 2);
        assert_eq!(r.wild_count, 2);
        assert_eq!(r.coin_win, 4);
    }

    #[test]
    fn test_wild_only_run_does_not_pay() {
        let scene = Scene::from_rows(vec![
            vec![WL, WL, WL, D, D],
            vec![D, D, D, D, D],
        ])
        .unwrap();
        let pt = paytable();
        let ctx = EvalContext::new(&scene, &pt, Stake::default());
        assert!(!evaluate(&ways_cfg(), &ctx).triggered);
    }

    #[test]
    fn test_other_scene_scales_ways() {
        let scene = Scene::from_rows(vec![vec![A, A, A, D, D], vec![D, A, D, D, D]]).unwrap();
        let mut other = OtherScene::new(5, 2);
        other.set(1, 1, 3);
        other.set(2, 0, 2);
        let pt = paytable();
        let ctx = EvalContext::new(&scene, &pt, Stake::default()).with_other_scene(&other);

        let cfg = TriggerConfig {
            other_mul: Some(CellMultiplier::Add),
            ..ways_cfg()
        };
        let r = &evaluate(&cfg, &ctx).results[0];
        // reel 1: 1 + 3, reel 2: 2
        assert_eq!(r.mul, 8);
        assert_eq!(r.coin_win, 40);

        let plain = &evaluate(&ways_cfg(), &ctx).results[0];
        assert_eq!(plain.mul, 2);
    }

    #[test]
    fn test_check_ways_min_run() {
        let scene = Scene::from_rows(vec![vec![C, C, C, C, D]]).unwrap();
        let pt = paytable();
        let ctx = EvalContext::new(&scene, &pt, Stake::default());
        let cfg = TriggerConfig {
            symbols: vec![C],
            min_num: 4,
            ..TriggerConfig::new(TriggerKind::CheckWays)
        };
        let eval = evaluate(&cfg, &ctx);
        assert!(eval.triggered);
        assert_eq!(eval.results[0].coin_win, 0);
        assert_eq!(eval.results[0].symbol_count, 4);

        let cfg = TriggerConfig { min_num: 5, ..cfg };
        assert!(!evaluate(&cfg, &ctx).triggered);
    }
}
