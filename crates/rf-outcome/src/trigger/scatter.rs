//! Scatter counting

use crate::grid::SymbolCode;
use crate::result::WinResult;

use super::{Area, EvalContext, TriggerConfig};

fn other_mul(cfg: &TriggerConfig, ctx: &EvalContext<'_>, result: &WinResult) -> i64 {
    match ctx.other_for(cfg) {
        Some((other, mode)) => {
            mode.compose(result.cells().map(|(x, y)| other.get(x, y).copied().unwrap_or(0)))
        }
        None => 1,
    }
}

/// One priced result per target symbol reaching `min_num`
pub(super) fn evaluate_per_symbol(cfg: &TriggerConfig, ctx: &EvalContext<'_>) -> Vec<WinResult> {
    let bet = ctx.stake.bet_for(cfg.bet_type);
    let mut results = Vec::new();

    for symbol in cfg.targets(ctx.paytable) {
        let mut result = WinResult::new(cfg.kind, symbol);
        for (x, y, &cell) in ctx.scene.iter() {
            if cfg.matches(cell, symbol) {
                result.push_position(x, y, cell != symbol);
            }
        }

        if result.symbol_count < cfg.min_count() {
            continue;
        }
        let pay = ctx.paytable.pay(cfg.pay_as.unwrap_or(symbol), result.symbol_count);
        if pay <= 0 {
            continue;
        }
        result.other_mul = other_mul(cfg, ctx, &result);
        result.price(pay, bet);
        results.push(result);
    }

    results
}

/// All targets counted together, optionally inside an area
pub(super) fn evaluate_count(cfg: &TriggerConfig, ctx: &EvalContext<'_>, area: Option<Area>) -> Vec<WinResult> {
    let targets = cfg.targets(ctx.paytable);
    let Some(&first) = targets.first() else {
        return Vec::new();
    };

    let is_target = |cell: SymbolCode| targets.iter().any(|&t| cfg.matches(cell, t));

    let mut result = WinResult::new(cfg.kind, first);
    for (x, y, &cell) in ctx.scene.iter() {
        if area.is_some_and(|a| !a.contains(x, y)) {
            continue;
        }
        if is_target(cell) {
            result.push_position(x, y, !targets.contains(&cell));
        }
    }

    if result.symbol_count < cfg.min_count() {
        return Vec::new();
    }

    if let Some(pay_as) = cfg.pay_as {
        let pay = ctx.paytable.pay(pay_as, result.symbol_count);
        result.other_mul = other_mul(cfg, ctx, &result);
        result.price(pay, ctx.stake.bet_for(cfg.bet_type));
    }
    vec![result]
}

#[cfg(test)]
mod tests {
    use crate::grid::{OtherScene, Scene};
    use crate::paytable::Paytable;
    use crate::result::Stake;
    use crate::trigger::{
        evaluate, Area, BetType, CellMultiplier, EvalContext, TriggerConfig, TriggerKind,
    };

    const WL: i32 = 0;
    const A: i32 = 1;
    const S: i32 = 7;
    const M: i32 = 8;
    const X: i32 = 3;

    fn paytable() -> Paytable {
        Paytable::new()
            .with_row(A, vec![0, 0, 5, 10, 20])
            .with_row(S, vec![0, 0, 2, 10, 50])
            .with_row(M, vec![0, 0, 0, 0, 0])
    }

    fn four_scatters() -> Scene {
        Scene::from_rows(vec![
            vec![S, X, X, S, X],
            vec![X, S, X, X, X],
            vec![X, X, X, X, S],
        ])
        .unwrap()
    }

    #[test]
    fn test_four_scatters_pay_row_four() {
        let scene = four_scatters();
        let pt = paytable();
        let ctx = EvalContext::new(&scene, &pt, Stake::new(1, 25));
        let cfg = TriggerConfig {
            symbols: vec![S],
            min_num: 3,
            bet_type: BetType::TotalBet,
            ..TriggerConfig::new(TriggerKind::Scatters)
        };

        let eval = evaluate(&cfg, &ctx);
        assert!(eval.triggered);
        assert_eq!(eval.results.len(), 1);
        let r = &eval.results[0];
        assert_eq!(r.symbol_count, 4);
        assert_eq!(r.coin_win, 10);
        assert_eq!(r.cash_win, 250);
        assert_eq!(r.line_index, -1);
    }

    #[test]
    fn test_below_min_does_not_trigger() {
        let scene = four_scatters();
        let pt = paytable();
        let ctx = EvalContext::new(&scene, &pt, Stake::default());
        let cfg = TriggerConfig {
            symbols: vec![S],
            min_num: 5,
            ..TriggerConfig::new(TriggerKind::Scatters)
        };
        assert!(!evaluate(&cfg, &ctx).triggered);
    }

    #[test]
    fn test_pay_as_reprices() {
        let scene = four_scatters();
        let pt = paytable();
        let ctx = EvalContext::new(&scene, &pt, Stake::default());
        let cfg = TriggerConfig {
            symbols: vec![S],
            min_num: 3,
            pay_as: Some(A),
            ..TriggerConfig::new(TriggerKind::Scatters)
        };
        let r = &evaluate(&cfg, &ctx).results[0];
        assert_eq!(r.symbol, S);
        assert_eq!(r.coin_win, 10);
    }

    #[test]
    fn test_wilds_count_toward_scatter() {
        let mut scene = four_scatters();
        scene.set(2, 2, WL);
        let pt = paytable();
        let ctx = EvalContext::new(&scene, &pt, Stake::default());
        let cfg = TriggerConfig {
            symbols: vec![S],
            wild_symbols: vec![WL],
            min_num: 3,
            ..TriggerConfig::new(TriggerKind::Scatters)
        };
        let r = &evaluate(&cfg, &ctx).results[0];
        assert_eq!(r.symbol_count, 5);
        assert_eq!(r.wild_count, 1);
        assert_eq!(r.coin_win, 50);
    }

    #[test]
    fn test_count_scatter_combines_symbols() {
        let mut scene = four_scatters();
        scene.set(2, 1, M);
        let pt = paytable();
        let ctx = EvalContext::new(&scene, &pt, Stake::default());
        let cfg = TriggerConfig {
            symbols: vec![S, M],
            min_num: 5,
            ..TriggerConfig::new(TriggerKind::CountScatter)
        };
        let eval = evaluate(&cfg, &ctx);
        assert!(eval.triggered);
        assert_eq!(eval.results.len(), 1);
        assert_eq!(eval.results[0].symbol_count, 5);
        assert_eq!(eval.results[0].coin_win, 0);
    }

    #[test]
    fn test_count_scatter_in_area() {
        let scene = four_scatters();
        let pt = paytable();
        let ctx = EvalContext::new(&scene, &pt, Stake::default());
        let cfg = TriggerConfig {
            symbols: vec![S],
            min_num: 2,
            area: Some(Area { x0: 0, y0: 0, x1: 2, y1: 1 }),
            pay_as: Some(S),
            ..TriggerConfig::new(TriggerKind::CountScatterInArea)
        };
        let eval = evaluate(&cfg, &ctx);
        assert!(eval.triggered);
        let r = &eval.results[0];
        assert_eq!(r.positions, vec![0, 0, 1, 1]);
        // S row has no pay for two
        assert_eq!(r.coin_win, 0);

        let cfg = TriggerConfig {
            min_num: 3,
            ..cfg
        };
        assert!(!evaluate(&cfg, &ctx).triggered);
    }

    #[test]
    fn test_scatter_other_scene() {
        let scene = four_scatters();
        let mut other = OtherScene::new(5, 3);
        other.set(0, 0, 2);
        other.set(4, 2, 5);
        let pt = paytable();
        let ctx = EvalContext::new(&scene, &pt, Stake::default()).with_other_scene(&other);
        let cfg = TriggerConfig {
            symbols: vec![S],
            min_num: 3,
            other_mul: Some(CellMultiplier::Multiply),
            ..TriggerConfig::new(TriggerKind::Scatters)
        };
        let r = &evaluate(&cfg, &ctx).results[0];
        assert_eq!(r.other_mul, 10);
        assert_eq!(r.coin_win, 100);
    }
}
