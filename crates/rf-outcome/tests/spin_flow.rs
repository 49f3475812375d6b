//! End-to-end spin tests
//!
//! Walks complete component graphs loaded from YAML:
//! - base game into a respin loop and back out
//! - award effects driving overrides and retriggers
//! - record / replay determinism
//! - random source failure handling

use rf_outcome::{
    Award, ChaChaSource, ConfigLoader, EngineError, EngineResult, Game, GameState, NoopAwards,
    PlayResult, RandomSource, RecordingSource, ReplaySource, Stake, WIN_MULTI_KEY,
};

// ═══════════════════════════════════════════════════════════════════════════════
// TEST FIXTURES
// ═══════════════════════════════════════════════════════════════════════════════

/// Base stops `[0, 0, 0, 1, 1]` land three scatters on the top row and three
/// A on the middle line; every free spin stop 0 fills the grid with A.
const TINY: &str = r#"
name: tiny
symbols: [WL, A, B, C, SC]
paytable:
  A: [0, 0, 5, 10, 20]
  B: [0, 0, 2, 4, 8]
  C: [0, 0, 1, 2, 3]
  SC: [0, 0, 2, 10, 50]
lines:
  - [1, 1, 1, 1, 1]
  - [0, 0, 0, 0, 0]
reelSets:
  base:
    - [SC, A, B, C]
    - [SC, A, B, C]
    - [SC, A, B, C]
    - [SC, A, B, C]
    - [SC, A, B, C]
  free:
    - [A, A, A, B]
    - [A, A, A, B]
    - [A, A, A, B]
    - [A, A, A, B]
    - [A, A, A, B]
components:
  - name: bg-spin
    type: reels
    reelSet: base
    height: 3
    next: bg-lines
  - name: bg-lines
    type: trigger
    triggerType: lines
    wildSymbols: [WL]
    excludeSymbols: [SC]
    minNum: 3
    next: bg-scatter
  - name: bg-scatter
    type: trigger
    triggerType: scatters
    symbols: [SC]
    minNum: 3
    betType: totalBet
    respinNumWithScatterNum: {3: 2, 4: 3, 5: 4}
    jumpToComponent: fg
    awards:
      - type: boostFreeGames
        vals: [3]
  - name: fg
    type: respin
    mainComponent: fg-spin
  - name: fg-spin
    type: reels
    reelSet: free
    height: 3
    next: fg-lines
  - name: fg-lines
    type: trigger
    triggerType: lines
    minNum: 3
    winMulti: 2
    awards:
      - type: extraSpin
"#;

const TRIGGER_STOPS: [u64; 5] = [0, 0, 0, 1, 1];
const FREE_STOPS: [u64; 5] = [0, 0, 0, 0, 0];

fn tiny_game() -> Game {
    ConfigLoader::new().parse_yaml(TINY).expect("fixture game must load")
}

fn draws(cycles: usize) -> Vec<u64> {
    let mut values = TRIGGER_STOPS.to_vec();
    for _ in 0..cycles {
        values.extend(FREE_STOPS);
    }
    values
}

fn play(game: &Game, src: &mut dyn RandomSource) -> EngineResult<PlayResult> {
    game.play(Stake::new(1, 2), None, src, &mut NoopAwards)
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESPIN FLOW
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_base_game_into_respin_and_out() {
    let game = tiny_game();
    let mut src = ReplaySource::new(draws(2));
    let pr = play(&game, &mut src).unwrap();

    assert_eq!(src.remaining(), 0);
    assert_eq!(
        pr.history,
        vec![
            "bg-spin", "bg-lines", "bg-scatter", "fg", "fg-spin", "fg-lines", "fg", "fg-spin", "fg-lines", "fg",
        ]
    );
    assert_eq!(pr.scenes.len(), 3);
    assert_eq!(pr.respin_cycles, 2);

    // base: 3×A on the middle line (5) + 3 scatters (2 × total bet 2)
    // free: two lines of 5×A (20) at 2x, twice
    assert_eq!(pr.coin_win, 5 + 2 + 2 * 2 * 40);
    assert_eq!(pr.cash_win, 5 + 4 + 2 * 2 * 40);
}

#[test]
fn test_component_data_after_spin() {
    let game = tiny_game();
    let mut state = GameState::new(&game, Stake::new(1, 2));
    game.run(&mut state, &mut ReplaySource::new(draws(2)), &mut NoopAwards)
        .unwrap();

    let scatter = state.data_by_name("bg-scatter").unwrap();
    assert!(scatter.triggered);
    assert_eq!(scatter.symbol_num, 3);
    assert_eq!(scatter.respin_num, 2);
    assert_eq!(scatter.next_component, game.handle("fg"));
    let results: Vec<_> = state.play().results_of(scatter).collect();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].positions, vec![0, 0, 1, 0, 2, 0]);

    let fg = state.data_by_name("fg").unwrap();
    assert_eq!(fg.respin.cur_times, 2);
    assert_eq!(fg.respin.cur_respin_num, 0);
    assert_eq!(fg.respin.total_coin_win, 160);
    assert_eq!(fg.respin.trigger_times, 1);

    let fg_lines = state.data_by_name("fg-lines").unwrap();
    assert_eq!(fg_lines.run_times, 2);
    assert_eq!(fg_lines.win_multi, 2);
    assert_eq!(fg_lines.wins, 80);
    assert_eq!(state.play().scenes_of(fg_lines).count(), 1);
}

#[test]
fn test_no_trigger_ends_after_base_game() {
    let game = tiny_game();
    let mut src = ReplaySource::new(vec![1, 1, 1, 1, 1]);
    let pr = play(&game, &mut src).unwrap();

    assert_eq!(pr.history, vec!["bg-spin", "bg-lines", "bg-scatter"]);
    // 5×A on the top line, 5×B on the middle line
    assert_eq!(pr.coin_win, 20 + 8);
    assert_eq!(pr.respin_cycles, 0);
}

// ═══════════════════════════════════════════════════════════════════════════════
// AWARD EFFECTS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_award_sets_win_multi_override() {
    let game = tiny_game();
    let mut effects = |award: &Award, state: &mut GameState<'_>, _: &mut dyn RandomSource| -> EngineResult<()> {
        if award.award_type == "boostFreeGames" {
            state.set_config_override("fg-lines", WIN_MULTI_KEY, award.vals[0])?;
        }
        Ok(())
    };

    let pr = game
        .play(Stake::new(1, 2), None, &mut ReplaySource::new(draws(2)), &mut effects)
        .unwrap();
    assert_eq!(pr.coin_win, 5 + 2 + 2 * 2 * 60);
}

#[test]
fn test_award_retrigger_accumulates() {
    let game = tiny_game();
    let mut granted = false;
    let mut effects = |award: &Award, state: &mut GameState<'_>, _: &mut dyn RandomSource| -> EngineResult<()> {
        if award.award_type == "extraSpin" && !granted {
            granted = true;
            state.add_respin("fg", 1)?;
        }
        Ok(())
    };

    let mut state = GameState::new(&game, Stake::new(1, 2));
    game.run(&mut state, &mut ReplaySource::new(draws(3)), &mut effects)
        .unwrap();

    let fg = &state.data_by_name("fg").unwrap().respin;
    assert_eq!(fg.cur_times, 3);
    assert_eq!(fg.retrigger_add, 1);
    assert_eq!(fg.trigger_times, 2);
    assert_eq!(state.play().respin_cycles, 3);
}

#[test]
fn test_award_failure_aborts_spin() {
    let game = tiny_game();
    let mut effects = |award: &Award, _: &mut GameState<'_>, _: &mut dyn RandomSource| -> EngineResult<()> {
        Err(EngineError::Award {
            award: award.award_type.clone(),
            reason: "wallet offline".to_string(),
        })
    };
    let err = game
        .play(Stake::new(1, 2), None, &mut ReplaySource::new(draws(2)), &mut effects)
        .unwrap_err();
    assert!(matches!(err, EngineError::Award { award, .. } if award == "boostFreeGames"));
}

// ═══════════════════════════════════════════════════════════════════════════════
// DETERMINISM
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_recorded_spins_replay_identically() {
    let game = tiny_game();

    for seed in 0..50u64 {
        let mut recorder = RecordingSource::new(ChaChaSource::seeded(seed));
        let live = play(&game, &mut recorder).unwrap();

        let mut replay = ReplaySource::from_records(recorder.records());
        let replayed = play(&game, &mut replay).unwrap();

        assert_eq!(replay.remaining(), 0, "seed {seed}");
        assert_eq!(
            serde_json::to_value(&live).unwrap(),
            serde_json::to_value(&replayed).unwrap(),
            "seed {seed}"
        );
    }
}

#[test]
fn test_same_seed_same_outcome() {
    let game = tiny_game();
    let a = play(&game, &mut ChaChaSource::seeded(7)).unwrap();
    let b = play(&game, &mut ChaChaSource::seeded(7)).unwrap();
    assert_eq!(a.coin_win, b.coin_win);
    assert_eq!(a.history, b.history);
    assert_eq!(a.scenes, b.scenes);
}

#[test]
fn test_exhausted_source_aborts_spin() {
    let game = tiny_game();
    // enough for the base spin and one free spin of two
    let mut src = ReplaySource::new(draws(1));
    let err = play(&game, &mut src).unwrap_err();
    assert!(matches!(err, EngineError::ExhaustedRandomSource(_)));
}

#[test]
fn test_bundled_game_loads_and_spins() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../games/moonlight.yaml");
    let game = ConfigLoader::new().load_file(path).unwrap();
    assert_eq!(game.name, "moonlight");
    assert_eq!(game.symbols.len(), 9);

    for seed in 0..200u64 {
        let pr = play(&game, &mut ChaChaSource::seeded(seed)).unwrap();
        assert!(pr.coin_win >= 0);
        assert_eq!(pr.history[0], "bg-spin");
    }
}
