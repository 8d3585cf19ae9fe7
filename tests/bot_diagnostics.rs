//! Bot-vs-bot diagnostic simulations.
//!
//! These are NOT run in CI. Use them locally to verify bot strength
//! and catch integration issues (e.g. MCTS optimizing for the wrong seat).
//!
//! Run with:
//!     cargo test --release --test bot_diagnostics -- --ignored --nocapture

use rand::rngs::StdRng;
use rand::SeedableRng;

use ludo_engine::engine::arena::{run_arena, ArenaBot, ArenaResult};
use ludo_engine::engine::game::GameEngine;
use ludo_engine::engine::mcts::{mcts_search, MctsParams};
use ludo_engine::engine::models::{GameConfig, MctsPreset, StrategyConfig, StrategyKind};
use ludo_engine::games::ludo::dice::RandomDice;

fn arena_mcts(iterations: usize) -> StrategyConfig {
    StrategyConfig {
        max_iterations: Some(iterations),
        max_time_ms: Some(600_000),
        ..StrategyConfig::mcts(MctsPreset::Normal)
    }
}

fn print_result(result: &ArenaResult) {
    println!("\n{}", result.summary());
    for name in &result.names {
        let scores = &result.total_scores[name];
        let shown: Vec<String> = scores.iter().take(20).map(|s| format!("{s:.0}")).collect();
        println!("  {name:>12} scores: {}", shown.join(" "));
    }
}

/// MCTS (300 iterations) vs Predictable on the default board.
/// Baseline: MCTS should win clearly more than half its games.
#[test]
#[ignore]
fn mcts_vs_predictable() {
    let bots = vec![
        ArenaBot::new("mcts", arena_mcts(300)),
        ArenaBot::new("predictable", StrategyConfig::of(StrategyKind::Predictable)),
    ];
    let result = run_arena(
        &GameConfig::default(),
        &bots,
        40,
        42,
        true,
        Some(&|done, total| eprintln!("  game {}/{}", done, total)),
    )
    .unwrap();
    print_result(&result);

    let wr = result.win_rate("mcts");
    assert!(wr >= 0.55, "MCTS win rate {:.0}% is too low", wr * 100.0);
    assert!(result.avg_score("mcts") > result.avg_score("predictable"));
}

/// Responsible vs Aggressive, four seats, two of each.
/// Responsible adds racing and pair play on top of the aggressive core, so it
/// should not lose ground.
#[test]
#[ignore]
fn responsible_vs_aggressive() {
    let bots = vec![
        ArenaBot::new("responsible_a", StrategyConfig::of(StrategyKind::Responsible)),
        ArenaBot::new("aggressive_a", StrategyConfig::of(StrategyKind::Aggressive)),
        ArenaBot::new("responsible_b", StrategyConfig::of(StrategyKind::Responsible)),
        ArenaBot::new("aggressive_b", StrategyConfig::of(StrategyKind::Aggressive)),
    ];
    let template = GameConfig {
        num_tokens: 4,
        board_size: 11,
        max_moves: 60,
        ..Default::default()
    };
    let result = run_arena(&template, &bots, 200, 7, true, None).unwrap();
    print_result(&result);

    let responsible = result.win_rate("responsible_a") + result.win_rate("responsible_b");
    let aggressive = result.win_rate("aggressive_a") + result.win_rate("aggressive_b");
    println!("\n  responsible={:.1}%  aggressive={:.1}%", responsible * 100.0, aggressive * 100.0);
    assert!(responsible >= aggressive * 0.8, "responsible fell well behind aggressive");
}

/// Every seat playing the same rule bot: the seat rotation should spread wins
/// roughly evenly. A strong skew points at a turn-order bug.
#[test]
#[ignore]
fn seat_balance_with_identical_bots() {
    let bots: Vec<ArenaBot> = (1..=3)
        .map(|i| ArenaBot::new(format!("aggressive_{i}"), StrategyConfig::of(StrategyKind::Aggressive)))
        .collect();
    let result = run_arena(&GameConfig::default(), &bots, 300, 11, true, None).unwrap();
    print_result(&result);
    for name in &result.names {
        let wr = result.win_rate(name);
        assert!((0.15..=0.5).contains(&wr), "{name} win rate {:.0}% is skewed", wr * 100.0);
    }
}

/// Inspect the root statistics of a single search from a mid-game position.
/// The chosen move must be the most visited child.
#[test]
#[ignore]
fn mcts_root_statistics() {
    let config = GameConfig {
        strategies: vec![StrategyConfig::of(StrategyKind::Responsible); 2],
        ..Default::default()
    };
    let mut engine = GameEngine::new(config, Box::new(RandomDice::new(Some(3)))).unwrap();
    for _ in 0..5 {
        engine.roll_and_play().unwrap();
    }
    assert!(!engine.is_over());

    let params = MctsParams {
        max_iterations: 2000,
        max_time_ms: 600_000,
        ..Default::default()
    };
    let mut rng = StdRng::seed_from_u64(1);
    let (chosen, stats) = mcts_search(engine.state(), 1, &[6, 4, 1], &params, &mut rng);
    let chosen = chosen.unwrap();

    println!("\n  positions: {:?}", engine.state().positions);
    println!("  iterations={} elapsed={}ms", stats.iterations, stats.elapsed_ms);
    for c in &stats.children {
        println!(
            "    token {} die {}: visits={:5} mean={:.3}",
            c.mv.token_index, c.mv.dice_value, c.visits, c.mean_value
        );
    }

    let best = stats.children.iter().map(|c| c.visits).max().unwrap();
    let chosen_visits = stats.children.iter().find(|c| c.mv == chosen).unwrap().visits;
    assert_eq!(chosen_visits, best);
    assert_eq!(stats.iterations, 2000);
    assert!(!stats.fallback);
}
