//! Criterion benchmarks for the turn loop and the move selectors.
//!
//! Run with:
//!     cargo bench --bench engine

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use ludo_engine::engine::game::GameEngine;
use ludo_engine::engine::mcts::{mcts_search, MctsParams};
use ludo_engine::engine::models::{GameConfig, StrategyConfig, StrategyKind};
use ludo_engine::games::ludo::dice::RandomDice;
use ludo_engine::games::ludo::strategies::responsible_move;
use ludo_engine::games::ludo::types::GameState;

fn config(board_size: u8, players: usize) -> GameConfig {
    GameConfig {
        num_players: players,
        board_size,
        strategies: [StrategyKind::Responsible, StrategyKind::Aggressive]
            .into_iter()
            .cycle()
            .take(players)
            .map(StrategyConfig::of)
            .collect(),
        ..Default::default()
    }
}

/// A mid-game position: `turns` rolls into a seeded game.
fn fixture(board_size: u8, turns: usize) -> GameState {
    let mut engine = GameEngine::new(config(board_size, 2), Box::new(RandomDice::new(Some(7)))).unwrap();
    for _ in 0..turns {
        if engine.is_over() {
            break;
        }
        engine.roll_and_play().unwrap();
    }
    engine.state().clone()
}

fn bench_full_game(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_game");
    for board_size in [7u8, 9, 11, 13] {
        group.bench_with_input(BenchmarkId::new("4p_rule_bots", board_size), &board_size, |b, &size| {
            let mut seed = 0u64;
            b.iter(|| {
                seed += 1;
                let mut engine =
                    GameEngine::new(config(size, 4), Box::new(RandomDice::new(Some(seed)))).unwrap();
                engine.play_to_end(10_000).unwrap()
            });
        });
    }
    group.finish();
}

fn bench_responsible_move(c: &mut Criterion) {
    let state = fixture(9, 10);
    c.bench_function("responsible_move", |b| {
        b.iter(|| responsible_move(&state, 1, &[6, 3, 1]));
    });
}

fn bench_mcts_search(c: &mut Criterion) {
    let state = fixture(9, 10);
    let mut group = c.benchmark_group("mcts_search");
    group.sample_size(20);
    for iterations in [100usize, 500] {
        let params = MctsParams {
            max_iterations: iterations,
            max_time_ms: 60_000,
            seed: Some(1),
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::new("iterations", iterations), &params, |b, p| {
            let mut rng = StdRng::seed_from_u64(1);
            b.iter(|| mcts_search(&state, 1, &[5, 4, 2], p, &mut rng));
        });
    }
    group.finish();
}

fn bench_state_clone(c: &mut Criterion) {
    let state = fixture(13, 10);
    c.bench_function("state_clone", |b| b.iter(|| state.clone()));
}

criterion_group!(
    benches,
    bench_full_game,
    bench_responsible_move,
    bench_mcts_search,
    bench_state_clone
);
criterion_main!(benches);
