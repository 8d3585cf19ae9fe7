//! Bot-vs-bot arena runner. Games run in parallel, each on its own seeded dice.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rayon::prelude::*;

use crate::engine::game::GameEngine;
use crate::engine::models::{GameConfig, GameResult, StrategyConfig};
use crate::error::{EngineError, Result};
use crate::games::ludo::dice::RandomDice;

/// Upper bound on rolls per arena game.
const MAX_TURNS_PER_GAME: usize = 10_000;

/// A named contestant.
#[derive(Debug, Clone)]
pub struct ArenaBot {
    pub name: String,
    pub strategy: StrategyConfig,
}

impl ArenaBot {
    pub fn new(name: impl Into<String>, strategy: StrategyConfig) -> Self {
        Self {
            name: name.into(),
            strategy,
        }
    }
}

/// Aggregated results from an arena run.
pub struct ArenaResult {
    pub num_games: usize,
    /// Bot names in the order they were given.
    pub names: Vec<String>,
    pub wins: HashMap<String, usize>,
    /// Games with a shared win.
    pub draws: usize,
    pub total_scores: HashMap<String, Vec<f64>>,
    pub game_durations_ms: Vec<f64>,
}

impl ArenaResult {
    pub fn win_rate(&self, name: &str) -> f64 {
        *self.wins.get(name).unwrap_or(&0) as f64 / self.num_games.max(1) as f64
    }

    pub fn avg_score(&self, name: &str) -> f64 {
        match self.total_scores.get(name) {
            Some(s) if !s.is_empty() => s.iter().sum::<f64>() / s.len() as f64,
            _ => 0.0,
        }
    }

    pub fn score_stddev(&self, name: &str) -> f64 {
        let scores = match self.total_scores.get(name) {
            Some(s) if s.len() >= 2 => s,
            _ => return 0.0,
        };
        let avg = self.avg_score(name);
        let variance = scores.iter().map(|s| (s - avg).powi(2)).sum::<f64>() / (scores.len() - 1) as f64;
        variance.sqrt()
    }

    /// Wilson score interval for the win rate.
    pub fn confidence_interval_95(&self, name: &str) -> (f64, f64) {
        let n = self.num_games;
        if n == 0 {
            return (0.0, 0.0);
        }
        let p = self.win_rate(name);
        let z = 1.96_f64;
        let denom = 1.0 + z * z / n as f64;
        let center = (p + z * z / (2.0 * n as f64)) / denom;
        let margin = z * ((p * (1.0 - p) + z * z / (4.0 * n as f64)) / n as f64).sqrt() / denom;
        ((center - margin).max(0.0), (center + margin).min(1.0))
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!("Arena Results ({} games)", self.num_games)];
        lines.push("=".repeat(60));
        for name in &self.names {
            let (ci_lo, ci_hi) = self.confidence_interval_95(name);
            lines.push(format!(
                "  {:>12}: {:3} wins ({:5.1}%)  [95% CI: {:.1}%-{:.1}%]  avg={:5.1} +/- {:4.1}",
                name,
                self.wins.get(name).copied().unwrap_or(0),
                self.win_rate(name) * 100.0,
                ci_lo * 100.0,
                ci_hi * 100.0,
                self.avg_score(name),
                self.score_stddev(name),
            ));
        }
        lines.push(format!("  {:>12}: {}", "Draws", self.draws));
        if !self.game_durations_ms.is_empty() {
            let total_ms = self.game_durations_ms.iter().sum::<f64>();
            let avg_ms = total_ms / self.game_durations_ms.len() as f64;
            lines.push(format!("  Avg game: {:.0}ms  |  Total CPU: {:.1}s", avg_ms, total_ms / 1000.0));
        }
        lines.join("\n")
    }
}

struct GameOutcome {
    seat_names: Vec<String>,
    result: Option<GameResult>,
    elapsed_ms: f64,
}

/// Play `num_games` between `bots` (one seat each) on the board described by
/// `template`. Game `i` rolls `RandomDice` seeded with `base_seed + i`; with
/// `alternate_seats` the seating rotates by one every game.
pub fn run_arena(
    template: &GameConfig,
    bots: &[ArenaBot],
    num_games: usize,
    base_seed: u64,
    alternate_seats: bool,
    progress_callback: Option<&(dyn Fn(usize, usize) + Sync)>,
) -> Result<ArenaResult> {
    let names: Vec<String> = bots.iter().map(|b| b.name.clone()).collect();
    if names.iter().collect::<HashSet<_>>().len() != names.len() {
        return Err(EngineError::invalid_config("arena bot names must be unique"));
    }
    let base_config = GameConfig {
        num_players: bots.len(),
        colors: template.colors.clone().filter(|c| c.len() == bots.len()),
        seed: None,
        strategies: Vec::new(),
        ..template.clone()
    };
    base_config.validate()?;

    let completed = AtomicUsize::new(0);
    let outcomes: Vec<GameOutcome> = (0..num_games)
        .into_par_iter()
        .map(|game_idx| {
            let outcome = play_one_game(&base_config, bots, game_idx, base_seed, alternate_seats);
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(cb) = progress_callback {
                cb(done, num_games);
            }
            outcome
        })
        .collect::<Result<_>>()?;

    let mut result = ArenaResult {
        num_games,
        wins: names.iter().map(|n| (n.clone(), 0)).collect(),
        draws: 0,
        total_scores: names.iter().map(|n| (n.clone(), Vec::new())).collect(),
        game_durations_ms: Vec::with_capacity(num_games),
        names,
    };

    for outcome in outcomes {
        result.game_durations_ms.push(outcome.elapsed_ms);
        let Some(gr) = outcome.result else {
            result.draws += 1;
            continue;
        };
        for (seat, score) in gr.final_scores.iter().enumerate() {
            if let Some(scores) = result.total_scores.get_mut(&outcome.seat_names[seat]) {
                scores.push(*score as f64);
            }
        }
        match gr.winners.as_slice() {
            [winner] => {
                let name = &outcome.seat_names[*winner as usize - 1];
                if let Some(w) = result.wins.get_mut(name) {
                    *w += 1;
                }
            }
            _ => result.draws += 1,
        }
    }

    Ok(result)
}

fn play_one_game(
    base_config: &GameConfig,
    bots: &[ArenaBot],
    game_idx: usize,
    base_seed: u64,
    alternate_seats: bool,
) -> Result<GameOutcome> {
    let n = bots.len();
    let seed = base_seed.wrapping_add(game_idx as u64);
    let seating: Vec<&ArenaBot> = (0..n)
        .map(|seat| {
            let shift = if alternate_seats { game_idx } else { 0 };
            &bots[(seat + shift) % n]
        })
        .collect();

    let strategies = seating
        .iter()
        .enumerate()
        .map(|(seat, bot)| {
            let mut s = bot.strategy.clone();
            let bot_seed = s.seed.unwrap_or(seed);
            s.seed = Some(bot_seed.wrapping_mul(31).wrapping_add((game_idx * n + seat) as u64));
            s
        })
        .collect();
    let config = GameConfig {
        strategies,
        ..base_config.clone()
    };

    let t0 = Instant::now();
    let mut engine = GameEngine::new(config, Box::new(RandomDice::new(Some(seed))))?;
    let result = engine.play_to_end(MAX_TURNS_PER_GAME)?;
    let elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0;
    tracing::debug!(game = game_idx, seed, elapsed_ms, winners = ?result.as_ref().map(|r| &r.winners), "arena game done");

    Ok(GameOutcome {
        seat_names: seating.iter().map(|b| b.name.clone()).collect(),
        result,
        elapsed_ms,
    })
}
