//! Arena CLI: run bot-vs-bot experiments from the command line.
//!
//! Usage:
//!   cargo run --release --bin arena -- --games 100 --bots mcts_hard,responsible
//!   cargo run --release --bin arena -- --games 50 --bots mcts,aggressive --mcts-iterations 500 --board 11

use std::path::PathBuf;

use clap::Parser;

use ludo_engine::engine::arena::{run_arena, ArenaBot};
use ludo_engine::engine::bot_profiles::{load_default_profiles, load_profiles};
use ludo_engine::engine::models::{GameConfig, StrategyKind};

#[derive(Parser)]
#[command(name = "arena", about = "Run bot-vs-bot arena experiments for Ludo")]
struct Cli {
    /// Number of games to play
    #[arg(long, default_value = "100")]
    games: usize,

    /// Random seed
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Rotate seats between games
    #[arg(long, default_value = "true")]
    alternate_seats: bool,

    /// Path to bot_profiles.toml
    #[arg(long)]
    profiles: Option<PathBuf>,

    /// Profiles or strategy names, one per seat (2 to 4), comma separated
    #[arg(long, value_delimiter = ',', default_value = "responsible,aggressive")]
    bots: Vec<String>,

    /// Game settings TOML; player count and strategies are ignored
    #[arg(long)]
    config: Option<PathBuf>,

    /// Board size: 7, 9, 11 or 13
    #[arg(long)]
    board: Option<u8>,

    /// Tokens per player
    #[arg(long)]
    tokens: Option<usize>,

    /// Top-level moves allowed per player
    #[arg(long)]
    max_moves: Option<u32>,

    // --- MCTS overrides, applied to every MCTS bot ---
    /// MCTS iterations per move
    #[arg(long)]
    mcts_iterations: Option<usize>,

    /// MCTS time limit per move (ms)
    #[arg(long)]
    mcts_time: Option<u64>,

    /// MCTS rollout depth
    #[arg(long)]
    mcts_depth: Option<usize>,

    /// MCTS exploration constant
    #[arg(long)]
    mcts_exploration: Option<f64>,
}

fn main() {
    let cli = Cli::parse();

    let profiles = match &cli.profiles {
        Some(path) => load_profiles(path).unwrap_or_else(|e| {
            eprintln!("Error loading profiles: {}", e);
            std::process::exit(1);
        }),
        None => load_default_profiles(),
    };

    let mut template = match &cli.config {
        Some(path) => GameConfig::load(path).unwrap_or_else(|e| {
            eprintln!("Error loading game config: {}", e);
            std::process::exit(1);
        }),
        None => GameConfig::default(),
    };
    if let Some(v) = cli.board {
        template.board_size = v;
    }
    if let Some(v) = cli.tokens {
        template.num_tokens = v;
    }
    if let Some(v) = cli.max_moves {
        template.max_moves = v;
    }

    // Duplicate lineups get a seat suffix so names stay unique.
    let mut bots: Vec<ArenaBot> = Vec::new();
    for (seat, name) in cli.bots.iter().enumerate() {
        let mut strategy = profiles.resolve(name).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });
        if strategy.kind == StrategyKind::Mcts {
            if let Some(v) = cli.mcts_iterations {
                strategy.max_iterations = Some(v);
            }
            if let Some(v) = cli.mcts_time {
                strategy.max_time_ms = Some(v);
            }
            if let Some(v) = cli.mcts_depth {
                strategy.simulation_depth = Some(v);
            }
            if let Some(v) = cli.mcts_exploration {
                strategy.exploration_constant = Some(v);
            }
        }
        let display_name = if cli.bots[..seat].contains(name) {
            format!("{}#{}", name, seat + 1)
        } else {
            name.clone()
        };
        bots.push(ArenaBot::new(display_name, strategy));
    }

    eprintln!(
        "Arena: {} games, seed={}, alternate_seats={}, board={}, tokens={}, max_moves={}",
        cli.games,
        cli.seed,
        cli.alternate_seats,
        template.board_size,
        template.num_tokens,
        template.max_moves
    );
    for bot in &bots {
        let s = &bot.strategy;
        if s.kind == StrategyKind::Mcts {
            let p = s.mcts_params();
            eprintln!(
                "  {}: type=mcts, iterations={}, time={}ms, depth={}, c={:.3}",
                bot.name,
                p.max_iterations,
                p.max_time_ms,
                p.simulation_depth,
                p.exploration_constant
            );
        } else {
            eprintln!("  {}: type={}", bot.name, s.kind);
        }
    }
    eprintln!();

    let total = cli.games;
    let progress_cb = move |done: usize, _total: usize| {
        eprint!("\r  [{}/{}] games completed", done, total);
    };

    let result = run_arena(
        &template,
        &bots,
        cli.games,
        cli.seed,
        cli.alternate_seats,
        Some(&progress_cb),
    )
    .unwrap_or_else(|e| {
        eprintln!("\nError: {}", e);
        std::process::exit(1);
    });

    eprintln!("\r                                    "); // clear progress line
    println!("{}", result.summary());
}
