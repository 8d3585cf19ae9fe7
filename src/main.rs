use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use ludo_engine::engine::autoplay::AutoPlayer;
use ludo_engine::engine::bot_profiles::{load_default_profiles, load_profiles};
use ludo_engine::engine::game::GameEngine;
use ludo_engine::engine::models::{GameConfig, GameResult, TurnReport};

#[derive(Parser)]
#[command(name = "ludo-engine", about = "Play a Ludo game between bots")]
struct Cli {
    /// Game settings TOML; flags below override it
    #[arg(long, env = "LUDO_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long)]
    players: Option<usize>,

    /// Tokens per player
    #[arg(long)]
    tokens: Option<usize>,

    /// Board size: 7, 9, 11 or 13
    #[arg(long)]
    board: Option<u8>,

    /// Top-level moves allowed per player
    #[arg(long)]
    max_moves: Option<u32>,

    /// Length of the seeded dice cycle
    #[arg(long)]
    rounds: Option<usize>,

    /// Dice seed; omit for random dice
    #[arg(long)]
    seed: Option<String>,

    /// Strategy or profile per seat, comma separated (e.g. "responsible,mcts_easy")
    #[arg(long, value_delimiter = ',')]
    bots: Vec<String>,

    /// Path to bot_profiles.toml (default: auto-discover)
    #[arg(long, env = "LUDO_BOT_PROFILES")]
    profiles: Option<PathBuf>,

    /// Print one JSON object per turn
    #[arg(long)]
    json: bool,

    /// Roll on a timer instead of as fast as possible
    #[arg(long)]
    pace_ms: Option<u64>,

    /// Stop after this many rolls
    #[arg(long, default_value = "10000")]
    max_turns: usize,
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)?,
            None => GameConfig::default(),
        };
        if let Some(v) = self.players {
            config.num_players = v;
            if config.colors.as_ref().is_some_and(|c| c.len() != v) {
                config.colors = None;
            }
        }
        if let Some(v) = self.tokens {
            config.num_tokens = v;
        }
        if let Some(v) = self.board {
            config.board_size = v;
        }
        if let Some(v) = self.max_moves {
            config.max_moves = v;
        }
        if let Some(v) = self.rounds {
            config.num_rounds = v;
        }
        if self.seed.is_some() {
            config.seed = self.seed.clone();
        }
        if !self.bots.is_empty() {
            let profiles = match &self.profiles {
                Some(path) => load_profiles(path)?,
                None => load_default_profiles(),
            };
            config.strategies = self
                .bots
                .iter()
                .map(|name| profiles.resolve(name))
                .collect::<Result<_, _>>()?;
        }
        config.validate()?;
        Ok(config)
    }
}

fn print_turn(report: &TurnReport, json: bool) {
    if json {
        match serde_json::to_string(report) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(error = %e, "failed to encode turn"),
        }
        return;
    }
    let moves: Vec<String> = report
        .records
        .iter()
        .map(|r| {
            let mut s = format!("P{} t{} {}->{} (+{})", r.player, r.token, r.from_index, r.to_index, r.points_earned);
            if r.bonus {
                s.push_str(" bonus");
            }
            if r.captured {
                s.push_str(" capture");
            }
            if r.finished {
                s.push_str(" home");
            }
            s
        })
        .collect();
    println!(
        "P{} rolled {:?}: {}",
        report.roller,
        report.dice,
        if moves.is_empty() { "no moves".to_string() } else { moves.join(", ") }
    );
}

fn print_result(result: Option<&GameResult>, json: bool) {
    match (result, json) {
        (Some(r), true) => match serde_json::to_string(r) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(error = %e, "failed to encode result"),
        },
        (Some(r), false) => {
            let winners: Vec<String> = r.winners.iter().map(|p| format!("P{p}")).collect();
            println!(
                "Game over ({:?}) after {} rounds: winner {}  scores {:?}",
                r.reason,
                r.rounds,
                winners.join(" & "),
                r.final_scores
            );
        }
        (None, _) => eprintln!("Game did not finish within the turn limit"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.game_config()?;
    let mut engine = GameEngine::from_config(config)?;

    let result = match cli.pace_ms {
        Some(ms) => {
            let shared = Arc::new(Mutex::new(engine));
            let summary = AutoPlayer::new(shared, Duration::from_millis(ms))
                .with_max_turns(cli.max_turns)
                .run(|report| print_turn(report, cli.json))
                .await?;
            summary.result
        }
        None => {
            for _ in 0..cli.max_turns {
                if engine.is_over() {
                    break;
                }
                let report = engine.roll_and_play()?;
                print_turn(&report, cli.json);
            }
            engine.result().cloned()
        }
    };

    print_result(result.as_ref(), cli.json);
    Ok(())
}
