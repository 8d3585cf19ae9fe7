//! Engine data types: game settings, strategy settings, move records and results.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::mcts::MctsParams;
use crate::error::{EngineError, Result};
use crate::games::ludo::board::board_config;
use crate::games::ludo::types::{Capture, Color, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Predictable,
    Aggressive,
    Responsible,
    Mcts,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::Predictable,
        StrategyKind::Aggressive,
        StrategyKind::Responsible,
        StrategyKind::Mcts,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Predictable => "predictable",
            StrategyKind::Aggressive => "aggressive",
            StrategyKind::Responsible => "responsible",
            StrategyKind::Mcts => "mcts",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        StrategyKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| EngineError::invalid_config(format!("unknown strategy '{s}'")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MctsPreset {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl FromStr for MctsPreset {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(MctsPreset::Easy),
            "normal" => Ok(MctsPreset::Normal),
            "hard" => Ok(MctsPreset::Hard),
            other => Err(EngineError::invalid_config(format!("unknown MCTS preset '{other}'"))),
        }
    }
}

/// How one seat picks its moves. MCTS fields override the preset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub kind: StrategyKind,
    pub preset: Option<MctsPreset>,
    pub max_iterations: Option<usize>,
    pub max_time_ms: Option<u64>,
    pub simulation_depth: Option<usize>,
    pub exploration_constant: Option<f64>,
    pub seed: Option<u64>,
}

impl StrategyConfig {
    pub fn of(kind: StrategyKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    pub fn mcts(preset: MctsPreset) -> Self {
        Self {
            kind: StrategyKind::Mcts,
            preset: Some(preset),
            ..Default::default()
        }
    }

    pub fn mcts_params(&self) -> MctsParams {
        let mut params = MctsParams::preset(self.preset.unwrap_or_default());
        if let Some(v) = self.max_iterations {
            params.max_iterations = v;
        }
        if let Some(v) = self.max_time_ms {
            params.max_time_ms = v;
        }
        if let Some(v) = self.simulation_depth {
            params.simulation_depth = v;
        }
        if let Some(v) = self.exploration_constant {
            params.exploration_constant = v;
        }
        params.seed = self.seed;
        params
    }
}

/// Game settings, loadable from TOML. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub num_players: usize,
    pub num_tokens: usize,
    pub board_size: u8,
    /// Top-level moves allowed per player.
    pub max_moves: u32,
    /// Length of the seeded dice cycle.
    pub num_rounds: usize,
    pub seed: Option<String>,
    /// Active colors in seat order; defaults per player count.
    pub colors: Option<Vec<Color>>,
    /// One per seat; missing seats play Predictable.
    pub strategies: Vec<StrategyConfig>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            num_players: 2,
            num_tokens: 2,
            board_size: 9,
            max_moves: 40,
            num_rounds: 50,
            seed: None,
            colors: None,
            strategies: Vec::new(),
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        board_config(self.board_size)?;
        if !(2..=4).contains(&self.num_players) {
            return Err(EngineError::invalid_config(format!(
                "num_players must be 2..=4, got {}",
                self.num_players
            )));
        }
        if !(1..=4).contains(&self.num_tokens) {
            return Err(EngineError::invalid_config(format!(
                "num_tokens must be 1..=4, got {}",
                self.num_tokens
            )));
        }
        if self.max_moves == 0 {
            return Err(EngineError::invalid_config("max_moves must be positive"));
        }
        if self.seed.is_some() && self.num_rounds == 0 {
            return Err(EngineError::invalid_config("num_rounds must be positive with a seed"));
        }
        if let Some(colors) = &self.colors {
            if colors.len() != self.num_players {
                return Err(EngineError::invalid_config(format!(
                    "{} colors given for {} players",
                    colors.len(),
                    self.num_players
                )));
            }
            if colors.iter().collect::<HashSet<_>>().len() != colors.len() {
                return Err(EngineError::invalid_config("colors must be distinct"));
            }
        }
        if self.strategies.len() > self.num_players {
            return Err(EngineError::invalid_config(format!(
                "{} strategies given for {} players",
                self.strategies.len(),
                self.num_players
            )));
        }
        Ok(())
    }

    pub fn seating(&self) -> Vec<Color> {
        self.colors
            .clone()
            .unwrap_or_else(|| Color::default_seating(self.num_players))
    }

    pub fn strategy_for(&self, player: PlayerId) -> StrategyConfig {
        self.strategies
            .get(player as usize - 1)
            .cloned()
            .unwrap_or_default()
    }

    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|source| EngineError::Toml {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text, path)?;
        config.validate()?;
        Ok(config)
    }
}

/// One committed sub-move. Append-only; never edited once logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub ordinal: usize,
    pub round: u32,
    pub player: PlayerId,
    pub token: usize,
    pub dice_value: u8,
    /// Dice spent so far in this move's chain, bonus dice included.
    pub used_values: Vec<u8>,
    pub from_index: u8,
    pub to_index: u8,
    pub captured: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub captures: Vec<Capture>,
    pub finished: bool,
    pub points_earned: u32,
    pub bonus: bool,
    pub strategy: StrategyKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    AllTokensFinished,
    MoveLimit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub winners: Vec<PlayerId>,
    /// Indexed by seat (player id - 1).
    pub final_scores: Vec<u32>,
    pub reason: EndReason,
    pub rounds: u32,
    pub total_moves: usize,
}

/// Everything one dice roll caused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnReport {
    pub roller: PlayerId,
    pub dice: [u8; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_index: Option<usize>,
    pub sequence: [PlayerId; 3],
    pub records: Vec<MoveRecord>,
    pub game_over: Option<GameResult>,
}
