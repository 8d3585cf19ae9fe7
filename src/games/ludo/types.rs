//! Ludo core types: cells, colors, tokens, moves and the live game state.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::board::BoardConfig;

/// 1-based player id, in seat order.
pub type PlayerId = u8;

pub const MIN_DICE: u8 = 1;
pub const MAX_DICE: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: u8,
    pub col: u8,
}

impl Cell {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// Player colors in clockwise board order. The discriminant is the number of
/// quarter turns from the RED corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Blue,
    Yellow,
    Green,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Red, Color::Blue, Color::Yellow, Color::Green];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Default seating for a player count: diagonal opponents for two players.
    pub fn default_seating(num_players: usize) -> Vec<Color> {
        match num_players {
            2 => vec![Color::Blue, Color::Green],
            3 => vec![Color::Red, Color::Blue, Color::Yellow],
            _ => vec![Color::Red, Color::Blue, Color::Green, Color::Yellow],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::Red => "RED",
            Color::Blue => "BLUE",
            Color::Yellow => "YELLOW",
            Color::Green => "GREEN",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Derived from a token's path index alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenState {
    InHome,
    OnBoard,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    WaitingForDice,
    ProcessingMove,
    GameOver,
}

/// A candidate or committed action: which token, and which dice value to spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub token_index: usize,
    pub dice_value: u8,
}

impl Move {
    pub const fn new(token_index: usize, dice_value: u8) -> Self {
        Self {
            token_index,
            dice_value,
        }
    }
}

/// An opponent token sent back home by a landing move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capture {
    pub player: PlayerId,
    pub token: usize,
    pub from_index: u8,
    pub points_lost: u32,
}

/// Outcome of applying one move to the state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResult {
    pub player: PlayerId,
    pub token: usize,
    pub dice_value: u8,
    pub from_index: u8,
    pub to_index: u8,
    pub finished: bool,
    pub captures: Vec<Capture>,
    pub points_earned: u32,
    pub game_won: bool,
}

impl MoveResult {
    pub fn captured(&self) -> bool {
        !self.captures.is_empty()
    }

    /// Finishing a token, rolling a six or capturing earns an extra move.
    pub fn grants_bonus(&self) -> bool {
        self.finished || self.dice_value == MAX_DICE || self.captured()
    }
}

/// Mutable game state. Owned by the engine; strategies only ever borrow it.
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    #[serde(skip)]
    pub board: &'static BoardConfig,
    pub board_size: u8,
    /// Color of each seat; player id `i` sits at `colors[i - 1]`.
    pub colors: Vec<Color>,
    pub positions: Vec<Vec<u8>>,
    pub scores: Vec<u32>,
    pub move_counts: Vec<u32>,
    pub max_moves: u32,
    pub final_position: u8,
    pub current_round: u32,
    pub phase: GamePhase,
    pub winner: Option<PlayerId>,
}

impl GameState {
    pub fn new(
        board: &'static BoardConfig,
        colors: Vec<Color>,
        num_tokens: usize,
        max_moves: u32,
    ) -> Self {
        let n = colors.len();
        Self {
            board,
            board_size: board.board_size,
            colors,
            positions: vec![vec![0; num_tokens]; n],
            scores: vec![0; n],
            move_counts: vec![0; n],
            max_moves,
            final_position: board.final_position(),
            current_round: 0,
            phase: GamePhase::WaitingForDice,
            winner: None,
        }
    }

    pub fn num_players(&self) -> usize {
        self.colors.len()
    }

    pub fn num_tokens(&self) -> usize {
        self.positions.first().map_or(0, Vec::len)
    }

    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> {
        1..=self.colors.len() as PlayerId
    }

    pub fn is_player(&self, player: PlayerId) -> bool {
        player >= 1 && (player as usize) <= self.colors.len()
    }

    #[inline]
    fn seat(&self, player: PlayerId) -> usize {
        debug_assert!(self.is_player(player), "unknown player {player}");
        player as usize - 1
    }

    pub fn color_of(&self, player: PlayerId) -> Color {
        self.colors[self.seat(player)]
    }

    pub fn positions_of(&self, player: PlayerId) -> &[u8] {
        &self.positions[self.seat(player)]
    }

    pub(crate) fn positions_mut(&mut self, player: PlayerId) -> &mut Vec<u8> {
        let seat = self.seat(player);
        &mut self.positions[seat]
    }

    pub fn score(&self, player: PlayerId) -> u32 {
        self.scores[self.seat(player)]
    }

    pub(crate) fn scores_mut(&mut self, player: PlayerId) -> &mut u32 {
        let seat = self.seat(player);
        &mut self.scores[seat]
    }

    pub fn move_count(&self, player: PlayerId) -> u32 {
        self.move_counts[self.seat(player)]
    }

    pub(crate) fn record_move(&mut self, player: PlayerId) {
        let seat = self.seat(player);
        self.move_counts[seat] += 1;
    }

    pub fn has_moves_left(&self, player: PlayerId) -> bool {
        self.move_count(player) < self.max_moves
    }

    /// Board cell of `player`'s path at `index`.
    pub fn cell_of(&self, player: PlayerId, index: u8) -> Option<Cell> {
        self.board.cell_for(self.color_of(player), index as usize)
    }

    pub fn token_state(&self, player: PlayerId, token: usize) -> Option<TokenState> {
        let pos = *self.positions_of(player).get(token)?;
        Some(if pos == 0 {
            TokenState::InHome
        } else if pos >= self.final_position {
            TokenState::Finished
        } else {
            TokenState::OnBoard
        })
    }

    pub fn is_finished(&self, player: PlayerId, token: usize) -> bool {
        self.token_state(player, token) == Some(TokenState::Finished)
    }

    pub fn all_finished(&self, player: PlayerId) -> bool {
        self.positions_of(player)
            .iter()
            .all(|&p| p >= self.final_position)
    }

    pub fn unfinished_tokens(&self, player: PlayerId) -> Vec<usize> {
        self.positions_of(player)
            .iter()
            .enumerate()
            .filter(|(_, &p)| p < self.final_position)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn opponents(&self, player: PlayerId) -> impl Iterator<Item = PlayerId> {
        self.player_ids().filter(move |&p| p != player)
    }

    /// Sum of path indices over all tokens.
    pub fn progress(&self, player: PlayerId) -> u32 {
        self.positions_of(player).iter().map(|&p| p as u32).sum()
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Read-only JSON view for observers.
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
