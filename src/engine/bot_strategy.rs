//! Bot strategy trait and one implementation per `StrategyKind`.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::engine::mcts::{mcts_search, MctsParams, SearchStats};
use crate::engine::models::{StrategyConfig, StrategyKind};
use crate::games::ludo::strategies::{aggressive_move, predictable_move, responsible_move};
use crate::games::ludo::types::{GameState, Move, PlayerId};

/// Picks a move for `player`. `dice_value` is the die this slot was handed;
/// `available` is every die still unspent. `None` means no token can move.
pub trait BotStrategy: Send {
    fn kind(&self) -> StrategyKind;

    fn select_move(
        &mut self,
        state: &GameState,
        player: PlayerId,
        dice_value: u8,
        available: &[u8],
    ) -> Option<Move>;
}

/// Lowest unfinished token with the handed die.
pub struct PredictableStrategy;

impl BotStrategy for PredictableStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Predictable
    }

    fn select_move(
        &mut self,
        state: &GameState,
        player: PlayerId,
        dice_value: u8,
        _available: &[u8],
    ) -> Option<Move> {
        predictable_move(state, player, dice_value)
    }
}

pub struct AggressiveStrategy;

impl BotStrategy for AggressiveStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Aggressive
    }

    fn select_move(
        &mut self,
        state: &GameState,
        player: PlayerId,
        _dice_value: u8,
        available: &[u8],
    ) -> Option<Move> {
        aggressive_move(state, player, available)
    }
}

pub struct ResponsibleStrategy;

impl BotStrategy for ResponsibleStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Responsible
    }

    fn select_move(
        &mut self,
        state: &GameState,
        player: PlayerId,
        _dice_value: u8,
        available: &[u8],
    ) -> Option<Move> {
        responsible_move(state, player, available)
    }
}

/// Wraps the MCTS search as a BotStrategy.
pub struct MctsStrategy {
    pub params: MctsParams,
    rng: StdRng,
    last_stats: Option<SearchStats>,
}

impl MctsStrategy {
    pub fn new(params: MctsParams) -> Self {
        let rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            params,
            rng,
            last_stats: None,
        }
    }

    pub fn last_stats(&self) -> Option<&SearchStats> {
        self.last_stats.as_ref()
    }
}

impl BotStrategy for MctsStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Mcts
    }

    fn select_move(
        &mut self,
        state: &GameState,
        player: PlayerId,
        _dice_value: u8,
        available: &[u8],
    ) -> Option<Move> {
        let (chosen, stats) = mcts_search(state, player, available, &self.params, &mut self.rng);
        self.last_stats = Some(stats);
        chosen
    }
}

pub fn build_strategy(config: &StrategyConfig) -> Box<dyn BotStrategy> {
    match config.kind {
        StrategyKind::Predictable => Box::new(PredictableStrategy),
        StrategyKind::Aggressive => Box::new(AggressiveStrategy),
        StrategyKind::Responsible => Box::new(ResponsibleStrategy),
        StrategyKind::Mcts => Box::new(MctsStrategy::new(config.mcts_params())),
    }
}
