//! Turn orchestration: dice in, strategies consulted, moves applied, bonus
//! chains resolved, game end detected.

use crate::engine::bot_strategy::{build_strategy, BotStrategy};
use crate::engine::models::{EndReason, GameConfig, GameResult, MoveRecord, TurnReport};
use crate::error::{EngineError, Result};
use crate::games::ludo::board::board_config;
use crate::games::ludo::dice::{DiceRoll, DiceSource, RandomDice, SeededDice};
use crate::games::ludo::rules::{self, move_sequence, next_roller};
use crate::games::ludo::types::{GamePhase, GameState, Move, MoveResult, PlayerId};

/// Runaway guard for bonus chains.
const MAX_BONUS_CHAIN: usize = 50;

/// Die a slot is handed: its own roll value while still unspent, otherwise the
/// first die left in the pool.
fn handed_value(slot_value: u8, pool: &[u8]) -> Option<u8> {
    if pool.contains(&slot_value) {
        Some(slot_value)
    } else {
        pool.first().copied()
    }
}

fn remove_one(pool: &mut Vec<u8>, value: u8) {
    if let Some(i) = pool.iter().position(|&v| v == value) {
        pool.remove(i);
    }
}

/// Owns the live game state and is the only thing that mutates it.
pub struct GameEngine {
    config: GameConfig,
    state: GameState,
    strategies: Vec<Box<dyn BotStrategy>>,
    dice: Box<dyn DiceSource>,
    history: Vec<MoveRecord>,
    next_roller: PlayerId,
    result: Option<GameResult>,
}

impl GameEngine {
    pub fn new(config: GameConfig, dice: Box<dyn DiceSource>) -> Result<Self> {
        config.validate()?;
        let board = board_config(config.board_size)?;
        let state = GameState::new(board, config.seating(), config.num_tokens, config.max_moves);
        let strategies = state
            .player_ids()
            .map(|p| build_strategy(&config.strategy_for(p)))
            .collect();
        tracing::info!(
            players = config.num_players,
            tokens = config.num_tokens,
            board = config.board_size,
            max_moves = config.max_moves,
            seed = ?config.seed,
            "new game"
        );
        Ok(Self {
            config,
            state,
            strategies,
            dice,
            history: Vec::new(),
            next_roller: 1,
            result: None,
        })
    }

    /// Seeded dice when the config has a seed, otherwise uniform random dice.
    pub fn from_config(config: GameConfig) -> Result<Self> {
        let dice: Box<dyn DiceSource> = match &config.seed {
            Some(seed) => Box::new(SeededDice::new(seed, config.num_rounds)?),
            None => Box::new(RandomDice::new(None)),
        };
        Self::new(config, dice)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    pub fn next_roller(&self) -> PlayerId {
        self.next_roller
    }

    /// Replace one seat's strategy.
    pub fn set_strategy(&mut self, player: PlayerId, strategy: Box<dyn BotStrategy>) -> Result<()> {
        if !self.state.is_player(player) {
            return Err(EngineError::invalid_config(format!("no player {player}")));
        }
        self.strategies[player as usize - 1] = strategy;
        Ok(())
    }

    /// Entry point for an external roller. Invalid rolls are rejected without
    /// touching the state; rolls after game over are no-ops.
    pub fn process_dice_roll(&mut self, roll: DiceRoll) -> Result<TurnReport> {
        roll.validate(self.state.num_players())?;
        if self.is_over() {
            tracing::debug!(roller = roll.player, "roll ignored, game over");
            return Ok(TurnReport {
                roller: roll.player,
                dice: roll.values,
                seed_index: roll.seed_index,
                sequence: move_sequence(roll.player, self.state.num_players()),
                records: Vec::new(),
                game_over: self.result.clone(),
            });
        }
        Ok(self.play_turn(roll))
    }

    /// Draw three dice from the injected source for the next roller and play.
    pub fn roll_and_play(&mut self) -> Result<TurnReport> {
        let (values, seed_index) = self.dice.roll_three();
        let roll = DiceRoll {
            values,
            player: self.next_roller,
            seed_index,
        };
        self.process_dice_roll(roll)
    }

    /// Roll until the game ends or `max_turns` rolls have been played.
    pub fn play_to_end(&mut self, max_turns: usize) -> Result<Option<GameResult>> {
        for _ in 0..max_turns {
            if self.is_over() {
                break;
            }
            self.roll_and_play()?;
        }
        Ok(self.result.clone())
    }

    fn play_turn(&mut self, roll: DiceRoll) -> TurnReport {
        let n = self.state.num_players();
        let sequence = move_sequence(roll.player, n);
        self.state.phase = GamePhase::ProcessingMove;
        self.state.current_round += 1;
        let first_record = self.history.len();
        let mut pool = roll.values.to_vec();

        for (slot, &player) in sequence.iter().enumerate() {
            let Some(handed) = handed_value(roll.values[slot], &pool) else {
                break;
            };
            if !self.state.has_moves_left(player) {
                tracing::debug!(player, slot, "move limit reached, slot skipped");
                remove_one(&mut pool, handed);
                continue;
            }
            if self.perform_full_move(player, handed, &mut pool) {
                break;
            }
        }

        if !self.is_over() {
            self.check_game_end();
        }
        if !self.is_over() {
            self.state.phase = GamePhase::WaitingForDice;
        }
        self.next_roller = next_roller(roll.player, n);

        let records = self.history[first_record..].to_vec();
        tracing::debug!(
            round = self.state.current_round,
            roller = roll.player,
            dice = ?roll.values,
            moves = records.len(),
            scores = ?self.state.scores,
            "turn complete"
        );
        TurnReport {
            roller: roll.player,
            dice: roll.values,
            seed_index: roll.seed_index,
            sequence,
            records,
            game_over: self.result.clone(),
        }
    }

    fn is_valid_choice(&self, player: PlayerId, m: Move, pool: &[u8]) -> bool {
        m.token_index < self.state.num_tokens()
            && !self.state.is_finished(player, m.token_index)
            && pool.contains(&m.dice_value)
    }

    /// Ask the seat's strategy for a move, validated against `pool`.
    fn choose(&mut self, player: PlayerId, handed: u8, pool: &[u8]) -> Option<Move> {
        let seat = player as usize - 1;
        let choice = self.strategies[seat].select_move(&self.state, player, handed, pool);
        match choice {
            Some(m) if self.is_valid_choice(player, m, pool) => Some(m),
            Some(m) => {
                tracing::warn!(
                    player,
                    token = m.token_index,
                    dice = m.dice_value,
                    strategy = %self.strategies[seat].kind(),
                    "invalid move choice, slot forfeited"
                );
                None
            }
            None => {
                tracing::debug!(player, "no legal move, slot forfeited");
                None
            }
        }
    }

    /// One top-level move plus its bonus chain. Returns true when it won the game.
    fn perform_full_move(&mut self, player: PlayerId, handed: u8, pool: &mut Vec<u8>) -> bool {
        let Some(m) = self.choose(player, handed, pool) else {
            remove_one(pool, handed);
            return false;
        };
        remove_one(pool, m.dice_value);
        self.state.record_move(player);

        let mut used = vec![m.dice_value];
        let Some(mut last) = self.apply_move(player, m.token_index, m.dice_value) else {
            return false;
        };
        self.push_record(&last, &used, false);
        if last.game_won {
            return true;
        }

        let mut chain = 0;
        while last.grants_bonus()
            && self.state.has_moves_left(player)
            && !self.is_over()
            && chain < MAX_BONUS_CHAIN
        {
            chain += 1;
            let die = self.dice.bonus_die();
            let Some(bonus) = self.choose(player, die, &[die]) else {
                break;
            };
            let Some(result) = self.apply_move(player, bonus.token_index, bonus.dice_value) else {
                break;
            };
            used.push(die);
            self.push_record(&result, &used, true);
            if result.game_won {
                return true;
            }
            last = result;
        }
        false
    }

    /// Apply a single move to the live state. Does not touch move counts or
    /// history. Rejected (`None`) once the game is over or for an invalid move.
    pub fn apply_move(&mut self, player: PlayerId, token: usize, dice_value: u8) -> Option<MoveResult> {
        if self.is_over() {
            return None;
        }
        let result = rules::apply_move(&mut self.state, player, token, dice_value)?;
        if result.game_won {
            self.finish(vec![player], EndReason::AllTokensFinished);
        }
        Some(result)
    }

    fn push_record(&mut self, result: &MoveResult, used: &[u8], bonus: bool) {
        let record = MoveRecord {
            ordinal: self.history.len(),
            round: self.state.current_round,
            player: result.player,
            token: result.token,
            dice_value: result.dice_value,
            used_values: used.to_vec(),
            from_index: result.from_index,
            to_index: result.to_index,
            captured: result.captured(),
            captures: result.captures.clone(),
            finished: result.finished,
            points_earned: result.points_earned,
            bonus,
            strategy: self.strategies[result.player as usize - 1].kind(),
        };
        tracing::debug!(
            player = record.player,
            token = record.token,
            dice = record.dice_value,
            from = record.from_index,
            to = record.to_index,
            captured = record.captured,
            finished = record.finished,
            points = record.points_earned,
            bonus,
            "move"
        );
        self.history.push(record);
    }

    /// End the game if someone finished every token or every player is out
    /// of moves. Highest score wins a move-limit ending; ties share.
    pub fn check_game_end(&mut self) -> Option<GameResult> {
        if self.result.is_some() {
            return self.result.clone();
        }
        if let Some(p) = self.state.player_ids().find(|&p| self.state.all_finished(p)) {
            return Some(self.finish(vec![p], EndReason::AllTokensFinished));
        }
        if self.state.player_ids().all(|p| !self.state.has_moves_left(p)) {
            let best = self.state.scores.iter().copied().max().unwrap_or(0);
            let winners = self
                .state
                .player_ids()
                .filter(|&p| self.state.score(p) == best)
                .collect();
            return Some(self.finish(winners, EndReason::MoveLimit));
        }
        None
    }

    fn finish(&mut self, winners: Vec<PlayerId>, reason: EndReason) -> GameResult {
        self.state.phase = GamePhase::GameOver;
        self.state.winner = match winners.as_slice() {
            [only] => Some(*only),
            _ => None,
        };
        let result = GameResult {
            winners,
            final_scores: self.state.scores.clone(),
            reason,
            rounds: self.state.current_round,
            total_moves: self.history.len(),
        };
        tracing::info!(
            winners = ?result.winners,
            scores = ?result.final_scores,
            reason = ?result.reason,
            rounds = result.rounds,
            "game over"
        );
        self.result = Some(result.clone());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::models::{StrategyConfig, StrategyKind};
    use crate::games::ludo::dice::ScriptedDice;

    fn engine(config: GameConfig, rolls: Vec<[u8; 3]>, bonus: Vec<u8>) -> GameEngine {
        GameEngine::new(config, Box::new(ScriptedDice::new(rolls, bonus).unwrap())).unwrap()
    }

    #[test]
    fn test_handed_value() {
        assert_eq!(handed_value(4, &[2, 4, 6]), Some(4));
        assert_eq!(handed_value(4, &[2, 6]), Some(2));
        assert_eq!(handed_value(4, &[]), None);
    }

    #[test]
    fn test_unknown_board_is_fatal() {
        let config = GameConfig { board_size: 10, ..Default::default() };
        let err = GameEngine::new(config, Box::new(RandomDice::new(Some(1))));
        assert!(matches!(err, Err(EngineError::ConfigNotFound { board_size: 10 })));
    }

    #[test]
    fn test_two_player_sequence() {
        let mut e = engine(GameConfig::default(), vec![[2, 3, 4]], vec![1]);
        let report = e.roll_and_play().unwrap();
        assert_eq!(report.sequence, [1, 2, 1]);
        let moves: Vec<_> = report.records.iter().map(|r| (r.player, r.dice_value, r.to_index)).collect();
        assert_eq!(moves, vec![(1, 2, 2), (2, 3, 3), (1, 4, 6)]);
        assert_eq!(e.state().scores, vec![6, 3]);
        assert_eq!(e.state().move_counts, vec![2, 1]);
        assert_eq!(e.state().phase, GamePhase::WaitingForDice);
        assert_eq!(e.next_roller(), 2);
        assert_eq!(e.history().len(), 3);
    }

    #[test]
    fn test_bonus_chain_counts_once() {
        let mut e = engine(GameConfig::default(), vec![[6, 1, 1]], vec![2]);
        let report = e.roll_and_play().unwrap();
        let first: Vec<_> = report.records.iter().take(2).map(|r| (r.bonus, r.used_values.clone())).collect();
        assert_eq!(first, vec![(false, vec![6]), (true, vec![6, 2])]);
        assert_eq!(report.records.len(), 4);
        assert_eq!(e.state().positions[0], vec![9, 0]);
        assert_eq!(e.state().move_counts, vec![2, 1]);
    }

    #[test]
    fn test_move_limit_skips_and_ends() {
        let config = GameConfig { max_moves: 1, ..Default::default() };
        let mut e = engine(config, vec![[2, 3, 4]], vec![1]);
        let report = e.roll_and_play().unwrap();
        assert_eq!(report.records.len(), 2);
        let result = report.game_over.unwrap();
        assert_eq!(result.reason, EndReason::MoveLimit);
        assert_eq!(result.winners, vec![2]);
        assert_eq!(e.state().winner, Some(2));
        assert!(e.is_over());
    }

    #[test]
    fn test_move_limit_tie_shares_win() {
        let config = GameConfig { max_moves: 1, ..Default::default() };
        let mut e = engine(config, vec![[3, 3, 3]], vec![1]);
        let result = e.roll_and_play().unwrap().game_over.unwrap();
        assert_eq!(result.winners, vec![1, 2]);
        assert_eq!(e.state().winner, None);
    }

    #[test]
    fn test_win_stops_the_turn() {
        let mut e = engine(GameConfig::default(), vec![[3, 1, 1]], vec![1]);
        e.state.positions[0] = vec![38, 36];
        let report = e.roll_and_play().unwrap();
        assert_eq!(report.records.len(), 1);
        assert!(report.records[0].finished);
        let result = report.game_over.unwrap();
        assert_eq!(result.reason, EndReason::AllTokensFinished);
        assert_eq!(result.winners, vec![1]);

        let after = e.process_dice_roll(DiceRoll::new([6, 6, 6], 2)).unwrap();
        assert!(after.records.is_empty());
        assert!(e.apply_move(2, 0, 6).is_none());
        assert_eq!(e.history().len(), 1);
    }

    #[test]
    fn test_invalid_roll_leaves_state() {
        let mut e = engine(GameConfig::default(), vec![[1, 1, 1]], vec![1]);
        assert!(e.process_dice_roll(DiceRoll::new([0, 2, 3], 1)).is_err());
        assert!(e.process_dice_roll(DiceRoll::new([1, 2, 3], 3)).is_err());
        assert_eq!(e.state().current_round, 0);
        assert!(e.history().is_empty());
    }

    struct StaleBot;

    impl BotStrategy for StaleBot {
        fn kind(&self) -> StrategyKind {
            StrategyKind::Predictable
        }

        fn select_move(&mut self, _: &GameState, _: PlayerId, _: u8, _: &[u8]) -> Option<Move> {
            Some(Move::new(9, 6))
        }
    }

    #[test]
    fn test_stale_choice_forfeits_slot() {
        let mut e = engine(GameConfig::default(), vec![[2, 3, 4]], vec![1]);
        e.set_strategy(1, Box::new(StaleBot)).unwrap();
        let report = e.roll_and_play().unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].player, 2);
        assert_eq!(report.records[0].dice_value, 3);
        assert_eq!(e.state().move_counts, vec![0, 1]);
        assert!(e.set_strategy(3, Box::new(StaleBot)).is_err());
    }

    #[test]
    fn test_four_player_turn() {
        let config = GameConfig {
            num_players: 4,
            strategies: vec![StrategyConfig::of(StrategyKind::Aggressive); 4],
            ..Default::default()
        };
        let mut e = engine(config, vec![[1, 2, 3]], vec![1]);
        e.roll_and_play().unwrap();
        let report = e.roll_and_play().unwrap();
        assert_eq!(report.roller, 2);
        assert_eq!(report.sequence, [2, 3, 4]);
        assert_eq!(e.state().current_round, 2);
    }

    #[test]
    fn test_play_to_end_terminates() {
        let config = GameConfig {
            strategies: vec![
                StrategyConfig::of(StrategyKind::Responsible),
                StrategyConfig::of(StrategyKind::Aggressive),
            ],
            seed: Some("terminates".into()),
            ..Default::default()
        };
        let mut e = GameEngine::from_config(config).unwrap();
        let result = e.play_to_end(1000).unwrap().unwrap();
        assert!(!result.winners.is_empty());
        assert!(e.state().move_counts.iter().all(|&c| c <= 40));
        assert_eq!(result.total_moves, e.history().len());
    }
}
