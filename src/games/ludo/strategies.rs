//! Heuristic move selection: Predictable, Aggressive and Responsible.
//!
//! All three are pure functions of the current state. Candidates are derived
//! fresh on every call since bonus moves change the board between calls.

use super::rules::{is_safe_with, would_capture};
use super::types::{GameState, Move, PlayerId};

/// Every (token, dice) pair for unfinished tokens, largest dice first, then
/// lowest token index.
pub fn candidate_moves(state: &GameState, player: PlayerId, available: &[u8]) -> Vec<Move> {
    let mut dice: Vec<u8> = available.to_vec();
    dice.sort_unstable_by(|a, b| b.cmp(a));
    dice.dedup();
    let tokens = state.unfinished_tokens(player);
    dice.iter()
        .flat_map(|&d| tokens.iter().map(move |&t| Move::new(t, d)))
        .collect()
}

fn target_of(state: &GameState, player: PlayerId, m: Move) -> u8 {
    let pos = state.positions_of(player)[m.token_index];
    pos.saturating_add(m.dice_value).min(state.final_position)
}

fn finishes(state: &GameState, player: PlayerId, m: Move) -> bool {
    target_of(state, player, m) >= state.final_position
}

fn captures(state: &GameState, player: PlayerId, m: Move) -> bool {
    would_capture(state, player, target_of(state, player, m))
}

/// Safety of the landing square, judged against the positions after the move.
fn lands_safe(state: &GameState, player: PlayerId, m: Move) -> bool {
    let target = target_of(state, player, m);
    if target >= state.final_position {
        return false;
    }
    let mut simulated = state.positions_of(player).to_vec();
    simulated[m.token_index] = target;
    is_safe_with(state, player, &simulated, target)
}

fn largest(available: &[u8]) -> Option<u8> {
    available.iter().copied().max()
}

/// Unfinished token picked by `key`, first index wins ties.
fn pick_token<K: Ord>(
    state: &GameState,
    player: PlayerId,
    filter: impl Fn(u8) -> bool,
    key: impl Fn(u8) -> K,
) -> Option<usize> {
    let positions = state.positions_of(player);
    state
        .unfinished_tokens(player)
        .into_iter()
        .filter(|&t| filter(positions[t]))
        .min_by_key(|&t| key(positions[t]))
}

/// Lowest-indexed unfinished token, always with the dice value it is handed.
pub fn predictable_move(state: &GameState, player: PlayerId, dice_value: u8) -> Option<Move> {
    state
        .unfinished_tokens(player)
        .first()
        .map(|&t| Move::new(t, dice_value))
}

/// Finish, else capture, else land safe, else push the token nearest home
/// with the largest die.
pub fn aggressive_move(state: &GameState, player: PlayerId, available: &[u8]) -> Option<Move> {
    let candidates = candidate_moves(state, player, available);
    if candidates.is_empty() {
        return None;
    }
    let find = |pred: &dyn Fn(Move) -> bool| candidates.iter().copied().find(|&m| pred(m));

    find(&|m| finishes(state, player, m))
        .or_else(|| find(&|m| captures(state, player, m)))
        .or_else(|| find(&|m| lands_safe(state, player, m)))
        .or_else(|| {
            let fin = state.final_position;
            let token = pick_token(state, player, |_| true, |p| fin - p)?;
            Some(Move::new(token, largest(available)?))
        })
}

/// Move that brings a token strictly closer to a capturable opponent, ending
/// at most one die away from it.
fn chase_move(state: &GameState, player: PlayerId, candidates: &[Move]) -> Option<Move> {
    let color = state.color_of(player);
    let final_pos = state.final_position as i32;
    let mut prey: Vec<i32> = Vec::new();
    for opp in state.opponents(player) {
        for &pos in state.positions_of(opp) {
            if pos == 0
                || pos >= state.final_position
                || is_safe_with(state, opp, state.positions_of(opp), pos)
            {
                continue;
            }
            let Some(cell) = state.cell_of(opp, pos) else {
                continue;
            };
            if let Some(j) = state.board.path_index_of(color, cell) {
                if (j as i32) < final_pos {
                    prey.push(j as i32);
                }
            }
        }
    }

    candidates.iter().copied().find(|&m| {
        let from = state.positions_of(player)[m.token_index] as i32;
        let to = target_of(state, player, m) as i32;
        prey.iter().any(|&j| {
            let before = j - from;
            let after = j - to;
            after > 0 && after <= 6 && after < before
        })
    })
}

/// Finish, capture, race an opponent close to home, land safe, chase, then
/// keep the tokens together around the board's pair threshold.
pub fn responsible_move(state: &GameState, player: PlayerId, available: &[u8]) -> Option<Move> {
    let candidates = candidate_moves(state, player, available);
    if candidates.is_empty() {
        return None;
    }
    let dice = largest(available)?;
    let find = |pred: &dyn Fn(Move) -> bool| candidates.iter().copied().find(|&m| pred(m));

    if let Some(m) = find(&|m| finishes(state, player, m)) {
        return Some(m);
    }
    if let Some(m) = find(&|m| captures(state, player, m)) {
        return Some(m);
    }

    let danger_line = state.final_position as f64 * 0.9;
    let opponent_near_finish = state.opponents(player).any(|opp| {
        state
            .positions_of(opp)
            .iter()
            .any(|&p| p < state.final_position && p as f64 >= danger_line)
    });
    if opponent_near_finish {
        if let Some(t) = pick_token(state, player, |_| true, |p| std::cmp::Reverse(p)) {
            return Some(Move::new(t, dice));
        }
    }

    if let Some(m) = find(&|m| lands_safe(state, player, m)) {
        return Some(m);
    }
    if let Some(m) = chase_move(state, player, &candidates) {
        return Some(m);
    }

    let threshold = state.board.pair_threshold;
    pick_token(state, player, |p| p < threshold, |p| p)
        .or_else(|| pick_token(state, player, |p| p >= threshold, |p| p))
        .or_else(|| state.unfinished_tokens(player).first().copied())
        .map(|t| Move::new(t, dice))
}
