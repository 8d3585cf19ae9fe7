//! Move rules: turn order, safety, captures, finishing and scoring.

use super::types::{Capture, GameState, MoveResult, PlayerId, MAX_DICE, MIN_DICE};

/// The three players served by one three-dice roll.
///
/// Two players: the roller gets the first and third dice. Three or four: the
/// roller and the next two seats clockwise.
pub fn move_sequence(roller: PlayerId, num_players: usize) -> [PlayerId; 3] {
    let n = num_players as PlayerId;
    if n == 2 {
        let other = if roller == 1 { 2 } else { 1 };
        [roller, other, roller]
    } else {
        [roller, (roller % n) + 1, ((roller + 1) % n) + 1]
    }
}

/// Seat that rolls after `roller`.
pub fn next_roller(roller: PlayerId, num_players: usize) -> PlayerId {
    (roller % num_players as PlayerId) + 1
}

/// Safety for an arbitrary position list: the cell is in the board's safe set,
/// or two or more of `positions` share this non-zero index (a block).
pub fn is_safe_with(state: &GameState, player: PlayerId, positions: &[u8], path_index: u8) -> bool {
    if let Some(cell) = state.cell_of(player, path_index) {
        if state.board.is_safe_cell(cell) {
            return true;
        }
    }
    path_index != 0 && positions.iter().filter(|&&p| p == path_index).count() > 1
}

/// Whether a token of `player` at `path_index` is protected from capture.
pub fn is_safe(state: &GameState, player: PlayerId, path_index: u8) -> bool {
    is_safe_with(state, player, state.positions_of(player), path_index)
}

/// Opponent tokens that a token of `player` landing on `target` would capture.
pub fn capturable_at(state: &GameState, player: PlayerId, target: u8) -> Vec<(PlayerId, usize)> {
    if target >= state.final_position {
        return Vec::new();
    }
    let Some(cell) = state.cell_of(player, target) else {
        return Vec::new();
    };
    let mut hits = Vec::new();
    for opp in state.opponents(player) {
        for (token, &pos) in state.positions_of(opp).iter().enumerate() {
            if pos == 0 || pos >= state.final_position {
                continue;
            }
            if state.cell_of(opp, pos) == Some(cell) && !is_safe(state, opp, pos) {
                hits.push((opp, token));
            }
        }
    }
    hits
}

pub fn would_capture(state: &GameState, player: PlayerId, target: u8) -> bool {
    !capturable_at(state, player, target).is_empty()
}

/// Apply one move of `token` by `dice_value` for `player`.
///
/// Returns `None` for a token that does not exist, is already finished, or a
/// dice value outside 1..=6; the state is untouched in that case.
pub fn apply_move(
    state: &mut GameState,
    player: PlayerId,
    token: usize,
    dice_value: u8,
) -> Option<MoveResult> {
    if !state.is_player(player) || !(MIN_DICE..=MAX_DICE).contains(&dice_value) {
        return None;
    }
    let final_pos = state.final_position;
    let current = *state.positions_of(player).get(token)?;
    if current >= final_pos {
        return None;
    }

    let raw_target = current + dice_value;
    let mut result = MoveResult {
        player,
        token,
        dice_value,
        from_index: current,
        to_index: raw_target,
        finished: false,
        captures: Vec::new(),
        points_earned: dice_value as u32,
        game_won: false,
    };

    if raw_target >= final_pos {
        result.to_index = final_pos;
        result.finished = true;
        result.points_earned = (final_pos - current) as u32;
        state.positions_mut(player)[token] = final_pos;
        *state.scores_mut(player) += result.points_earned;
        result.game_won = state.all_finished(player);
        return Some(result);
    }

    for (opp, opp_token) in capturable_at(state, player, raw_target) {
        let from_index = state.positions_of(opp)[opp_token];
        let score = state.scores_mut(opp);
        let points_lost = (*score).min(from_index as u32);
        *score -= points_lost;
        state.positions_mut(opp)[opp_token] = 0;
        result.captures.push(Capture {
            player: opp,
            token: opp_token,
            from_index,
            points_lost,
        });
    }

    state.positions_mut(player)[token] = raw_target;
    *state.scores_mut(player) += result.points_earned;
    Some(result)
}
