//! Leaf evaluation for MCTS playouts.

use crate::engine::mcts::SimState;

const W_PROGRESS: f64 = 0.4;
const W_FINISHED: f64 = 0.3;
const W_SPREAD: f64 = 0.2;
const W_SAFETY: f64 = 0.1;

/// Relative score of `side` against the other side; positive favours `side`.
pub fn evaluate(state: &SimState, side: usize) -> f64 {
    let fin = state.final_position;
    let mine = &state.positions[side];
    let theirs = &state.positions[1 - side];
    let num_tokens = mine.len().max(1) as f64;

    let progress = |ps: &[u8]| ps.iter().map(|&p| p.min(fin) as f64).sum::<f64>();
    let finished = |ps: &[u8]| ps.iter().filter(|&&p| p >= fin).count() as f64;

    W_PROGRESS * (progress(mine) - progress(theirs)) / fin as f64
        + W_FINISHED * (finished(mine) - finished(theirs)) / num_tokens
        + W_SPREAD * (spread(mine) - spread(theirs))
        + W_SAFETY * (safety(state, side) - safety(state, 1 - side))
}

/// Standard deviation of on-board tokens, scaled down by 10.
fn spread(positions: &[u8]) -> f64 {
    let on_board: Vec<f64> = positions.iter().filter(|&&p| p > 0).map(|&p| p as f64).collect();
    if on_board.len() <= 1 {
        return 0.0;
    }
    let n = on_board.len() as f64;
    let mean = on_board.iter().sum::<f64>() / n;
    let variance = on_board.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt() / 10.0
}

fn safety(state: &SimState, side: usize) -> f64 {
    let positions = &state.positions[side];
    if positions.is_empty() {
        return 0.0;
    }
    let total: f64 = positions
        .iter()
        .map(|&p| {
            if p == 0 {
                0.5
            } else if p >= state.final_position {
                1.0
            } else if state.on_safe_cell(side, p) {
                0.8
            } else {
                0.3
            }
        })
        .sum();
    total / positions.len() as f64
}

/// Map a relative score to a playout outcome for the evaluated side:
/// 1.0 win, 0.5 draw, 0.0 loss.
pub fn outcome_value(score: f64) -> f64 {
    let win_probability = 1.0 / (1.0 + (-score * 5.0).exp());
    if win_probability > 0.6 {
        1.0
    } else if win_probability < 0.4 {
        0.0
    } else {
        0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::ludo::board::board_config;
    use crate::games::ludo::types::Color;

    fn sim(mine: Vec<u8>, theirs: Vec<u8>) -> SimState {
        let board = board_config(9).unwrap();
        SimState {
            positions: [mine, theirs],
            current: 0,
            final_position: board.final_position(),
            winner: None,
            board,
            colors: [Color::Red, Color::Yellow],
        }
    }

    #[test]
    fn test_symmetric_position_is_even() {
        let s = sim(vec![5, 10], vec![5, 10]);
        assert!(evaluate(&s, 0).abs() < 1e-12);
        assert_eq!(outcome_value(evaluate(&s, 0)), 0.5);
    }

    #[test]
    fn test_progress_dominates() {
        let s = sim(vec![38, 30], vec![2, 0]);
        assert!(evaluate(&s, 0) > 0.3);
        assert!((evaluate(&s, 0) + evaluate(&s, 1)).abs() < 1e-12);
        assert_eq!(outcome_value(evaluate(&s, 0)), 1.0);
        assert_eq!(outcome_value(evaluate(&s, 1)), 0.0);
    }

    #[test]
    fn test_spread() {
        assert_eq!(spread(&[0, 0, 7]), 0.0);
        assert!((spread(&[10, 30]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_safety_weights() {
        // RED index 18 is YELLOW's start cell, safe on board 9.
        let s = sim(vec![0, 38, 18, 5], vec![0, 0, 0, 0]);
        assert!((safety(&s, 0) - (0.5 + 1.0 + 0.8 + 0.3) / 4.0).abs() < 1e-12);
        assert!((safety(&s, 1) - 0.5).abs() < 1e-12);
    }
}
