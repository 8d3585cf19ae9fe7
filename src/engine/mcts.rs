//! Monte Carlo Tree Search over a simplified two-sided race.
//!
//! The search state keeps only token positions for the searching player and
//! its strongest opponent; captures and bonus moves are ignored. Children are
//! chosen by UCB1, playouts are uniform random to a depth bound and scored by
//! the evaluator, and the most visited root child is returned.

use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::engine::evaluator::{evaluate, outcome_value};
use crate::engine::models::MctsPreset;
use crate::games::ludo::board::BoardConfig;
use crate::games::ludo::types::{Color, GameState, Move, PlayerId, MAX_DICE, MIN_DICE};

/// MCTS search parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct MctsParams {
    pub max_iterations: usize,
    pub max_time_ms: u64,
    pub exploration_constant: f64,
    pub simulation_depth: usize,
    /// Seed for the strategy's RNG; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl MctsParams {
    pub fn preset(preset: MctsPreset) -> Self {
        let (max_iterations, max_time_ms, simulation_depth) = match preset {
            MctsPreset::Easy => (500, 1000, 20),
            MctsPreset::Normal => (1000, 2000, 30),
            MctsPreset::Hard => (2000, 3000, 50),
        };
        Self {
            max_iterations,
            max_time_ms,
            exploration_constant: std::f64::consts::SQRT_2,
            simulation_depth,
            seed: None,
        }
    }
}

impl Default for MctsParams {
    fn default() -> Self {
        Self::preset(MctsPreset::Normal)
    }
}

/// Two-sided search state. Side 0 is the searching player.
#[derive(Debug, Clone)]
pub struct SimState {
    pub positions: [Vec<u8>; 2],
    /// Side to move.
    pub current: usize,
    pub final_position: u8,
    pub winner: Option<usize>,
    pub board: &'static BoardConfig,
    pub colors: [Color; 2],
}

impl SimState {
    /// Project the live game onto `player` against the opponent with the
    /// most total progress.
    pub fn from_game(state: &GameState, player: PlayerId) -> Self {
        let opponent = state
            .opponents(player)
            .fold(None, |best: Option<PlayerId>, opp| match best {
                Some(b) if state.progress(b) >= state.progress(opp) => Some(b),
                _ => Some(opp),
            })
            .unwrap_or(player);
        Self {
            positions: [
                state.positions_of(player).to_vec(),
                state.positions_of(opponent).to_vec(),
            ],
            current: 0,
            final_position: state.final_position,
            winner: None,
            board: state.board,
            colors: [state.color_of(player), state.color_of(opponent)],
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.winner.is_some()
    }

    pub fn on_safe_cell(&self, side: usize, index: u8) -> bool {
        self.board
            .cell_for(self.colors[side], index as usize)
            .is_some_and(|cell| self.board.is_safe_cell(cell))
    }

    fn unfinished(&self, side: usize) -> Vec<usize> {
        self.positions[side]
            .iter()
            .enumerate()
            .filter(|(_, &p)| p < self.final_position)
            .map(|(i, _)| i)
            .collect()
    }

    /// Moves for the side to move using the given dice values. An
    /// overshooting die is kept and clamps to the finish in `apply`, matching
    /// the live rules, rather than being pruned.
    pub fn legal_moves(&self, dice: &[u8]) -> Vec<Move> {
        if self.is_terminal() {
            return Vec::new();
        }
        let tokens = self.unfinished(self.current);
        let mut values: Vec<u8> = dice.to_vec();
        values.sort_unstable_by(|a, b| b.cmp(a));
        values.dedup();
        values
            .iter()
            .flat_map(|&d| tokens.iter().map(move |&t| Move::new(t, d)))
            .collect()
    }

    pub fn apply(&mut self, m: Move) {
        let side = self.current;
        let fin = self.final_position;
        if let Some(pos) = self.positions[side].get_mut(m.token_index) {
            *pos = pos.saturating_add(m.dice_value).min(fin);
        }
        if self.positions[side].iter().all(|&p| p >= fin) {
            self.winner = Some(side);
        }
        self.current = 1 - side;
    }

    fn random_ply<R: Rng>(&mut self, rng: &mut R) -> bool {
        let tokens = self.unfinished(self.current);
        let Some(&token) = tokens.choose(rng) else {
            return false;
        };
        let dice = rng.gen_range(MIN_DICE..=MAX_DICE);
        self.apply(Move::new(token, dice));
        true
    }
}

/// A node in the search tree.
struct MctsNode {
    move_taken: Option<Move>,
    parent: Option<usize>,
    acting_side: Option<usize>,
    children: Vec<usize>,
    untried_moves: Option<Vec<Move>>,
    visit_count: u32,
    total_value: f64,
}

impl MctsNode {
    fn new(move_taken: Option<Move>, parent: Option<usize>, acting_side: Option<usize>) -> Self {
        Self {
            move_taken,
            parent,
            acting_side,
            children: Vec::new(),
            untried_moves: None,
            visit_count: 0,
            total_value: 0.0,
        }
    }

    fn uct_value(&self, parent_visits: u32, c: f64) -> f64 {
        if self.visit_count == 0 {
            return f64::INFINITY;
        }
        let exploit = self.total_value / self.visit_count as f64;
        let explore = c * ((parent_visits as f64).ln() / self.visit_count as f64).sqrt();
        exploit + explore
    }

    fn fully_expanded(&self) -> bool {
        self.untried_moves.as_ref().is_some_and(|u| u.is_empty())
    }
}

struct NodeArena {
    nodes: Vec<MctsNode>,
}

impl NodeArena {
    fn new() -> Self {
        Self {
            nodes: Vec::with_capacity(1024),
        }
    }

    fn alloc(&mut self, node: MctsNode) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(node);
        idx
    }

    fn get(&self, idx: usize) -> &MctsNode {
        &self.nodes[idx]
    }

    fn get_mut(&mut self, idx: usize) -> &mut MctsNode {
        &mut self.nodes[idx]
    }

    /// First child with the highest UCB1 value.
    fn best_child_uct(&self, node_idx: usize, c: f64) -> usize {
        let node = &self.nodes[node_idx];
        let parent_visits = node.visit_count;
        let mut best_idx = node.children[0];
        let mut best_val = self.nodes[best_idx].uct_value(parent_visits, c);
        for &child_idx in &node.children[1..] {
            let val = self.nodes[child_idx].uct_value(parent_visits, c);
            if val > best_val {
                best_val = val;
                best_idx = child_idx;
            }
        }
        best_idx
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChildStats {
    pub mv: Move,
    pub visits: u32,
    pub mean_value: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchStats {
    pub iterations: usize,
    pub elapsed_ms: u64,
    pub children: Vec<ChildStats>,
    /// The move came from the random fallback instead of the tree.
    pub fallback: bool,
}

/// Search for `player`'s move given the dice still available this turn.
///
/// Returns `None` only when no token can move. With no completed iterations
/// (for instance `max_iterations == 0`) a random legal move is returned.
pub fn mcts_search<R: Rng>(
    state: &GameState,
    player: PlayerId,
    available: &[u8],
    params: &MctsParams,
    rng: &mut R,
) -> (Option<Move>, SearchStats) {
    let start = Instant::now();
    let deadline = start + Duration::from_millis(params.max_time_ms);
    let root_state = SimState::from_game(state, player);
    let root_moves = root_state.legal_moves(available);
    let mut stats = SearchStats::default();

    if root_moves.is_empty() {
        return (None, stats);
    }

    let mut arena = NodeArena::new();
    let root_idx = arena.alloc(MctsNode::new(None, None, None));
    arena.get_mut(root_idx).untried_moves = Some(root_moves.clone());

    for _ in 0..params.max_iterations {
        if Instant::now() >= deadline {
            break;
        }
        stats.iterations += 1;
        run_one_iteration(&mut arena, root_idx, &root_state, params, rng);
    }
    stats.elapsed_ms = start.elapsed().as_millis() as u64;

    let root = arena.get(root_idx);
    stats.children = root
        .children
        .iter()
        .map(|&idx| {
            let child = arena.get(idx);
            ChildStats {
                mv: child.move_taken.unwrap_or(root_moves[0]),
                visits: child.visit_count,
                mean_value: child.total_value / child.visit_count.max(1) as f64,
            }
        })
        .collect();

    // Most visited child; earliest expanded wins ties.
    let best = root
        .children
        .iter()
        .map(|&idx| arena.get(idx))
        .fold(None::<&MctsNode>, |best, child| match best {
            Some(b) if b.visit_count >= child.visit_count => Some(b),
            _ => Some(child),
        })
        .and_then(|node| node.move_taken);

    let chosen = match best {
        Some(m) => Some(m),
        None => {
            stats.fallback = true;
            root_moves.choose(rng).copied()
        }
    };

    tracing::debug!(
        player,
        iterations = stats.iterations,
        elapsed_ms = stats.elapsed_ms,
        children = stats.children.len(),
        fallback = stats.fallback,
        chosen = ?chosen,
        "mcts search complete"
    );
    (chosen, stats)
}

/// One MCTS iteration: select -> expand -> simulate -> backpropagate.
fn run_one_iteration<R: Rng>(
    arena: &mut NodeArena,
    root_idx: usize,
    root_state: &SimState,
    params: &MctsParams,
    rng: &mut R,
) {
    let mut node_idx = root_idx;
    let mut state = root_state.clone();

    // 1. SELECT
    loop {
        let node = arena.get(node_idx);
        if state.is_terminal() || !node.fully_expanded() || node.children.is_empty() {
            break;
        }
        node_idx = arena.best_child_uct(node_idx, params.exploration_constant);
        if let Some(m) = arena.get(node_idx).move_taken {
            state.apply(m);
        }
    }

    // 2. EXPAND
    if !state.is_terminal() {
        if arena.get(node_idx).untried_moves.is_none() {
            let moves = state.legal_moves(&[1, 2, 3, 4, 5, 6]);
            arena.get_mut(node_idx).untried_moves = Some(moves);
        }
        let next = arena
            .get_mut(node_idx)
            .untried_moves
            .as_mut()
            .filter(|u| !u.is_empty())
            .map(|u| u.remove(0));
        if let Some(m) = next {
            let child = MctsNode::new(Some(m), Some(node_idx), Some(state.current));
            let child_idx = arena.alloc(child);
            arena.get_mut(node_idx).children.push(child_idx);
            node_idx = child_idx;
            state.apply(m);
        }
    }

    // 3. SIMULATE
    let mut depth = 0;
    while !state.is_terminal() && depth < params.simulation_depth {
        if !state.random_ply(rng) {
            break;
        }
        depth += 1;
    }

    let value = match state.winner {
        Some(0) => 1.0,
        Some(_) => 0.0,
        None => outcome_value(evaluate(&state, 0)),
    };

    // 4. BACKPROPAGATE
    backpropagate(arena, node_idx, value);
}

/// `value` is from side 0's point of view; nodes reached by the other side's
/// move are credited with the complement.
fn backpropagate(arena: &mut NodeArena, leaf_idx: usize, value: f64) {
    let mut node_idx_opt = Some(leaf_idx);
    while let Some(idx) = node_idx_opt {
        let node = arena.get_mut(idx);
        node.visit_count += 1;
        if node.acting_side.unwrap_or(0) == 0 {
            node.total_value += value;
        } else {
            node.total_value += 1.0 - value;
        }
        node_idx_opt = node.parent;
    }
}
