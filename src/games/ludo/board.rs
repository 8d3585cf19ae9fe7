//! Static board geometry for the supported board sizes.
//!
//! A board of size `s` is drawn on a `(s + 2) x (s + 2)` grid: a cross-shaped
//! track with arms three cells wide, one `a x a` home block in each corner
//! (`a = (s - 1) / 2`) and a 3x3 finish block in the centre. Every color's
//! path is the RED path rotated clockwise by a quarter turn per color.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::Serialize;

use super::types::{Cell, Color};
use crate::error::{EngineError, Result};

pub const SUPPORTED_SIZES: [u8; 4] = [7, 9, 11, 13];

static BOARDS: Lazy<Vec<BoardConfig>> =
    Lazy::new(|| SUPPORTED_SIZES.iter().map(|&s| BoardConfig::build(s)).collect());

/// Look up the static configuration for a board size.
pub fn board_config(board_size: u8) -> Result<&'static BoardConfig> {
    BOARDS
        .iter()
        .find(|b| b.board_size == board_size)
        .ok_or(EngineError::ConfigNotFound { board_size })
}

/// Cell at `index` along `path`, or `None` past either end.
pub fn cell_at(path: &[Cell], index: usize) -> Option<Cell> {
    path.get(index).copied()
}

/// Position of `cell` along `path`, if it lies on it.
pub fn path_index_of(path: &[Cell], cell: Cell) -> Option<usize> {
    path.iter().position(|&c| c == cell)
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardConfig {
    pub board_size: u8,
    pub grid_size: u8,
    pub center: Cell,
    /// Indexed by `Color::index()`.
    pub home_areas: [Vec<Cell>; 4],
    pub start_cells: [Cell; 4],
    pub safe_cells: HashSet<Cell>,
    pub entrance_paths: [Vec<Cell>; 4],
    pub finish_area: Vec<Cell>,
    pub paths: [Vec<Cell>; 4],
    /// Path index splitting the early and late pair-movement phases.
    pub pair_threshold: u8,
}

impl BoardConfig {
    fn build(board_size: u8) -> Self {
        let a = (board_size - 1) / 2;
        let c = a + 1;
        let g = board_size + 2;

        let red_path = red_path(board_size);
        let red_home: Vec<Cell> = (0..a)
            .flat_map(|r| (0..a).map(move |col| Cell::new(r, col)))
            .collect();
        let red_entrance: Vec<Cell> = (1..c - 1).map(|col| Cell::new(c, col)).collect();

        let paths = rotations(&red_path, g);
        let home_areas = rotations(&red_home, g);
        let entrance_paths = rotations(&red_entrance, g);
        let start_cells = Color::ALL.map(|color| paths[color.index()][0]);

        let safe_cells: HashSet<Cell> = [
            start_cells[Color::Red.index()],
            start_cells[Color::Yellow.index()],
        ]
        .into_iter()
        .collect();

        let finish_area = (c - 1..=c + 1)
            .flat_map(|r| (c - 1..=c + 1).map(move |col| Cell::new(r, col)))
            .collect();

        let pair_threshold = match board_size {
            7 => 15,
            9 => 19,
            11 => 23,
            _ => 26,
        };

        Self {
            board_size,
            grid_size: g,
            center: Cell::new(c, c),
            home_areas,
            start_cells,
            safe_cells,
            entrance_paths,
            finish_area,
            paths,
            pair_threshold,
        }
    }

    pub fn path(&self, color: Color) -> &[Cell] {
        &self.paths[color.index()]
    }

    pub fn path_len(&self) -> usize {
        self.paths[0].len()
    }

    /// Last path index; identical for every color on this board.
    pub fn final_position(&self) -> u8 {
        (self.path_len() - 1) as u8
    }

    pub fn cell_for(&self, color: Color, index: usize) -> Option<Cell> {
        cell_at(self.path(color), index)
    }

    pub fn path_index_of(&self, color: Color, cell: Cell) -> Option<usize> {
        path_index_of(self.path(color), cell)
    }

    pub fn start_cell(&self, color: Color) -> Cell {
        self.start_cells[color.index()]
    }

    pub fn finish_cell(&self, color: Color) -> Cell {
        self.paths[color.index()][self.path_len() - 1]
    }

    pub fn is_safe_cell(&self, cell: Cell) -> bool {
        self.safe_cells.contains(&cell)
    }
}

/// RED's full path: start beside the home block, once clockwise round the
/// track, then in along the entrance row to the finish cell.
fn red_path(board_size: u8) -> Vec<Cell> {
    let a = (board_size - 1) / 2;
    let c = a + 1;
    let g = board_size + 2;
    let mut path = Vec::with_capacity(9 * a as usize + 3);

    path.extend((1..c - 1).map(|col| Cell::new(c - 1, col)));
    path.extend((0..c - 1).rev().map(|row| Cell::new(row, c - 1)));
    path.push(Cell::new(0, c));
    path.extend((0..c - 1).map(|row| Cell::new(row, c + 1)));
    path.extend((c + 2..g).map(|col| Cell::new(c - 1, col)));
    path.push(Cell::new(c, g - 1));
    path.extend((c + 2..g).rev().map(|col| Cell::new(c + 1, col)));
    path.extend((c + 2..g).map(|row| Cell::new(row, c + 1)));
    path.push(Cell::new(g - 1, c));
    path.extend((c + 2..g).rev().map(|row| Cell::new(row, c - 1)));
    path.extend((0..c - 1).rev().map(|col| Cell::new(c + 1, col)));
    path.push(Cell::new(c, 0));
    path.extend((1..c - 1).map(|col| Cell::new(c, col)));
    path.push(Cell::new(c, c - 1));
    path
}

/// Quarter turn clockwise on a `grid x grid` board.
fn rotate(cell: Cell, grid: u8) -> Cell {
    Cell::new(cell.col, grid - 1 - cell.row)
}

fn rotations(cells: &[Cell], grid: u8) -> [Vec<Cell>; 4] {
    let mut out: [Vec<Cell>; 4] = Default::default();
    out[0] = cells.to_vec();
    for i in 1..4 {
        out[i] = out[i - 1].iter().map(|&cell| rotate(cell, grid)).collect();
    }
    out
}
